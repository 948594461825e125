use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "villages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::speaker::Entity")]
    Speaker,
    #[sea_orm(has_many = "super::language_record::Entity")]
    LanguageRecord,
    #[sea_orm(has_many = "super::geographic_record::Entity")]
    GeographicRecord,
}

impl Related<super::speaker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Speaker.def()
    }
}

impl Related<super::language_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LanguageRecord.def()
    }
}

impl Related<super::geographic_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeographicRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
