use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed taxonomy of onomatopoeia forms (e.g. `ABAB`: reduplicated).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "onomatopoeia_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub type_code: String,
    pub type_name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::language_record::Entity")]
    LanguageRecord,
}

impl Related<super::language_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LanguageRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.type_code, self.type_name)
    }
}
