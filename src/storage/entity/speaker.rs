use super::UnknownChoice;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Gender {
    #[sea_orm(string_value = "M")]
    #[serde(rename = "M")]
    Male,
    #[sea_orm(string_value = "F")]
    #[serde(rename = "F")]
    Female,
    #[sea_orm(string_value = "O")]
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_value(&s.trim().to_string()).map_err(|_| UnknownChoice::new("gender", s))
    }
}

/// Decade buckets reported by the speaker, 30s through 100+.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AgeRange {
    #[sea_orm(string_value = "30-39")]
    #[serde(rename = "30-39")]
    Thirties,
    #[sea_orm(string_value = "40-49")]
    #[serde(rename = "40-49")]
    Forties,
    #[sea_orm(string_value = "50-59")]
    #[serde(rename = "50-59")]
    Fifties,
    #[sea_orm(string_value = "60-69")]
    #[serde(rename = "60-69")]
    Sixties,
    #[sea_orm(string_value = "70-79")]
    #[serde(rename = "70-79")]
    Seventies,
    #[sea_orm(string_value = "80-89")]
    #[serde(rename = "80-89")]
    Eighties,
    #[sea_orm(string_value = "90-99")]
    #[serde(rename = "90-99")]
    Nineties,
    #[sea_orm(string_value = "100+")]
    #[serde(rename = "100+")]
    Centenarian,
}

impl FromStr for AgeRange {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_value(&s.trim().to_string()).map_err(|_| UnknownChoice::new("age_range", s))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "speakers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Archive-facing identifier such as `SPK001`.
    #[sea_orm(unique)]
    pub speaker_id: String,
    pub age_range: AgeRange,
    pub gender: Gender,
    pub village_id: Option<i32>,
    /// Whether footage of this speaker may be shown publicly.
    pub consent_video: bool,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::village::Entity",
        from = "Column::VillageId",
        to = "super::village::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Village,
    #[sea_orm(has_many = "super::language_record::Entity")]
    LanguageRecord,
}

impl Related<super::village::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Village.def()
    }
}

impl Related<super::language_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LanguageRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.speaker_id,
            self.age_range.to_value(),
            self.gender.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_choice_codes() {
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("100+".parse::<AgeRange>().unwrap(), AgeRange::Centenarian);
        assert!("X".parse::<Gender>().is_err());
        assert!("20-29".parse::<AgeRange>().is_err());
    }

    #[test]
    fn display_includes_age_and_gender() {
        let s = Model {
            id: 1,
            speaker_id: "SPK001".to_string(),
            age_range: AgeRange::Seventies,
            gender: Gender::Female,
            village_id: None,
            consent_video: false,
            notes: String::new(),
        };
        assert_eq!(s.to_string(), "SPK001 (70-79, Female)");
    }
}
