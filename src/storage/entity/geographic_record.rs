use super::UnknownChoice;
use crate::records::embed::{self, EmbedHost};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[sea_orm(string_value = "drone_video")]
    DroneVideo,
    #[sea_orm(string_value = "drone_photo")]
    DronePhoto,
    #[sea_orm(string_value = "other")]
    Other,
}

impl FromStr for ContentType {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_value(&s.trim().to_string())
            .map_err(|_| UnknownChoice::new("content_type", s))
    }
}

/// Environmental media (drone footage, photos) tied to a village.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "geographic_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub content_type: ContentType,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub youtube_url: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    // nullable here, required on submission
    pub village_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_date: Date,
    pub created_at: i64,
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
}

impl Related<super::village::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Village.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn display_title(&self) -> String {
        self.title.clone()
    }

    /// Embeds through the privacy-enhanced host with related videos disabled.
    pub fn youtube_embed_url(&self) -> Option<String> {
        embed::youtube_embed_url(self.youtube_url.as_deref(), EmbedHost::PrivacyEnhanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn embed_url_uses_privacy_enhanced_host() {
        let record = Model {
            id: 1,
            title: "Coastline survey".to_string(),
            content_type: ContentType::DroneVideo,
            file_path: None,
            thumbnail_path: None,
            youtube_url: Some("https://www.youtube.com/embed/qqq111".to_string()),
            description: "North shore".to_string(),
            village_id: Some(1),
            latitude: None,
            longitude: None,
            captured_date: NaiveDate::from_ymd_opt(2023, 11, 2).unwrap(),
            created_at: 0,
        };
        let url = record.youtube_embed_url().unwrap();
        assert_eq!(
            url,
            "https://www.youtube-nocookie.com/embed/qqq111?rel=0&modestbranding=1"
        );
        assert!(url.contains("rel=0"));
        assert_eq!(record.display_title(), "Coastline survey");
    }
}
