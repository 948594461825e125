use super::UnknownChoice;
use crate::records::embed::{self, EmbedHost};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    #[sea_orm(string_value = "audio")]
    Audio,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "image")]
    Image,
}

impl FromStr for FileType {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_value(&s.trim().to_string()).map_err(|_| UnknownChoice::new("file_type", s))
    }
}

/// How often the speaker reports using the word. Unselected is stored as NULL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum LanguageFrequency {
    #[sea_orm(string_value = "daily")]
    Daily,
    #[sea_orm(string_value = "often")]
    Often,
    #[sea_orm(string_value = "sometimes")]
    Sometimes,
    #[sea_orm(string_value = "rarely")]
    Rarely,
}

impl FromStr for LanguageFrequency {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_value(&s.trim().to_string())
            .map_err(|_| UnknownChoice::new("language_frequency", s))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "language_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // vocabulary fields, optional for YouTube-only records
    pub onomatopoeia_text: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub meaning: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub usage_example: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub phonetic_notation: Option<String>,
    pub language_frequency: Option<LanguageFrequency>,

    pub file_type: FileType,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub youtube_url: Option<String>,

    pub speaker_id: Option<i32>,
    pub onomatopoeia_type_id: Option<i32>,
    pub village_id: Option<i32>,

    pub title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub recorded_date: Date,
    pub created_at: i64,
    pub updated_at: i64,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::speaker::Entity",
        from = "Column::SpeakerId",
        to = "super::speaker::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Speaker,
    #[sea_orm(
        belongs_to = "super::onomatopoeia_type::Entity",
        from = "Column::OnomatopoeiaTypeId",
        to = "super::onomatopoeia_type::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    OnomatopoeiaType,
    #[sea_orm(
        belongs_to = "super::village::Entity",
        from = "Column::VillageId",
        to = "super::village::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Village,
}

impl Related<super::speaker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Speaker.def()
    }
}

impl Related<super::onomatopoeia_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OnomatopoeiaType.def()
    }
}

impl Related<super::village::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Village.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Title shown in lists: the YouTube title when the record is link-backed,
    /// otherwise the onomatopoeia itself.
    pub fn display_title(&self) -> String {
        let youtube = embed::non_blank(self.youtube_url.as_deref());
        let title = embed::non_blank(self.title.as_deref());
        if let (Some(_), Some(title)) = (youtube, title) {
            return title.to_string();
        }
        if let Some(text) = embed::non_blank(self.onomatopoeia_text.as_deref()) {
            return text.to_string();
        }
        format!("Record #{}", self.id)
    }

    pub fn youtube_embed_url(&self) -> Option<String> {
        embed::youtube_embed_url(self.youtube_url.as_deref(), EmbedHost::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> Model {
        Model {
            id: 7,
            onomatopoeia_text: Some("zaa-zaa".to_string()),
            meaning: None,
            usage_example: None,
            phonetic_notation: None,
            language_frequency: None,
            file_type: FileType::Video,
            file_path: None,
            thumbnail_path: None,
            youtube_url: None,
            speaker_id: None,
            onomatopoeia_type_id: None,
            village_id: None,
            title: Some("Rain festival".to_string()),
            description: None,
            recorded_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            created_at: 0,
            updated_at: 0,
            notes: String::new(),
        }
    }

    #[test]
    fn display_title_uses_onomatopoeia_without_youtube() {
        assert_eq!(record().display_title(), "zaa-zaa");
    }

    #[test]
    fn display_title_prefers_title_for_youtube_records() {
        let mut r = record();
        r.youtube_url = Some("https://youtu.be/xyz789".to_string());
        assert_eq!(r.display_title(), "Rain festival");
    }

    #[test]
    fn display_title_falls_back_to_record_number() {
        let mut r = record();
        r.onomatopoeia_text = Some("  ".to_string());
        r.youtube_url = Some("https://youtu.be/xyz789".to_string());
        r.title = None;
        assert_eq!(r.display_title(), "Record #7");
    }

    #[test]
    fn embed_url_uses_standard_host() {
        let mut r = record();
        assert_eq!(r.youtube_embed_url(), None);
        r.youtube_url = Some("https://www.youtube.com/watch?v=abc123&t=5".to_string());
        assert_eq!(
            r.youtube_embed_url().as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );
    }

    #[test]
    fn frequency_codes_parse() {
        assert_eq!(
            "sometimes".parse::<LanguageFrequency>().unwrap(),
            LanguageFrequency::Sometimes
        );
        assert!("never".parse::<LanguageFrequency>().is_err());
        assert_eq!("image".parse::<FileType>().unwrap(), FileType::Image);
    }
}
