use super::{fetch_page, search_term, Page};
use crate::storage::entity::language_record::{
    self, ActiveModel as LanguageRecordActiveModel, Entity as LanguageRecord, FileType,
    LanguageFrequency,
};
use crate::storage::entity::speaker;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

/// Every stored column except the id and the timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRecordFields {
    pub onomatopoeia_text: Option<String>,
    pub meaning: Option<String>,
    pub usage_example: Option<String>,
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
    pub description: Option<String>,
    pub recorded_date: NaiveDate,
    pub notes: String,
}

/// Filters available in the language record list view.
#[derive(Debug, Clone, Default)]
pub struct LanguageRecordFilter {
    /// Matches onomatopoeia, meaning, title and description.
    pub search: Option<String>,
    pub file_type: Option<FileType>,
    /// Village of the record's speaker, not the record's own village.
    pub speaker_village_id: Option<i32>,
    pub recorded_from: Option<NaiveDate>,
    pub recorded_to: Option<NaiveDate>,
    pub onomatopoeia_type_id: Option<i32>,
    pub language_frequency: Option<LanguageFrequency>,
}

pub struct LanguageRecordRepository;

impl LanguageRecordRepository {
    pub async fn insert(
        db: &DatabaseConnection,
        fields: LanguageRecordFields,
    ) -> Result<language_record::Model, DbErr> {
        let now = Utc::now().timestamp();
        let mut am = LanguageRecordActiveModel {
            created_at: Set(now),
            ..Default::default()
        };
        apply(&mut am, fields, now);
        am.insert(db).await
    }

    pub async fn find(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<language_record::Model>, DbErr> {
        LanguageRecord::find_by_id(id).one(db).await
    }

    /// Overwrites every editable column and bumps `updated_at`.
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        fields: LanguageRecordFields,
    ) -> Result<Option<language_record::Model>, DbErr> {
        let Some(existing) = LanguageRecord::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut am: LanguageRecordActiveModel = existing.into();
        apply(&mut am, fields, Utc::now().timestamp());
        Ok(Some(am.update(db).await?))
    }

    /// Admin list view, most recently recorded first.
    pub async fn list(
        db: &DatabaseConnection,
        filter: &LanguageRecordFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<language_record::Model>, DbErr> {
        let mut query = LanguageRecord::find();
        if let Some(q) = search_term(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(language_record::Column::OnomatopoeiaText.contains(q.clone()))
                    .add(language_record::Column::Meaning.contains(q.clone()))
                    .add(language_record::Column::Title.contains(q.clone()))
                    .add(language_record::Column::Description.contains(q)),
            );
        }
        if let Some(file_type) = filter.file_type {
            query = query.filter(language_record::Column::FileType.eq(file_type));
        }
        if let Some(village_id) = filter.speaker_village_id {
            query = query.filter(
                language_record::Column::SpeakerId.in_subquery(
                    Query::select()
                        .column(speaker::Column::Id)
                        .from(speaker::Entity)
                        .and_where(speaker::Column::VillageId.eq(village_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(from) = filter.recorded_from {
            query = query.filter(language_record::Column::RecordedDate.gte(from));
        }
        if let Some(to) = filter.recorded_to {
            query = query.filter(language_record::Column::RecordedDate.lte(to));
        }
        if let Some(type_id) = filter.onomatopoeia_type_id {
            query = query.filter(language_record::Column::OnomatopoeiaTypeId.eq(type_id));
        }
        if let Some(freq) = filter.language_frequency {
            query = query.filter(language_record::Column::LanguageFrequency.eq(freq));
        }
        let query = query
            .order_by_desc(language_record::Column::RecordedDate)
            .order_by_desc(language_record::Column::Id);
        fetch_page(db, query, page, per_page).await
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
        let res = LanguageRecord::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected > 0)
    }
}

fn apply(am: &mut LanguageRecordActiveModel, f: LanguageRecordFields, now: i64) {
    am.onomatopoeia_text = Set(f.onomatopoeia_text);
    am.meaning = Set(f.meaning);
    am.usage_example = Set(f.usage_example);
    am.phonetic_notation = Set(f.phonetic_notation);
    am.language_frequency = Set(f.language_frequency);
    am.file_type = Set(f.file_type);
    am.file_path = Set(f.file_path);
    am.thumbnail_path = Set(f.thumbnail_path);
    am.youtube_url = Set(f.youtube_url);
    am.speaker_id = Set(f.speaker_id);
    am.onomatopoeia_type_id = Set(f.onomatopoeia_type_id);
    am.village_id = Set(f.village_id);
    am.title = Set(f.title);
    am.description = Set(f.description);
    am.recorded_date = Set(f.recorded_date);
    am.notes = Set(f.notes);
    am.updated_at = Set(now);
}
