use super::{fetch_page, search_term, Page};
use crate::storage::entity::geographic_record::{
    self, ActiveModel as GeographicRecordActiveModel, ContentType, Entity as GeographicRecord,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GeographicRecordFields {
    pub title: String,
    pub content_type: ContentType,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub youtube_url: Option<String>,
    pub description: String,
    pub village_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct GeographicRecordFilter {
    pub search: Option<String>,
    pub content_type: Option<ContentType>,
    pub village_id: Option<i32>,
    pub captured_from: Option<NaiveDate>,
    pub captured_to: Option<NaiveDate>,
}

pub struct GeographicRecordRepository;

impl GeographicRecordRepository {
    pub async fn insert(
        db: &DatabaseConnection,
        fields: GeographicRecordFields,
    ) -> Result<geographic_record::Model, DbErr> {
        let mut am = GeographicRecordActiveModel {
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        apply(&mut am, fields);
        am.insert(db).await
    }

    pub async fn find(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<geographic_record::Model>, DbErr> {
        GeographicRecord::find_by_id(id).one(db).await
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        fields: GeographicRecordFields,
    ) -> Result<Option<geographic_record::Model>, DbErr> {
        let Some(existing) = GeographicRecord::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut am: GeographicRecordActiveModel = existing.into();
        apply(&mut am, fields);
        Ok(Some(am.update(db).await?))
    }

    /// Admin list view, most recently captured first.
    pub async fn list(
        db: &DatabaseConnection,
        filter: &GeographicRecordFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<geographic_record::Model>, DbErr> {
        let mut query = GeographicRecord::find();
        if let Some(q) = search_term(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(geographic_record::Column::Title.contains(q.clone()))
                    .add(geographic_record::Column::Description.contains(q)),
            );
        }
        if let Some(content_type) = filter.content_type {
            query = query.filter(geographic_record::Column::ContentType.eq(content_type));
        }
        if let Some(village_id) = filter.village_id {
            query = query.filter(geographic_record::Column::VillageId.eq(village_id));
        }
        if let Some(from) = filter.captured_from {
            query = query.filter(geographic_record::Column::CapturedDate.gte(from));
        }
        if let Some(to) = filter.captured_to {
            query = query.filter(geographic_record::Column::CapturedDate.lte(to));
        }
        let query = query
            .order_by_desc(geographic_record::Column::CapturedDate)
            .order_by_desc(geographic_record::Column::Id);
        fetch_page(db, query, page, per_page).await
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
        let res = GeographicRecord::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected > 0)
    }
}

fn apply(am: &mut GeographicRecordActiveModel, f: GeographicRecordFields) {
    am.title = Set(f.title);
    am.content_type = Set(f.content_type);
    am.file_path = Set(f.file_path);
    am.thumbnail_path = Set(f.thumbnail_path);
    am.youtube_url = Set(f.youtube_url);
    am.description = Set(f.description);
    am.village_id = Set(f.village_id);
    am.latitude = Set(f.latitude);
    am.longitude = Set(f.longitude);
    am.captured_date = Set(f.captured_date);
}
