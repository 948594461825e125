use super::{fetch_page, search_term, DeleteOutcome, Page};
use crate::storage::entity::language_record;
use crate::storage::entity::speaker::{
    self, ActiveModel as SpeakerActiveModel, AgeRange, Entity as Speaker, Gender,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Debug, Clone)]
pub struct NewSpeaker {
    pub speaker_id: String,
    pub age_range: AgeRange,
    pub gender: Gender,
    pub village_id: Option<i32>,
    pub consent_video: bool,
    pub notes: String,
}

/// Filters available in the speaker list view.
#[derive(Debug, Clone, Default)]
pub struct SpeakerFilter {
    pub search: Option<String>,
    pub gender: Option<Gender>,
    pub consent_video: Option<bool>,
    pub village_id: Option<i32>,
}

pub struct SpeakerRepository;

impl SpeakerRepository {
    /// Fails with a unique-constraint error when `speaker_id` is taken.
    pub async fn create(db: &DatabaseConnection, s: NewSpeaker) -> Result<speaker::Model, DbErr> {
        let am = SpeakerActiveModel {
            speaker_id: Set(s.speaker_id.trim().to_string()),
            age_range: Set(s.age_range),
            gender: Set(s.gender),
            village_id: Set(s.village_id),
            consent_video: Set(s.consent_video),
            notes: Set(s.notes),
            ..Default::default()
        };
        am.insert(db).await
    }

    pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<speaker::Model>, DbErr> {
        Speaker::find_by_id(id).one(db).await
    }

    pub async fn find_many(
        db: &DatabaseConnection,
        ids: &[i32],
    ) -> Result<Vec<speaker::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Speaker::find()
            .filter(speaker::Column::Id.is_in(ids.iter().copied()))
            .all(db)
            .await
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        s: NewSpeaker,
    ) -> Result<Option<speaker::Model>, DbErr> {
        let Some(existing) = Speaker::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut am: SpeakerActiveModel = existing.into();
        am.speaker_id = Set(s.speaker_id.trim().to_string());
        am.age_range = Set(s.age_range);
        am.gender = Set(s.gender);
        am.village_id = Set(s.village_id);
        am.consent_video = Set(s.consent_video);
        am.notes = Set(s.notes);
        Ok(Some(am.update(db).await?))
    }

    pub async fn list(
        db: &DatabaseConnection,
        filter: &SpeakerFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<speaker::Model>, DbErr> {
        let mut query = Speaker::find();
        if let Some(q) = search_term(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(speaker::Column::SpeakerId.contains(q.clone()))
                    .add(speaker::Column::AgeRange.contains(q)),
            );
        }
        if let Some(gender) = filter.gender {
            query = query.filter(speaker::Column::Gender.eq(gender));
        }
        if let Some(consent) = filter.consent_video {
            query = query.filter(speaker::Column::ConsentVideo.eq(consent));
        }
        if let Some(village_id) = filter.village_id {
            query = query.filter(speaker::Column::VillageId.eq(village_id));
        }
        let query = query.order_by_asc(speaker::Column::SpeakerId);
        fetch_page(db, query, page, per_page).await
    }

    pub async fn count_language_records(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr> {
        language_record::Entity::find()
            .filter(language_record::Column::SpeakerId.eq(id))
            .count(db)
            .await
    }

    /// Refuses while any language record still points at the speaker.
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<DeleteOutcome, DbErr> {
        let dependents = Self::count_language_records(db, id).await?;
        if dependents > 0 {
            return Ok(DeleteOutcome::Protected { dependents });
        }
        let res = Speaker::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Ok(DeleteOutcome::NotFound);
        }
        Ok(DeleteOutcome::Deleted)
    }
}
