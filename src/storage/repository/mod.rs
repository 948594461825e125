pub mod geographic_record_repo;
pub mod language_record_repo;
pub mod onomatopoeia_type_repo;
pub mod speaker_repo;
pub mod village_repo;

pub use geographic_record_repo::{
    GeographicRecordFields, GeographicRecordFilter, GeographicRecordRepository,
};
pub use language_record_repo::{LanguageRecordFields, LanguageRecordFilter, LanguageRecordRepository};
pub use onomatopoeia_type_repo::{NewOnomatopoeiaType, OnomatopoeiaTypeRepository};
pub use speaker_repo::{NewSpeaker, SpeakerFilter, SpeakerRepository};
pub use village_repo::{NewVillage, VillageRepository};

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Select};

/// One page of an admin list view. `page` is zero-based.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn num_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        (self.total + self.per_page - 1) / self.per_page
    }
}

/// Outcome of a delete that may be blocked by dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Protected { dependents: u64 },
}

pub(crate) async fn fetch_page<'db, E>(
    db: &'db DatabaseConnection,
    select: Select<E>,
    page: u64,
    per_page: u64,
) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Sync + 'db,
{
    let per_page = per_page.max(1);
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page).await?;
    Ok(Page {
        items,
        page,
        per_page,
        total,
    })
}

/// Non-blank, trimmed search term.
pub(crate) fn search_term(q: Option<&str>) -> Option<String> {
    q.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
