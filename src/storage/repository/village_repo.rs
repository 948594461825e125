use super::{fetch_page, search_term, Page};
use crate::storage::entity::village::{self, ActiveModel as VillageActiveModel, Entity as Village};
use crate::storage::entity::{geographic_record, language_record, speaker};
use log::info;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NewVillage {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: String,
}

pub struct VillageRepository;

impl VillageRepository {
    pub async fn create(db: &DatabaseConnection, v: NewVillage) -> Result<village::Model, DbErr> {
        let am = VillageActiveModel {
            name: Set(v.name.trim().to_string()),
            latitude: Set(v.latitude),
            longitude: Set(v.longitude),
            description: Set(v.description),
            ..Default::default()
        };
        am.insert(db).await
    }

    pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<village::Model>, DbErr> {
        Village::find_by_id(id).one(db).await
    }

    pub async fn find_many(
        db: &DatabaseConnection,
        ids: &[i32],
    ) -> Result<Vec<village::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Village::find()
            .filter(village::Column::Id.is_in(ids.iter().copied()))
            .all(db)
            .await
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        v: NewVillage,
    ) -> Result<Option<village::Model>, DbErr> {
        let Some(existing) = Village::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut am: VillageActiveModel = existing.into();
        am.name = Set(v.name.trim().to_string());
        am.latitude = Set(v.latitude);
        am.longitude = Set(v.longitude);
        am.description = Set(v.description);
        Ok(Some(am.update(db).await?))
    }

    /// Admin list view: search by name, ordered by name.
    pub async fn list(
        db: &DatabaseConnection,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<village::Model>, DbErr> {
        let mut query = Village::find();
        if let Some(q) = search_term(search) {
            query = query.filter(village::Column::Name.contains(q));
        }
        let query = query
            .order_by_asc(village::Column::Name)
            .order_by_asc(village::Column::Id);
        fetch_page(db, query, page, per_page).await
    }

    /// Deletes the village and clears every reference to it. Dependents are
    /// never deleted.
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
        let txn = db.begin().await?;

        let speakers = speaker::Entity::update_many()
            .col_expr(speaker::Column::VillageId, Expr::value(Option::<i32>::None))
            .filter(speaker::Column::VillageId.eq(id))
            .exec(&txn)
            .await?;
        let records = language_record::Entity::update_many()
            .col_expr(
                language_record::Column::VillageId,
                Expr::value(Option::<i32>::None),
            )
            .filter(language_record::Column::VillageId.eq(id))
            .exec(&txn)
            .await?;
        let geo = geographic_record::Entity::update_many()
            .col_expr(
                geographic_record::Column::VillageId,
                Expr::value(Option::<i32>::None),
            )
            .filter(geographic_record::Column::VillageId.eq(id))
            .exec(&txn)
            .await?;

        let res = Village::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        if res.rows_affected > 0 {
            info!(
                "deleted village #{} (detached {} speakers, {} language records, {} geographic records)",
                id, speakers.rows_affected, records.rows_affected, geo.rows_affected
            );
        }
        Ok(res.rows_affected > 0)
    }
}
