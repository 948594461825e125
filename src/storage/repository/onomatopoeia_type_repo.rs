use super::{fetch_page, search_term, Page};
use crate::storage::entity::language_record;
use crate::storage::entity::onomatopoeia_type::{
    self, ActiveModel as OnomatopoeiaTypeActiveModel, Entity as OnomatopoeiaType,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NewOnomatopoeiaType {
    pub type_code: String,
    pub type_name: String,
    #[serde(default)]
    pub description: String,
}

pub struct OnomatopoeiaTypeRepository;

impl OnomatopoeiaTypeRepository {
    pub async fn create(
        db: &DatabaseConnection,
        t: NewOnomatopoeiaType,
    ) -> Result<onomatopoeia_type::Model, DbErr> {
        let am = OnomatopoeiaTypeActiveModel {
            type_code: Set(t.type_code.trim().to_string()),
            type_name: Set(t.type_name.trim().to_string()),
            description: Set(t.description),
            ..Default::default()
        };
        am.insert(db).await
    }

    pub async fn find(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<onomatopoeia_type::Model>, DbErr> {
        OnomatopoeiaType::find_by_id(id).one(db).await
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        t: NewOnomatopoeiaType,
    ) -> Result<Option<onomatopoeia_type::Model>, DbErr> {
        let Some(existing) = OnomatopoeiaType::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut am: OnomatopoeiaTypeActiveModel = existing.into();
        am.type_code = Set(t.type_code.trim().to_string());
        am.type_name = Set(t.type_name.trim().to_string());
        am.description = Set(t.description);
        Ok(Some(am.update(db).await?))
    }

    pub async fn list(
        db: &DatabaseConnection,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<onomatopoeia_type::Model>, DbErr> {
        let mut query = OnomatopoeiaType::find();
        if let Some(q) = search_term(search) {
            query = query.filter(
                Condition::any()
                    .add(onomatopoeia_type::Column::TypeCode.contains(q.clone()))
                    .add(onomatopoeia_type::Column::TypeName.contains(q)),
            );
        }
        let query = query.order_by_asc(onomatopoeia_type::Column::TypeCode);
        fetch_page(db, query, page, per_page).await
    }

    /// Records classified under the type keep existing, unclassified.
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
        let txn = db.begin().await?;
        language_record::Entity::update_many()
            .col_expr(
                language_record::Column::OnomatopoeiaTypeId,
                Expr::value(Option::<i32>::None),
            )
            .filter(language_record::Column::OnomatopoeiaTypeId.eq(id))
            .exec(&txn)
            .await?;
        let res = OnomatopoeiaType::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }
}
