/// investment_objectsテーブルのリポジトリ
///
/// 一覧フィルターと部分更新のSQLは`QueryBuilder`で組み立て、
/// 値はすべてバインドパラメータとして渡す。
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::database::RepositoryError;
use crate::domain::{InvestmentObject, NewInvestmentObject, ObjectFilter, ObjectPatch};

pub(crate) const OBJECT_COLUMNS: &str = "id, broker_id, title, city, address, property_type, \
     COALESCE(area, 0)::float8 AS area, \
     COALESCE(price, 0)::float8 AS price, \
     COALESCE(yield_percent, 0)::float8 AS yield_percent, \
     COALESCE(payback_years, 0)::float8 AS payback_years, \
     description, COALESCE(images, '{}') AS images, status, created_at, updated_at";

/// 投資対象物件の永続化用トレイト
#[async_trait]
pub trait InvestmentObjectRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<InvestmentObject>, RepositoryError>;

    /// フィルターに一致する物件を新しい順に最大`limit`件取得
    async fn list(
        &self,
        filter: &ObjectFilter,
        limit: i64,
    ) -> Result<Vec<InvestmentObject>, RepositoryError>;

    async fn insert(
        &self,
        object: &NewInvestmentObject,
    ) -> Result<InvestmentObject, RepositoryError>;

    /// 指定フィールドのみ更新する
    ///
    /// IDに一致する行がなければ`Ok(None)`。
    async fn update(
        &self,
        patch: &ObjectPatch,
    ) -> Result<Option<InvestmentObject>, RepositoryError>;
}

/// 一覧取得クエリを組み立てる
pub fn build_object_list_query(
    filter: &ObjectFilter,
    limit: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM investment_objects WHERE 1=1",
        OBJECT_COLUMNS
    ));

    if let Some(city) = &filter.city {
        qb.push(" AND city = ").push_bind(city.clone());
    }
    if let Some(property_type) = &filter.property_type {
        qb.push(" AND property_type = ").push_bind(property_type.clone());
    }
    if let Some(status) = &filter.status {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(min_price) = filter.min_price {
        qb.push(" AND price::float8 >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        qb.push(" AND price::float8 <= ").push_bind(max_price);
    }
    if let Some(min_yield) = filter.min_yield {
        qb.push(" AND yield_percent::float8 >= ").push_bind(min_yield);
    }
    if let Some(max_yield) = filter.max_yield {
        qb.push(" AND yield_percent::float8 <= ").push_bind(max_yield);
    }

    qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit);
    qb
}

/// 部分更新クエリを組み立てる
///
/// `updated_at`は指定フィールドに関わらず常に更新する。
/// nullで指定されたフィールドにはNULLをバインドする。
pub fn build_object_update_query(patch: &ObjectPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE investment_objects SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(status) = &patch.status {
            set.push("status = ").push_bind_unseparated(status.clone());
        }
        if let Some(price) = patch.price {
            set.push("price = ").push_bind_unseparated(price);
        }
        if let Some(yield_percent) = patch.yield_percent {
            set.push("yield_percent = ").push_bind_unseparated(yield_percent);
        }
        if let Some(description) = &patch.description {
            set.push("description = ").push_bind_unseparated(description.clone());
        }
        set.push("updated_at = CURRENT_TIMESTAMP");
    }
    qb.push(" WHERE id = ").push_bind(patch.id);
    qb.push(" RETURNING ").push(OBJECT_COLUMNS);
    qb
}

/// InvestmentObjectRepositoryのPostgreSQL実装
#[derive(Debug, Clone)]
pub struct PgInvestmentObjectRepository {
    pool: PgPool,
}

impl PgInvestmentObjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvestmentObjectRepository for PgInvestmentObjectRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<InvestmentObject>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM investment_objects WHERE id = $1",
            OBJECT_COLUMNS
        );
        let object = sqlx::query_as::<_, InvestmentObject>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(object)
    }

    async fn list(
        &self,
        filter: &ObjectFilter,
        limit: i64,
    ) -> Result<Vec<InvestmentObject>, RepositoryError> {
        let mut qb = build_object_list_query(filter, limit);
        let objects = qb
            .build_query_as::<InvestmentObject>()
            .fetch_all(&self.pool)
            .await?;
        Ok(objects)
    }

    async fn insert(
        &self,
        object: &NewInvestmentObject,
    ) -> Result<InvestmentObject, RepositoryError> {
        let sql = format!(
            "INSERT INTO investment_objects \
             (broker_id, title, city, address, property_type, area, price, \
              yield_percent, payback_years, description, images, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {}",
            OBJECT_COLUMNS
        );
        let created = sqlx::query_as::<_, InvestmentObject>(&sql)
            .bind(object.broker_id)
            .bind(&object.title)
            .bind(&object.city)
            .bind(&object.address)
            .bind(&object.property_type)
            .bind(object.area)
            .bind(object.price)
            .bind(object.yield_percent)
            .bind(object.payback_years)
            .bind(&object.description)
            .bind(&object.images)
            .bind(&object.status)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(
        &self,
        patch: &ObjectPatch,
    ) -> Result<Option<InvestmentObject>, RepositoryError> {
        let mut qb = build_object_update_query(patch);
        let updated = qb
            .build_query_as::<InvestmentObject>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }
}
