/// propertiesテーブルのリポジトリ
///
/// 入れ子のリクエストを`<グループ>_<フィールド>`形式の列に展開して保存する。
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use super::database::RepositoryError;
use crate::domain::{NewProperty, Property, PropertyUpdate};

const PROPERTY_COLUMNS: &str = "id, broker_id, title, description, property_type, status, \
     location_city, location_district, location_address, location_metro, \
     COALESCE(location_metro_distance, 0)::float8 AS location_metro_distance, \
     COALESCE(pricing_total_price, 0)::float8 AS pricing_total_price, \
     COALESCE(pricing_price_per_meter, 0)::float8 AS pricing_price_per_meter, \
     COALESCE(pricing_min_investment, 0)::float8 AS pricing_min_investment, \
     pricing_currency, financing_method, \
     COALESCE(financing_mortgage_rate, 0)::float8 AS financing_mortgage_rate, \
     COALESCE(financing_down_payment, 0)::float8 AS financing_down_payment, \
     COALESCE(investment_strategies, '[]'::jsonb) AS investment_strategies, \
     COALESCE(investment_expected_return, 0)::float8 AS investment_expected_return, \
     investment_term, investment_risk_level, \
     COALESCE(investment_target_investment, 0)::float8 AS investment_target_investment, \
     COALESCE(details_area, 0)::float8 AS details_area, \
     details_rooms, details_floor, details_total_floors, \
     COALESCE(media_images, '[]'::jsonb) AS media_images, \
     created_at, updated_at";

/// 掲載物件永続化用トレイト
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, RepositoryError>;

    /// ブローカーの物件を新しい順に取得（件数の上限なし）
    async fn list_by_broker(&self, broker_id: &str) -> Result<Vec<Property>, RepositoryError>;

    /// 公開中（status = 'active'）の物件を新しい順に最大`limit`件取得
    async fn list_active(&self, limit: i64) -> Result<Vec<Property>, RepositoryError>;

    async fn insert(&self, id: &str, property: &NewProperty)
    -> Result<Property, RepositoryError>;

    /// タイトル・説明・ステータス・価格2項目を上書きする
    async fn update(&self, update: &PropertyUpdate)
    -> Result<Option<Property>, RepositoryError>;
}

/// PropertyRepositoryのPostgreSQL実装
#[derive(Debug, Clone)]
pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, RepositoryError> {
        let sql = format!("SELECT {} FROM properties WHERE id = $1", PROPERTY_COLUMNS);
        let property = sqlx::query_as::<_, Property>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(property)
    }

    async fn list_by_broker(&self, broker_id: &str) -> Result<Vec<Property>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM properties WHERE broker_id = $1 ORDER BY created_at DESC",
            PROPERTY_COLUMNS
        );
        let properties = sqlx::query_as::<_, Property>(&sql)
            .bind(broker_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(properties)
    }

    async fn list_active(&self, limit: i64) -> Result<Vec<Property>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM properties WHERE status = 'active' \
             ORDER BY created_at DESC LIMIT $1",
            PROPERTY_COLUMNS
        );
        let properties = sqlx::query_as::<_, Property>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(properties)
    }

    async fn insert(
        &self,
        id: &str,
        property: &NewProperty,
    ) -> Result<Property, RepositoryError> {
        let sql = format!(
            "INSERT INTO properties \
             (id, broker_id, title, description, property_type, status, \
              location_city, location_district, location_address, location_metro, \
              location_metro_distance, pricing_total_price, pricing_price_per_meter, \
              pricing_min_investment, pricing_currency, financing_method, \
              financing_mortgage_rate, financing_down_payment, investment_strategies, \
              investment_expected_return, investment_term, investment_risk_level, \
              investment_target_investment, details_area, details_rooms, details_floor, \
              details_total_floors, media_images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28) \
             RETURNING {}",
            PROPERTY_COLUMNS
        );
        let location = &property.location;
        let pricing = &property.pricing;
        let financing = &property.financing;
        let investment = &property.investment;
        let details = &property.details;

        let created = sqlx::query_as::<_, Property>(&sql)
            .bind(id)
            .bind(&property.broker_id)
            .bind(&property.title)
            .bind(&property.description)
            .bind(&property.property_type)
            .bind(property.status.as_str())
            .bind(&location.city)
            .bind(&location.district)
            .bind(&location.address)
            .bind(&location.metro)
            .bind(location.metro_distance)
            .bind(pricing.total_price)
            .bind(pricing.price_per_meter)
            .bind(pricing.min_investment)
            .bind(property.currency())
            .bind(&financing.method)
            .bind(financing.mortgage_rate)
            .bind(financing.down_payment)
            .bind(Json(investment.strategy.clone()))
            .bind(investment.expected_return)
            .bind(investment.term)
            .bind(&investment.risk_level)
            .bind(investment.target_investment)
            .bind(details.area)
            .bind(details.rooms)
            .bind(details.floor)
            .bind(details.total_floors)
            .bind(Json(property.media.images.clone()))
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(
        &self,
        update: &PropertyUpdate,
    ) -> Result<Option<Property>, RepositoryError> {
        let sql = format!(
            "UPDATE properties SET title = $2, description = $3, status = $4, \
             pricing_total_price = $5, pricing_min_investment = $6, \
             updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 \
             RETURNING {}",
            PROPERTY_COLUMNS
        );
        let updated = sqlx::query_as::<_, Property>(&sql)
            .bind(&update.id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.status.as_str())
            .bind(update.total_price)
            .bind(update.min_investment)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }
}
