/// investorsテーブルのリポジトリ
///
/// リスト列とタイムラインはJSONBとして保存する。
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use super::database::RepositoryError;
use crate::domain::{Investor, InvestorUpdate, NewInvestor, TimelineEntry};

const INVESTOR_COLUMNS: &str = "id, broker_id, first_name, last_name, email, phone, stage, \
     COALESCE(profile_budget, 0)::float8 AS profile_budget, \
     COALESCE(profile_strategies, '[]'::jsonb) AS profile_strategies, \
     profile_risk_tolerance, \
     COALESCE(profile_preferred_property_types, '[]'::jsonb) AS profile_preferred_property_types, \
     COALESCE(profile_preferred_locations, '[]'::jsonb) AS profile_preferred_locations, \
     interaction_source, interaction_notes, interaction_last_contact, \
     COALESCE(timeline, '[]'::jsonb) AS timeline, \
     created_at, updated_at";

/// 投資家永続化用トレイト
#[async_trait]
pub trait InvestorRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Investor>, RepositoryError>;

    /// ブローカーの投資家を新しい順に取得
    async fn list_by_broker(&self, broker_id: &str) -> Result<Vec<Investor>, RepositoryError>;

    async fn insert(
        &self,
        id: &str,
        investor: &NewInvestor,
        timeline: Vec<TimelineEntry>,
    ) -> Result<Investor, RepositoryError>;

    /// stageとメモを更新し、接触日時を打刻してタイムラインに追記する
    async fn update(
        &self,
        update: &InvestorUpdate,
        appended: Vec<TimelineEntry>,
    ) -> Result<Option<Investor>, RepositoryError>;
}

/// 投資家更新クエリ
///
/// $1: id, $2: stage, $3: メモ, $4: 追記するタイムライン（JSONB配列）。
/// stageとメモはNULLなら現在値を保つ。
pub(crate) fn investor_update_sql() -> String {
    format!(
        "UPDATE investors SET \
         stage = COALESCE($2, stage), \
         interaction_notes = COALESCE($3, interaction_notes), \
         interaction_last_contact = CURRENT_TIMESTAMP, \
         timeline = COALESCE(timeline, '[]'::jsonb) || $4, \
         updated_at = CURRENT_TIMESTAMP \
         WHERE id = $1 \
         RETURNING {}",
        INVESTOR_COLUMNS
    )
}

/// InvestorRepositoryのPostgreSQL実装
#[derive(Debug, Clone)]
pub struct PgInvestorRepository {
    pool: PgPool,
}

impl PgInvestorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvestorRepository for PgInvestorRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Investor>, RepositoryError> {
        let sql = format!("SELECT {} FROM investors WHERE id = $1", INVESTOR_COLUMNS);
        let investor = sqlx::query_as::<_, Investor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(investor)
    }

    async fn list_by_broker(&self, broker_id: &str) -> Result<Vec<Investor>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM investors WHERE broker_id = $1 ORDER BY created_at DESC",
            INVESTOR_COLUMNS
        );
        let investors = sqlx::query_as::<_, Investor>(&sql)
            .bind(broker_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(investors)
    }

    async fn insert(
        &self,
        id: &str,
        investor: &NewInvestor,
        timeline: Vec<TimelineEntry>,
    ) -> Result<Investor, RepositoryError> {
        let sql = format!(
            "INSERT INTO investors \
             (id, broker_id, first_name, last_name, email, phone, stage, \
              profile_budget, profile_strategies, profile_risk_tolerance, \
              profile_preferred_property_types, profile_preferred_locations, \
              interaction_source, interaction_notes, timeline) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {}",
            INVESTOR_COLUMNS
        );
        let personal = &investor.personal_info;
        let profile = &investor.investment_profile;

        let created = sqlx::query_as::<_, Investor>(&sql)
            .bind(id)
            .bind(&investor.broker_id)
            .bind(&personal.first_name)
            .bind(&personal.last_name)
            .bind(&personal.email)
            .bind(&personal.phone)
            .bind(investor.stage.as_str())
            .bind(profile.budget)
            .bind(Json(profile.strategies.clone()))
            .bind(&profile.risk_tolerance)
            .bind(Json(profile.preferred_property_types.clone()))
            .bind(Json(profile.preferred_locations.clone()))
            .bind(&investor.interaction.source)
            .bind(investor.notes())
            .bind(Json(timeline))
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(
        &self,
        update: &InvestorUpdate,
        appended: Vec<TimelineEntry>,
    ) -> Result<Option<Investor>, RepositoryError> {
        let sql = investor_update_sql();
        let updated = sqlx::query_as::<_, Investor>(&sql)
            .bind(&update.id)
            .bind(update.stage.map(|stage| stage.as_str()))
            .bind(&update.notes)
            .bind(Json(appended))
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }
}
