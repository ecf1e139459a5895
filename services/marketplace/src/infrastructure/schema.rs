/// ハンドラーが前提とするPostgreSQLスキーマ
///
/// すべて`IF NOT EXISTS`で記述しているため、何度適用しても結果は同じ。
/// favoritesの(user_id, object_id)には一意制約を付けない。
/// 重複はアプリケーション側のチェックで防ぐ。
use sqlx::PgPool;

use super::database::RepositoryError;

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    role VARCHAR(50) NOT NULL DEFAULT 'investor',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS investment_objects (
    id SERIAL PRIMARY KEY,
    broker_id INTEGER,
    title VARCHAR(255) NOT NULL,
    city VARCHAR(100) NOT NULL,
    address VARCHAR(500) NOT NULL,
    property_type VARCHAR(50) NOT NULL,
    area NUMERIC(10, 2),
    price NUMERIC(15, 2),
    yield_percent NUMERIC(5, 2),
    payback_years NUMERIC(5, 2),
    description TEXT,
    images TEXT[] DEFAULT '{}',
    status VARCHAR(50) NOT NULL DEFAULT 'available',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_investment_objects_created_at
    ON investment_objects (created_at DESC);
CREATE INDEX IF NOT EXISTS idx_investment_objects_city ON investment_objects (city);

CREATE TABLE IF NOT EXISTS favorites (
    id SERIAL PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users (id),
    object_id INTEGER NOT NULL REFERENCES investment_objects (id),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_favorites_user_id ON favorites (user_id);

CREATE TABLE IF NOT EXISTS brokers (
    id VARCHAR(36) PRIMARY KEY,
    email VARCHAR(255) NOT NULL,
    first_name VARCHAR(100),
    last_name VARCHAR(100),
    phone VARCHAR(50),
    avatar TEXT,
    company VARCHAR(255),
    referral_code VARCHAR(20) UNIQUE,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS investors (
    id VARCHAR(36) PRIMARY KEY,
    broker_id VARCHAR(36) REFERENCES brokers (id),
    first_name VARCHAR(100),
    last_name VARCHAR(100),
    email VARCHAR(255),
    phone VARCHAR(50),
    stage VARCHAR(50) DEFAULT 'lead',
    profile_budget NUMERIC(15, 2),
    profile_strategies JSONB DEFAULT '[]',
    profile_risk_tolerance VARCHAR(20),
    profile_preferred_property_types JSONB DEFAULT '[]',
    profile_preferred_locations JSONB DEFAULT '[]',
    interaction_source VARCHAR(100),
    interaction_notes TEXT,
    interaction_last_contact TIMESTAMP,
    timeline JSONB DEFAULT '[]',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_investors_broker_id ON investors (broker_id);

CREATE TABLE IF NOT EXISTS properties (
    id VARCHAR(36) PRIMARY KEY,
    broker_id VARCHAR(36) REFERENCES brokers (id),
    title VARCHAR(255) NOT NULL,
    description TEXT,
    property_type VARCHAR(50),
    status VARCHAR(50) DEFAULT 'draft',
    location_city VARCHAR(100),
    location_district VARCHAR(100),
    location_address VARCHAR(500),
    location_metro VARCHAR(100),
    location_metro_distance NUMERIC(10, 2),
    pricing_total_price NUMERIC(15, 2),
    pricing_price_per_meter NUMERIC(15, 2),
    pricing_min_investment NUMERIC(15, 2),
    pricing_currency VARCHAR(10) DEFAULT 'RUB',
    financing_method VARCHAR(50),
    financing_mortgage_rate NUMERIC(5, 2),
    financing_down_payment NUMERIC(15, 2),
    investment_strategies JSONB DEFAULT '[]',
    investment_expected_return NUMERIC(5, 2),
    investment_term INTEGER,
    investment_risk_level VARCHAR(20),
    investment_target_investment NUMERIC(15, 2),
    details_area NUMERIC(10, 2),
    details_rooms INTEGER,
    details_floor INTEGER,
    details_total_floors INTEGER,
    media_images JSONB DEFAULT '[]',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_properties_broker_id ON properties (broker_id);
CREATE INDEX IF NOT EXISTS idx_properties_status ON properties (status);
"#;

/// スキーマを適用する
pub async fn apply_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

/// スキーマ内のテーブル名一覧（作成順）
pub fn schema_tables() -> Vec<&'static str> {
    SCHEMA_SQL
        .lines()
        .filter_map(|line| line.trim().strip_prefix("CREATE TABLE IF NOT EXISTS "))
        .filter_map(|rest| rest.split_whitespace().next())
        .collect()
}
