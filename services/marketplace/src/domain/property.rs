// ブローカーの掲載物件
//
// リクエストは入れ子のJSON（location, pricing, financing, investment,
// details, media）で受け取り、`<グループ>_<フィールド>`形式の平坦な列に保存する。

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use super::validation::{deserialize_body, present_or_null, required_string_id, ValidationError};

/// 通貨が指定されない場合の既定値
pub const DEFAULT_CURRENCY: &str = "RUB";

/// パラメータなしの一覧取得の上限件数
pub const ACTIVE_PROPERTY_LIST_LIMIT: i64 = 100;

/// 掲載ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Draft,
    Moderation,
    Active,
    Reserved,
    Sold,
    Archived,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 6] = [
        PropertyStatus::Draft,
        PropertyStatus::Moderation,
        PropertyStatus::Active,
        PropertyStatus::Reserved,
        PropertyStatus::Sold,
        PropertyStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Draft => "draft",
            PropertyStatus::Moderation => "moderation",
            PropertyStatus::Active => "active",
            PropertyStatus::Reserved => "reserved",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::invalid("status", s))
    }
}

/// 永続化済みの物件（平坦な列のまま返す）
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Property {
    pub id: String,
    pub broker_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub location_city: Option<String>,
    pub location_district: Option<String>,
    pub location_address: Option<String>,
    pub location_metro: Option<String>,
    pub location_metro_distance: f64,
    pub pricing_total_price: f64,
    pub pricing_price_per_meter: f64,
    pub pricing_min_investment: f64,
    pub pricing_currency: Option<String>,
    pub financing_method: Option<String>,
    pub financing_mortgage_rate: f64,
    pub financing_down_payment: f64,
    pub investment_strategies: Json<Vec<String>>,
    pub investment_expected_return: f64,
    pub investment_term: Option<i32>,
    pub investment_risk_level: Option<String>,
    pub investment_target_investment: f64,
    pub details_area: f64,
    pub details_rooms: Option<i32>,
    pub details_floor: Option<i32>,
    pub details_total_floors: Option<i32>,
    pub media_images: Json<Vec<String>>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(deserialize_with = "present_or_null")]
    pub city: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub address: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub metro: Option<String>,
    #[serde(default)]
    pub metro_distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub total_price: f64,
    pub min_investment: f64,
    #[serde(default)]
    pub price_per_meter: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financing {
    #[serde(deserialize_with = "present_or_null")]
    pub method: Option<String>,
    #[serde(default)]
    pub mortgage_rate: Option<f64>,
    #[serde(default)]
    pub down_payment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentTerms {
    pub strategy: Vec<String>,
    pub expected_return: f64,
    pub term: i32,
    #[serde(deserialize_with = "present_or_null")]
    pub risk_level: Option<String>,
    pub target_investment: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub rooms: Option<i32>,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub total_floors: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewPropertyBody {
    broker_id: String,
    title: String,
    #[serde(deserialize_with = "present_or_null")]
    description: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    property_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
    location: Location,
    pricing: Pricing,
    financing: Financing,
    investment: InvestmentTerms,
    details: Details,
    #[serde(default)]
    media: Option<Media>,
}

/// 物件作成リクエスト
///
/// NULL可能な列に対応する文字列キーは、存在すればnullを受け付けてNULLを保存する。
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub broker_id: String,
    pub title: String,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub status: PropertyStatus,
    pub location: Location,
    pub pricing: Pricing,
    pub financing: Financing,
    pub investment: InvestmentTerms,
    pub details: Details,
    pub media: Media,
}

impl NewProperty {
    pub fn from_body(body: Value) -> Result<Self, ValidationError> {
        let raw: NewPropertyBody = deserialize_body(body)?;

        let status = match raw.status.as_deref() {
            None | Some("") => PropertyStatus::default(),
            Some(status) => status.parse()?,
        };

        Ok(Self {
            broker_id: raw.broker_id,
            title: raw.title,
            description: raw.description,
            property_type: raw.property_type,
            status,
            location: raw.location,
            pricing: raw.pricing,
            financing: raw.financing,
            investment: raw.investment,
            details: raw.details,
            media: raw.media.unwrap_or_default(),
        })
    }

    /// 保存する通貨
    pub fn currency(&self) -> &str {
        self.pricing.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingUpdate {
    total_price: f64,
    min_investment: f64,
}

#[derive(Deserialize)]
struct PropertyUpdateBody {
    title: String,
    #[serde(deserialize_with = "present_or_null")]
    description: Option<String>,
    status: String,
    pricing: PricingUpdate,
}

/// 物件更新リクエスト
///
/// 5項目すべてを無条件に上書きする。
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyUpdate {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: PropertyStatus,
    pub total_price: f64,
    pub min_investment: f64,
}

impl PropertyUpdate {
    pub fn from_body(body: Value) -> Result<Self, ValidationError> {
        let id = required_string_id(&body, "Property ID required")?;
        let raw: PropertyUpdateBody = deserialize_body(body)?;

        Ok(Self {
            id,
            title: raw.title,
            description: raw.description,
            status: raw.status.parse()?,
            total_price: raw.pricing.total_price,
            min_investment: raw.pricing.min_investment,
        })
    }
}

/// 新しい物件IDを生成
pub fn generate_property_id() -> String {
    Uuid::new_v4().to_string()
}
