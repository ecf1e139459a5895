// 投資対象物件（investment_objects）
//
// 整数IDを持つ、マーケットプレイスに掲載される物件。

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use super::validation::{
    has_truthy, nullable_number_field, nullable_string_field, number_field,
    optional_string_field, parse_int_id, string_field, ValidationError,
};

/// statusが指定されない場合の既定値
pub const DEFAULT_OBJECT_STATUS: &str = "available";

/// 一覧取得の上限件数
pub const OBJECT_LIST_LIMIT: i64 = 100;

/// POSTで必須のフィールド
///
/// 値の真偽で判定するため、数値の0は欠落と同じ扱いになる。
pub const REQUIRED_OBJECT_FIELDS: [&str; 8] = [
    "title",
    "city",
    "address",
    "property_type",
    "area",
    "price",
    "yield_percent",
    "payback_years",
];

/// 永続化済みの投資対象物件
///
/// 数値列はNULLのとき0、画像リストはNULLのとき空配列として読み出す。
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct InvestmentObject {
    pub id: i32,
    pub broker_id: Option<i32>,
    pub title: String,
    pub city: String,
    pub address: String,
    pub property_type: String,
    pub area: f64,
    pub price: f64,
    pub yield_percent: f64,
    pub payback_years: f64,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// 物件作成リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvestmentObject {
    pub broker_id: Option<i32>,
    pub title: String,
    pub city: String,
    pub address: String,
    pub property_type: String,
    pub area: f64,
    pub price: f64,
    pub yield_percent: f64,
    pub payback_years: f64,
    pub description: String,
    pub images: Vec<String>,
    pub status: String,
}

impl NewInvestmentObject {
    pub fn from_body(body: &Value) -> Result<Self, ValidationError> {
        if !REQUIRED_OBJECT_FIELDS
            .iter()
            .all(|field| has_truthy(body, field))
        {
            return Err(ValidationError::Required("Missing required fields"));
        }

        let broker_id = match body.get("broker_id") {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_int_id("broker_id", value)?),
        };

        Ok(Self {
            broker_id,
            title: string_field(body, "title")?,
            city: string_field(body, "city")?,
            address: string_field(body, "address")?,
            property_type: string_field(body, "property_type")?,
            area: number_field(body, "area")?,
            price: number_field(body, "price")?,
            yield_percent: number_field(body, "yield_percent")?,
            payback_years: number_field(body, "payback_years")?,
            description: optional_string_field(body, "description")?.unwrap_or_default(),
            images: string_list(body, "images")?,
            status: optional_string_field(body, "status")?
                .unwrap_or_else(|| DEFAULT_OBJECT_STATUS.to_string()),
        })
    }
}

/// 物件の部分更新リクエスト
///
/// 外側の`None`はキーなし（更新しない）、`Some(None)`は値がnull（NULLを書き込む）。
/// statusはNOT NULL列のため、nullは受け付けない。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectPatch {
    pub id: i32,
    pub status: Option<String>,
    pub price: Option<Option<f64>>,
    pub yield_percent: Option<Option<f64>>,
    pub description: Option<Option<String>>,
}

impl ObjectPatch {
    pub fn from_body(body: &Value) -> Result<Self, ValidationError> {
        let id = match body.get("id") {
            Some(value) if has_truthy(body, "id") => parse_int_id("id", value)?,
            _ => return Err(ValidationError::Required("Object ID is required")),
        };

        let patch = Self {
            id,
            status: match nullable_string_field(body, "status")? {
                Some(None) => return Err(ValidationError::invalid("status", Value::Null)),
                status => status.flatten(),
            },
            price: nullable_number_field(body, "price")?,
            yield_percent: nullable_number_field(body, "yield_percent")?,
            description: nullable_string_field(body, "description")?,
        };

        if patch.is_empty() {
            return Err(ValidationError::Required("No fields to update"));
        }
        Ok(patch)
    }

    /// 更新対象のフィールドが1つもないか
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.price.is_none()
            && self.yield_percent.is_none()
            && self.description.is_none()
    }
}

/// 文字列配列フィールド（欠落・nullは空配列）
fn string_list(body: &Value, field: &'static str) -> Result<Vec<String>, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ValidationError::invalid(field, item))
            })
            .collect(),
        Some(other) => Err(ValidationError::invalid(field, other)),
    }
}
