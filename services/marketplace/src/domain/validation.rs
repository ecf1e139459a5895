// リクエストボディ検証の共通部品
//
// JSONボディから型付きリクエストを組み立てる際のエラー型と、
// フィールド取り出しのヘルパーを提供する。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// リクエスト検証エラー
///
/// どのバリアントもHTTP 400としてクライアントに返される。
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// 必須フィールドが欠落、または偽値
    #[error("{0}")]
    Required(&'static str),

    /// ボディがJSONとして解釈できない
    #[error("Invalid JSON body")]
    InvalidJson,

    /// フィールドの値が期待する型・語彙でない
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// ボディの構造がエンドポイントのスキーマに合わない
    #[error("Invalid request body: {0}")]
    Schema(String),
}

impl ValidationError {
    pub fn invalid(field: &'static str, value: impl ToString) -> Self {
        ValidationError::InvalidValue {
            field,
            value: value.to_string(),
        }
    }
}

/// 値の真偽判定
///
/// null、false、0、空文字列、空配列、空オブジェクトを偽として扱う。
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// キーの値が真であるか
pub fn has_truthy(body: &Value, key: &str) -> bool {
    body.get(key).is_some_and(is_truthy)
}

/// ボディを型付きリクエストに変換する
pub fn deserialize_body<T: DeserializeOwned>(body: Value) -> Result<T, ValidationError> {
    serde_json::from_value(body).map_err(|e| ValidationError::Schema(e.to_string()))
}

/// キーは必須だがnullを許すフィールド（`#[serde(deserialize_with)]`用）
///
/// `deserialize_with`を付けた`Option`はキーの欠落を`None`にせずエラーにする。
pub fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// 文字列フィールドを取り出す
pub fn string_field(body: &Value, field: &'static str) -> Result<String, ValidationError> {
    match body.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(ValidationError::invalid(field, other)),
        None => Err(ValidationError::Schema(format!("missing field `{}`", field))),
    }
}

/// 任意の文字列フィールドを取り出す（nullと欠落はNone）
pub fn optional_string_field(
    body: &Value,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => string_field(body, field).map(Some),
    }
}

/// 数値フィールドを取り出す（数値文字列も受け付ける）
pub fn number_field(body: &Value, field: &'static str) -> Result<f64, ValidationError> {
    let value = body
        .get(field)
        .ok_or_else(|| ValidationError::Schema(format!("missing field `{}`", field)))?;
    number_value(value).ok_or_else(|| ValidationError::invalid(field, value))
}

/// 部分更新用の文字列フィールド
///
/// キーがなければ`None`、値がnullなら`Some(None)`（NULLを書き込む）。
pub fn nullable_string_field(
    body: &Value,
    field: &'static str,
) -> Result<Option<Option<String>>, ValidationError> {
    match body.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(_) => string_field(body, field).map(|value| Some(Some(value))),
    }
}

/// 部分更新用の数値フィールド（`nullable_string_field`と同じ規則）
pub fn nullable_number_field(
    body: &Value,
    field: &'static str,
) -> Result<Option<Option<f64>>, ValidationError> {
    match body.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(_) => number_field(body, field).map(|value| Some(Some(value))),
    }
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// 整数IDを解釈する（数値または数値文字列）
pub fn parse_int_id(field: &'static str, value: &Value) -> Result<i32, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ValidationError::invalid(field, value))
}

/// クエリ文字列の整数IDを解釈する
pub fn parse_int_param(field: &'static str, raw: &str) -> Result<i32, ValidationError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ValidationError::invalid(field, raw))
}

/// 文字列IDを取り出す（真であることを要求）
///
/// UUID形式の生成IDを持つブローカー・投資家・物件のPUTで使う。
pub fn required_string_id(body: &Value, missing: &'static str) -> Result<String, ValidationError> {
    match body.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(value @ Value::Number(n)) if is_truthy(value) => Ok(n.to_string()),
        Some(value) if is_truthy(value) => Err(ValidationError::invalid("id", value)),
        _ => Err(ValidationError::Required(missing)),
    }
}
