// お気に入り
//
// ユーザーと投資対象物件の組。組の一意性はアプリケーション側の
// 事前チェックでのみ保たれるため、同時リクエストでは重複し得る。

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use super::validation::{has_truthy, parse_int_id, parse_int_param, ValidationError};

const PAIR_REQUIRED: &str = "user_id and object_id are required";

/// 永続化済みのお気に入り
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: i32,
    pub user_id: i32,
    pub object_id: i32,
    pub created_at: Option<NaiveDateTime>,
}

/// 一覧表示用の物件スナップショット
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSnapshot {
    pub title: String,
    pub city: String,
    pub price: f64,
    pub yield_percent: f64,
    pub images: Vec<String>,
}

/// 物件スナップショット付きのお気に入り
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteWithObject {
    pub id: i32,
    pub user_id: i32,
    pub object_id: i32,
    pub created_at: Option<NaiveDateTime>,
    pub object: ObjectSnapshot,
}

/// (user_id, object_id)の組
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FavoriteKey {
    pub user_id: i32,
    pub object_id: i32,
}

impl FavoriteKey {
    /// POSTボディから組を取り出す
    pub fn from_body(body: &Value) -> Result<Self, ValidationError> {
        if !has_truthy(body, "user_id") || !has_truthy(body, "object_id") {
            return Err(ValidationError::Required(PAIR_REQUIRED));
        }
        Ok(Self {
            user_id: parse_int_id("user_id", &body["user_id"])?,
            object_id: parse_int_id("object_id", &body["object_id"])?,
        })
    }

    /// DELETEのクエリパラメータから組を取り出す
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, ValidationError> {
        match (params.get("user_id"), params.get("object_id")) {
            (Some(user_id), Some(object_id)) if !user_id.is_empty() && !object_id.is_empty() => {
                Ok(Self {
                    user_id: parse_int_param("user_id", user_id)?,
                    object_id: parse_int_param("object_id", object_id)?,
                })
            }
            _ => Err(ValidationError::Required(PAIR_REQUIRED)),
        }
    }
}
