// ユーザー
//
// メールアドレスを自然キーとするマーケットプレイス利用者。

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use super::validation::{has_truthy, optional_string_field, string_field, ValidationError};

/// roleが指定されない場合の既定値
pub const DEFAULT_USER_ROLE: &str = "investor";

/// 一覧取得の上限件数
pub const USER_LIST_LIMIT: i64 = 100;

/// 永続化済みのユーザー
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: Option<NaiveDateTime>,
}

/// ユーザー作成リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: String,
}

impl NewUser {
    /// POSTボディからリクエストを組み立てる
    ///
    /// emailとnameはどちらも空でない値が必要。
    pub fn from_body(body: &Value) -> Result<Self, ValidationError> {
        if !has_truthy(body, "email") || !has_truthy(body, "name") {
            return Err(ValidationError::Required("Email and name are required"));
        }

        // 既定値はキーがないかnullのときだけ。空文字列はそのまま保存する
        let role = optional_string_field(body, "role")?
            .unwrap_or_else(|| DEFAULT_USER_ROLE.to_string());

        Ok(Self {
            email: string_field(body, "email")?,
            name: string_field(body, "name")?,
            role,
        })
    }
}
