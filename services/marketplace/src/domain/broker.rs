// ブローカー
//
// 投資家リードと物件を管理する仲介者のプロフィール。
// IDと紹介コードはサーバー側で生成する。

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::validation::{deserialize_body, required_string_id, ValidationError};

/// 紹介コードの接頭辞
pub const REFERRAL_CODE_PREFIX: &str = "REF-";

/// 紹介コードの接頭辞に続く16進数の桁数
pub const REFERRAL_CODE_HEX_LEN: usize = 8;

/// 永続化済みのブローカー
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Broker {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub company: Option<String>,
    pub referral_code: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// ブローカー作成リクエスト
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBroker {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl NewBroker {
    pub fn from_body(body: Value) -> Result<Self, ValidationError> {
        deserialize_body(body)
    }
}

/// ブローカー更新リクエスト
///
/// 部分更新ではない。指定されなかったプロフィール項目はNULLで上書きされる。
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerUpdate {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub company: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrokerProfileFields {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    company: Option<String>,
}

impl BrokerUpdate {
    pub fn from_body(body: Value) -> Result<Self, ValidationError> {
        let id = required_string_id(&body, "Broker ID required")?;
        let fields: BrokerProfileFields = deserialize_body(body)?;

        Ok(Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            phone: fields.phone,
            avatar: fields.avatar,
            company: fields.company,
        })
    }
}

/// 新しいブローカーIDを生成
pub fn generate_broker_id() -> String {
    Uuid::new_v4().to_string()
}

/// 紹介コードを生成
///
/// 形式は`REF-`に続く大文字16進数8桁。
pub fn generate_referral_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}",
        REFERRAL_CODE_PREFIX,
        hex[..REFERRAL_CODE_HEX_LEN].to_uppercase()
    )
}

/// 紹介コードの形式を検証
#[cfg(test)]
pub(crate) fn is_valid_referral_code(code: &str) -> bool {
    code.strip_prefix(REFERRAL_CODE_PREFIX).is_some_and(|hex| {
        hex.len() == REFERRAL_CODE_HEX_LEN
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_referral_code_format() {
        for _ in 0..100 {
            let code = generate_referral_code();
            assert!(is_valid_referral_code(&code), "invalid code: {}", code);
        }
    }

    #[test]
    fn test_referral_codes_are_distinct() {
        let codes: HashSet<String> = (0..500).map(|_| generate_referral_code()).collect();
        assert_eq!(codes.len(), 500);
    }

    #[test]
    fn test_referral_code_validation() {
        assert!(is_valid_referral_code("REF-0A1B2C3D"));
        assert!(!is_valid_referral_code("REF-0a1b2c3d"));
        assert!(!is_valid_referral_code("REF-0A1B2C3"));
        assert!(!is_valid_referral_code("REF-0A1B2C3DE"));
        assert!(!is_valid_referral_code("ABC-0A1B2C3D"));
        assert!(!is_valid_referral_code("REF-0A1B2C3G"));
    }

    #[test]
    fn test_broker_id_is_uuid() {
        let id = generate_broker_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, generate_broker_id());
    }

    #[test]
    fn test_new_broker_from_camel_case_body() {
        let broker = NewBroker::from_body(json!({
            "email": "anna@agency.ru",
            "firstName": "Anna",
            "lastName": "Petrova",
            "company": "Agency"
        }))
        .unwrap();

        assert_eq!(broker.first_name, "Anna");
        assert_eq!(broker.last_name, "Petrova");
        assert_eq!(broker.company.as_deref(), Some("Agency"));
        assert_eq!(broker.phone, None);
        assert_eq!(broker.avatar, None);
    }

    #[test]
    fn test_new_broker_missing_required_field() {
        let err = NewBroker::from_body(json!({"email": "a@x.com", "firstName": "A"}))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid request body: missing field `lastName`"
        );
    }

    #[test]
    fn test_broker_update_absent_fields_become_none() {
        let update = BrokerUpdate::from_body(json!({"id": "b-1", "firstName": "Ivan"})).unwrap();

        assert_eq!(update.id, "b-1");
        assert_eq!(update.first_name.as_deref(), Some("Ivan"));
        assert_eq!(update.last_name, None);
        assert_eq!(update.phone, None);
        assert_eq!(update.avatar, None);
        assert_eq!(update.company, None);
    }

    #[test]
    fn test_broker_update_requires_id() {
        assert_eq!(
            BrokerUpdate::from_body(json!({"firstName": "Ivan"})).unwrap_err(),
            ValidationError::Required("Broker ID required")
        );
    }
}
