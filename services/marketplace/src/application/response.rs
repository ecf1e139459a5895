// API Gatewayプロキシ形式のレスポンス
//
// すべてのレスポンスはJSONで、Content-TypeとAccess-Control-Allow-Originを持つ。
// プリフライトにはハンドラーごとのCORSポリシーを付与する。

use std::collections::BTreeMap;

use lambda_http::http::{self, StatusCode};
use lambda_http::{Body, Response};
use serde::Serialize;
use serde_json::json;
use tracing::error;

const CONTENT_TYPE: &str = "Content-Type";
const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
const MAX_AGE: &str = "Access-Control-Max-Age";

/// プリフライト結果のキャッシュ秒数
pub const CORS_MAX_AGE_SECS: u32 = 86400;

/// ハンドラーごとのCORSポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsPolicy {
    pub allow_methods: &'static str,
    pub allow_headers: &'static str,
}

/// マーケットプレイス（users / objects / favorites）
pub const MARKETPLACE_CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, POST, PUT, DELETE, OPTIONS",
    allow_headers: "Content-Type, X-User-Id, X-Auth-Token",
};

/// ブローカー・投資家
pub const BROKER_CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, POST, PUT, OPTIONS",
    allow_headers: "Content-Type, X-Broker-Id",
};

/// 掲載物件
pub const PROPERTIES_CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, POST, PUT, DELETE, OPTIONS",
    allow_headers: "Content-Type, X-Broker-Id",
};

/// レスポンスエンベロープ
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ApiResponse {
    fn with_body(status: StatusCode, body: String) -> Self {
        let headers = BTreeMap::from([
            (CONTENT_TYPE.to_string(), "application/json".to_string()),
            (ALLOW_ORIGIN.to_string(), "*".to_string()),
        ]);
        Self {
            status_code: status.as_u16(),
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    /// 値をJSONボディとして持つレスポンス
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::with_body(status, body),
            Err(e) => {
                error!(error = %e, "レスポンスのシリアライズに失敗");
                Self::internal_error()
            }
        }
    }

    pub fn ok<T: Serialize>(value: &T) -> Self {
        Self::json(StatusCode::OK, value)
    }

    pub fn created<T: Serialize>(value: &T) -> Self {
        Self::json(StatusCode::CREATED, value)
    }

    /// `{"error": message}`形式の失敗レスポンス
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::with_body(status, json!({ "error": message }).to_string())
    }

    pub fn internal_error() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    /// CORSプリフライトへの応答（ボディなし）
    pub fn preflight(cors: &CorsPolicy) -> Self {
        let mut response = Self::with_body(StatusCode::OK, String::new());
        response
            .headers
            .insert(ALLOW_METHODS.to_string(), cors.allow_methods.to_string());
        response
            .headers
            .insert(ALLOW_HEADERS.to_string(), cors.allow_headers.to_string());
        response
            .headers
            .insert(MAX_AGE.to_string(), CORS_MAX_AGE_SECS.to_string());
        response
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// ボディをJSONとして解釈する
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// lambda_httpのレスポンスに変換
    pub fn into_http(self) -> Result<Response<Body>, http::Error> {
        let mut builder = Response::builder().status(self.status_code);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = if self.body.is_empty() {
            Body::Empty
        } else {
            Body::Text(self.body)
        };
        builder.body(body)
    }
}
