// API Gatewayリクエストの内部表現
//
// ハンドラーはlambda_httpの型に直接依存せず、メソッド・クエリ・ボディだけを持つ
// ApiRequestを受け取る。テストではビルダーで組み立てる。

use std::collections::HashMap;

use lambda_http::http::Method;
use lambda_http::{Request, RequestExt};
use serde_json::{Map, Value};

use crate::domain::ValidationError;

/// ハンドラーに渡すリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    query: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: HashMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into().into_bytes());
        self
    }

    /// lambda_httpのリクエストから変換
    ///
    /// 同じキーのクエリパラメータが複数ある場合は最後の値を使う。
    pub fn from_http(request: &Request) -> Self {
        let query = request
            .query_string_parameters_ref()
            .map(|params| {
                params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let body = request.body().to_vec();

        Self {
            method: request.method().clone(),
            query,
            body: (!body.is_empty()).then_some(body),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// 空でないクエリパラメータを取得
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// ボディをJSONとして解釈する
    ///
    /// ボディがない場合は空オブジェクトとして扱う。UTF-8でないボディはJSONエラー。
    pub fn json_body(&self) -> Result<Value, ValidationError> {
        let raw = match self.body.as_deref() {
            Some(bytes) => std::str::from_utf8(bytes)
                .map_err(|_| ValidationError::InvalidJson)?
                .trim(),
            None => "",
        };
        if raw.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(raw).map_err(|_| ValidationError::InvalidJson)
    }

    /// CORSプリフライトか
    pub fn is_preflight(&self) -> bool {
        self.method == Method::OPTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::Body;
    use serde_json::json;

    #[test]
    fn test_from_http_reads_method_query_and_body() {
        let query: HashMap<String, String> = [("resource", "objects"), ("city", "Moscow")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let request = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/marketplace")
            .body(Body::Text(r#"{"title":"Loft"}"#.to_string()))
            .unwrap()
            .with_query_string_parameters(query);

        let api = ApiRequest::from_http(&request);

        assert_eq!(api.method(), &Method::POST);
        assert_eq!(api.query_param("resource"), Some("objects"));
        assert_eq!(api.query_param("city"), Some("Moscow"));
        assert_eq!(api.json_body().unwrap(), json!({"title": "Loft"}));
    }

    #[test]
    fn test_from_http_without_query_or_body() {
        let request = lambda_http::http::Request::builder()
            .method("GET")
            .uri("/")
            .body(Body::Empty)
            .unwrap();

        let api = ApiRequest::from_http(&request);

        assert!(api.query().is_empty());
        assert_eq!(api.json_body().unwrap(), json!({}));
    }

    #[test]
    fn test_non_utf8_body_is_invalid_json() {
        let request = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/marketplace")
            .body(Body::Binary(vec![b'{', b'"', 0xff, b'"', b':', b'1', b'}']))
            .unwrap();

        let api = ApiRequest::from_http(&request);

        assert_eq!(api.json_body().unwrap_err(), ValidationError::InvalidJson);
    }

    #[test]
    fn test_whitespace_body_is_empty_object() {
        let api = ApiRequest::new(Method::PUT).with_body("  \n");
        assert_eq!(api.json_body().unwrap(), json!({}));
    }

    #[test]
    fn test_empty_query_value_is_absent() {
        let api = ApiRequest::new(Method::GET).with_query("id", "");
        assert_eq!(api.query_param("id"), None);
    }

    #[test]
    fn test_invalid_json_body() {
        let api = ApiRequest::new(Method::POST).with_body("{not json");
        assert_eq!(api.json_body().unwrap_err(), ValidationError::InvalidJson);
    }

    #[test]
    fn test_preflight() {
        assert!(ApiRequest::new(Method::OPTIONS).is_preflight());
        assert!(!ApiRequest::new(Method::GET).is_preflight());
    }
}
