/// 投資家ハンドラー
use chrono::Utc;
use lambda_http::http::Method;
use tracing::info;

use super::error::{into_api_response, HandlerError};
use super::request::ApiRequest;
use super::response::{ApiResponse, BROKER_CORS};
use crate::domain::investor::generate_investor_id;
use crate::domain::{InvestorUpdate, NewInvestor, ValidationError};
use crate::infrastructure::InvestorRepository;

/// ブローカーIDのクエリパラメータ（後者は別名）
const BROKER_ID_PARAMS: [&str; 2] = ["brokerId", "broker_id"];

pub struct InvestorsHandler<IR>
where
    IR: InvestorRepository,
{
    investor_repo: IR,
}

impl<IR> InvestorsHandler<IR>
where
    IR: InvestorRepository,
{
    pub fn new(investor_repo: IR) -> Self {
        Self { investor_repo }
    }

    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        if request.is_preflight() {
            return ApiResponse::preflight(&BROKER_CORS);
        }
        info!(method = %request.method(), "投資家リクエスト受信");
        into_api_response(self.dispatch(request).await)
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        match *request.method() {
            Method::GET => self.get(request).await,
            Method::POST => self.create(request).await,
            Method::PUT => self.update(request).await,
            _ => Err(HandlerError::MethodNotAllowed),
        }
    }

    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        if let Some(id) = request.query_param("id") {
            let investor = self
                .investor_repo
                .find_by_id(id)
                .await?
                .ok_or(HandlerError::NotFound("Investor"))?;
            return Ok(ApiResponse::ok(&investor));
        }

        let broker_id = BROKER_ID_PARAMS
            .iter()
            .find_map(|key| request.query_param(key))
            .ok_or(ValidationError::Required("Broker ID required"))?;
        let investors = self.investor_repo.list_by_broker(broker_id).await?;
        Ok(ApiResponse::ok(&investors))
    }

    /// タイムラインを「リード作成」エントリで初期化して保存する
    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let new_investor = NewInvestor::from_body(request.json_body()?)?;
        let id = generate_investor_id();
        let timeline = new_investor.initial_timeline(Utc::now());

        let investor = self
            .investor_repo
            .insert(&id, &new_investor, timeline)
            .await?;
        info!(
            investor_id = %investor.id,
            broker_id = %new_investor.broker_id,
            stage = %new_investor.stage,
            "投資家を作成"
        );
        Ok(ApiResponse::created(&investor))
    }

    /// stage・メモを更新する（存在確認は行わない）
    async fn update(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let update = InvestorUpdate::from_body(request.json_body()?)?;
        let appended = update.timeline_entries(Utc::now());

        let investor = self.investor_repo.update(&update, appended).await?;
        info!(investor_id = %update.id, matched = investor.is_some(), "投資家を更新");
        Ok(ApiResponse::ok(&investor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::investor_repository::tests::MockInvestorRepository;
    use serde_json::{json, Value};

    fn handler() -> (InvestorsHandler<MockInvestorRepository>, MockInvestorRepository) {
        let repo = MockInvestorRepository::new();
        (InvestorsHandler::new(repo.clone()), repo)
    }

    fn investor_body(broker_id: &str) -> Value {
        json!({
            "brokerId": broker_id,
            "personalInfo": {
                "firstName": "Elena",
                "lastName": "Smirnova",
                "email": "elena@mail.ru",
                "phone": "+79991112233"
            },
            "investmentProfile": {
                "budget": 8000000,
                "strategies": ["resale", "rental"],
                "riskTolerance": "high",
                "preferredPropertyTypes": ["apartments"],
                "preferredLocations": ["Sochi"]
            },
            "interaction": {"source": "telegram", "notes": "prefers sea view"}
        })
    }

    async fn create(handler: &InvestorsHandler<MockInvestorRepository>, broker_id: &str) -> Value {
        let response = handler
            .handle(&ApiRequest::new(Method::POST).with_body(investor_body(broker_id).to_string()))
            .await;
        assert_eq!(response.status_code, 201, "{}", response.body);
        response.json_body().unwrap()
    }

    #[tokio::test]
    async fn test_create_investor() {
        let (handler, _) = handler();

        let body = create(&handler, "broker-1").await;

        assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
        assert_eq!(body["broker_id"], "broker-1");
        assert_eq!(body["stage"], "lead");
        assert_eq!(body["profile_budget"], json!(8000000.0));
        assert_eq!(body["profile_strategies"], json!(["resale", "rental"]));
        assert_eq!(body["interaction_notes"], "prefers sea view");

        let timeline = body["timeline"].as_array().unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0]["action"], "Создан лид");
        assert_eq!(timeline[0]["details"], "Источник: telegram");
    }

    #[tokio::test]
    async fn test_create_missing_nested_key() {
        let (handler, _) = handler();
        let mut body = investor_body("broker-1");
        body["investmentProfile"]
            .as_object_mut()
            .unwrap()
            .remove("riskTolerance");

        let response = handler
            .handle(&ApiRequest::new(Method::POST).with_body(body.to_string()))
            .await;

        assert_eq!(response.status_code, 400);
        assert!(response.body.contains("riskTolerance"), "{}", response.body);
    }

    #[tokio::test]
    async fn test_list_by_broker_accepts_both_param_names() {
        let (handler, _) = handler();
        create(&handler, "broker-1").await;
        create(&handler, "broker-1").await;
        create(&handler, "broker-2").await;

        for key in ["brokerId", "broker_id"] {
            let response = handler
                .handle(&ApiRequest::new(Method::GET).with_query(key, "broker-1"))
                .await;
            assert_eq!(response.json_body().unwrap().as_array().unwrap().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_get_without_id_or_broker() {
        let (handler, _) = handler();

        let response = handler.handle(&ApiRequest::new(Method::GET)).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, r#"{"error":"Broker ID required"}"#);
    }

    #[tokio::test]
    async fn test_get_unknown_investor() {
        let (handler, _) = handler();

        let response = handler
            .handle(&ApiRequest::new(Method::GET).with_query("id", "missing"))
            .await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, r#"{"error":"Investor not found"}"#);
    }

    #[tokio::test]
    async fn test_update_stage_appends_timeline_and_keeps_notes() {
        let (handler, repo) = handler();
        let created = create(&handler, "broker-1").await;
        let id = created["id"].as_str().unwrap();

        let response = handler
            .handle(
                &ApiRequest::new(Method::PUT)
                    .with_body(json!({"id": id, "stage": "negotiation"}).to_string()),
            )
            .await;

        assert_eq!(response.status_code, 200);
        let investor = repo.get_investor(id).unwrap();
        assert_eq!(investor.stage.as_deref(), Some("negotiation"));
        assert_eq!(investor.interaction_notes.as_deref(), Some("prefers sea view"));
        assert!(investor.interaction_last_contact.is_some());
        assert_eq!(investor.timeline.0.len(), 2);
        assert_eq!(investor.timeline.0[1].details, "Новый этап: negotiation");
    }

    #[tokio::test]
    async fn test_update_notes_only() {
        let (handler, repo) = handler();
        let created = create(&handler, "broker-1").await;
        let id = created["id"].as_str().unwrap();

        handler
            .handle(
                &ApiRequest::new(Method::PUT)
                    .with_body(json!({"id": id, "interaction": {"notes": "call later"}}).to_string()),
            )
            .await;

        let investor = repo.get_investor(id).unwrap();
        assert_eq!(investor.stage.as_deref(), Some("lead"));
        assert_eq!(investor.interaction_notes.as_deref(), Some("call later"));
        assert_eq!(investor.timeline.0.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_stage() {
        let (handler, _) = handler();

        let response = handler
            .handle(&ApiRequest::new(Method::PUT).with_body(r#"{"id": "x", "stage": "won"}"#))
            .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, r#"{"error":"Invalid stage: won"}"#);
    }

    #[tokio::test]
    async fn test_update_unknown_investor_returns_null() {
        let (handler, _) = handler();

        let response = handler
            .handle(&ApiRequest::new(Method::PUT).with_body(r#"{"id": "ghost"}"#))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "null");
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let (handler, _) = handler();

        let response = handler
            .handle(&ApiRequest::new(Method::PUT).with_body(r#"{"stage": "lead"}"#))
            .await;

        assert_eq!(response.body, r#"{"error":"Investor ID required"}"#);
    }
}
