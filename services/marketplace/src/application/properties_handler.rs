/// 掲載物件ハンドラー
///
/// パラメータなしのGETは公開中（active）の物件のみを返す。
use lambda_http::http::Method;
use tracing::info;

use super::error::{into_api_response, HandlerError};
use super::request::ApiRequest;
use super::response::{ApiResponse, PROPERTIES_CORS};
use crate::domain::property::{generate_property_id, ACTIVE_PROPERTY_LIST_LIMIT};
use crate::domain::{NewProperty, PropertyUpdate};
use crate::infrastructure::PropertyRepository;

const BROKER_ID_PARAMS: [&str; 2] = ["brokerId", "broker_id"];

pub struct PropertiesHandler<PR>
where
    PR: PropertyRepository,
{
    property_repo: PR,
}

impl<PR> PropertiesHandler<PR>
where
    PR: PropertyRepository,
{
    pub fn new(property_repo: PR) -> Self {
        Self { property_repo }
    }

    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        if request.is_preflight() {
            return ApiResponse::preflight(&PROPERTIES_CORS);
        }
        info!(method = %request.method(), "物件リクエスト受信");
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
            let property = self
                .property_repo
                .find_by_id(id)
                .await?
                .ok_or(HandlerError::NotFound("Property"))?;
            return Ok(ApiResponse::ok(&property));
        }

        let properties = match BROKER_ID_PARAMS
            .iter()
            .find_map(|key| request.query_param(key))
        {
            Some(broker_id) => self.property_repo.list_by_broker(broker_id).await?,
            None => {
                self.property_repo
                    .list_active(ACTIVE_PROPERTY_LIST_LIMIT)
                    .await?
            }
        };
        Ok(ApiResponse::ok(&properties))
    }

    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let new_property = NewProperty::from_body(request.json_body()?)?;
        let id = generate_property_id();

        let property = self.property_repo.insert(&id, &new_property).await?;
        info!(
            property_id = %property.id,
            broker_id = %new_property.broker_id,
            status = %new_property.status,
            "物件を作成"
        );
        Ok(ApiResponse::created(&property))
    }

    /// 5項目を上書きする（存在確認は行わない）
    async fn update(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let update = PropertyUpdate::from_body(request.json_body()?)?;

        let property = self.property_repo.update(&update).await?;
        info!(property_id = %update.id, matched = property.is_some(), "物件を更新");
        Ok(ApiResponse::ok(&property))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::property_repository::tests::MockPropertyRepository;
    use crate::infrastructure::RepositoryError;
    use serde_json::{json, Value};

    fn handler() -> (PropertiesHandler<MockPropertyRepository>, MockPropertyRepository) {
        let repo = MockPropertyRepository::new();
        (PropertiesHandler::new(repo.clone()), repo)
    }

    fn property_body(broker_id: &str, status: &str) -> Value {
        json!({
            "brokerId": broker_id,
            "title": "Studio in Kazan",
            "description": "New building",
            "propertyType": "flats",
            "status": status,
            "location": {"city": "Kazan", "address": "Baumana 5", "metro": "Kremlyovskaya"},
            "pricing": {"totalPrice": 6000000, "minInvestment": 100000, "pricePerMeter": 200000},
            "financing": {"method": "mortgage", "mortgageRate": 6.5},
            "investment": {
                "strategy": ["rental"],
                "expectedReturn": 8,
                "term": 24,
                "riskLevel": "medium",
                "targetInvestment": 6000000
            },
            "details": {"area": 30, "rooms": 1, "floor": 7, "totalFloors": 20},
            "media": {"images": ["a.jpg", "b.jpg"]}
        })
    }

    async fn create(
        handler: &PropertiesHandler<MockPropertyRepository>,
        broker_id: &str,
        status: &str,
    ) -> Value {
        let response = handler
            .handle(
                &ApiRequest::new(Method::POST)
                    .with_body(property_body(broker_id, status).to_string()),
            )
            .await;
        assert_eq!(response.status_code, 201, "{}", response.body);
        response.json_body().unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_flat_row() {
        let (handler, _) = handler();

        let body = create(&handler, "broker-1", "moderation").await;

        assert_eq!(body["status"], "moderation");
        assert_eq!(body["location_city"], "Kazan");
        assert_eq!(body["location_metro"], "Kremlyovskaya");
        assert_eq!(body["location_metro_distance"], json!(0.0));
        assert_eq!(body["pricing_total_price"], json!(6000000.0));
        assert_eq!(body["pricing_currency"], "RUB");
        assert_eq!(body["financing_down_payment"], json!(0.0));
        assert_eq!(body["investment_strategies"], json!(["rental"]));
        assert_eq!(body["investment_term"], 24);
        assert_eq!(body["details_total_floors"], 20);
        assert_eq!(body["media_images"], json!(["a.jpg", "b.jpg"]));
    }

    #[tokio::test]
    async fn test_create_defaults_to_draft() {
        let (handler, _) = handler();
        let mut body = property_body("broker-1", "draft");
        body.as_object_mut().unwrap().remove("status");
        body.as_object_mut().unwrap().remove("media");

        let response = handler
            .handle(&ApiRequest::new(Method::POST).with_body(body.to_string()))
            .await;
        let created = response.json_body().unwrap();

        assert_eq!(created["status"], "draft");
        assert_eq!(created["media_images"], json!([]));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_status() {
        let (handler, _) = handler();

        let response = handler
            .handle(
                &ApiRequest::new(Method::POST)
                    .with_body(property_body("broker-1", "hidden").to_string()),
            )
            .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, r#"{"error":"Invalid status: hidden"}"#);
    }

    #[tokio::test]
    async fn test_list_without_params_returns_active_only() {
        let (handler, _) = handler();
        create(&handler, "broker-1", "draft").await;
        create(&handler, "broker-1", "active").await;
        create(&handler, "broker-2", "active").await;

        let response = handler.handle(&ApiRequest::new(Method::GET)).await;
        let body = response.json_body().unwrap();

        let statuses: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, vec!["active", "active"]);
        assert_eq!(body[0]["broker_id"], "broker-2");
    }

    #[tokio::test]
    async fn test_list_by_broker_includes_all_statuses() {
        let (handler, _) = handler();
        create(&handler, "broker-1", "draft").await;
        create(&handler, "broker-1", "sold").await;
        create(&handler, "broker-2", "active").await;

        let response = handler
            .handle(&ApiRequest::new(Method::GET).with_query("broker_id", "broker-1"))
            .await;

        assert_eq!(response.json_body().unwrap().as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_overwrites_five_fields() {
        let (handler, repo) = handler();
        let created = create(&handler, "broker-1", "draft").await;
        let id = created["id"].as_str().unwrap();

        let response = handler
            .handle(
                &ApiRequest::new(Method::PUT).with_body(
                    json!({
                        "id": id,
                        "title": "Studio (reduced)",
                        "description": "Price reduced",
                        "status": "active",
                        "pricing": {"totalPrice": 5500000, "minInvestment": 50000}
                    })
                    .to_string(),
                ),
            )
            .await;

        assert_eq!(response.status_code, 200);
        let property = repo.get_property(id).unwrap();
        assert_eq!(property.title, "Studio (reduced)");
        assert_eq!(property.status.as_deref(), Some("active"));
        assert_eq!(property.pricing_total_price, 5_500_000.0);
        assert_eq!(property.pricing_min_investment, 50_000.0);
        assert_eq!(property.pricing_price_per_meter, 200_000.0);
    }

    #[tokio::test]
    async fn test_update_null_description_is_stored_as_null() {
        let (handler, repo) = handler();
        let created = create(&handler, "broker-1", "active").await;
        let id = created["id"].as_str().unwrap();

        let response = handler
            .handle(
                &ApiRequest::new(Method::PUT).with_body(
                    json!({
                        "id": id,
                        "title": "Studio",
                        "description": null,
                        "status": "active",
                        "pricing": {"totalPrice": 6000000, "minInvestment": 100000}
                    })
                    .to_string(),
                ),
            )
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.json_body().unwrap()["description"], Value::Null);
        assert_eq!(repo.get_property(id).unwrap().description, None);
    }

    #[tokio::test]
    async fn test_update_missing_pricing_is_bad_request() {
        let (handler, _) = handler();

        let response = handler
            .handle(&ApiRequest::new(Method::PUT).with_body(
                json!({"id": "p", "title": "T", "description": "D", "status": "active"})
                    .to_string(),
            ))
            .await;

        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let (handler, _) = handler();

        let response = handler
            .handle(&ApiRequest::new(Method::PUT).with_body("{}"))
            .await;

        assert_eq!(response.body, r#"{"error":"Property ID required"}"#);
    }

    #[tokio::test]
    async fn test_get_unknown_property() {
        let (handler, _) = handler();

        let response = handler
            .handle(&ApiRequest::new(Method::GET).with_query("id", "missing"))
            .await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, r#"{"error":"Property not found"}"#);
    }

    #[tokio::test]
    async fn test_preflight_allows_delete_but_delete_is_rejected() {
        let (handler, repo) = handler();
        repo.set_next_error(RepositoryError::ConnectionFailed("down".to_string()));

        let preflight = handler.handle(&ApiRequest::new(Method::OPTIONS)).await;
        assert_eq!(preflight.status_code, 200);
        assert_eq!(
            preflight.header("Access-Control-Allow-Methods"),
            Some("GET, POST, PUT, DELETE, OPTIONS")
        );

        let delete = handler.handle(&ApiRequest::new(Method::DELETE)).await;
        assert_eq!(delete.status_code, 405);
    }
}
