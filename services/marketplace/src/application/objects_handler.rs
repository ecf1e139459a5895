/// 投資対象物件ハンドラー（resource=objects）
use lambda_http::http::Method;
use tracing::{debug, info};

use super::error::HandlerError;
use super::request::ApiRequest;
use super::response::ApiResponse;
use crate::domain::investment_object::OBJECT_LIST_LIMIT;
use crate::domain::validation::parse_int_param;
use crate::domain::{NewInvestmentObject, ObjectFilter, ObjectPatch};
use crate::infrastructure::InvestmentObjectRepository;

pub struct ObjectsHandler<OR>
where
    OR: InvestmentObjectRepository,
{
    object_repo: OR,
}

impl<OR> ObjectsHandler<OR>
where
    OR: InvestmentObjectRepository,
{
    pub fn new(object_repo: OR) -> Self {
        Self { object_repo }
    }

    pub async fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        match *request.method() {
            Method::GET => self.get(request).await,
            Method::POST => self.create(request).await,
            Method::PUT => self.update(request).await,
            _ => Err(HandlerError::MethodNotAllowed),
        }
    }

    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        if let Some(id) = request.query_param("id") {
            let id = parse_int_param("id", id)?;
            let object = self
                .object_repo
                .find_by_id(id)
                .await?
                .ok_or(HandlerError::NotFound("Object"))?;
            return Ok(ApiResponse::ok(&object));
        }

        let filter = ObjectFilter::from_query(request.query())?;
        debug!(filtered = !filter.is_empty(), ?filter, "物件一覧を検索");
        let objects = self.object_repo.list(&filter, OBJECT_LIST_LIMIT).await?;
        Ok(ApiResponse::ok(&objects))
    }

    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let body = request.json_body()?;
        let new_object = NewInvestmentObject::from_body(&body)?;

        let object = self.object_repo.insert(&new_object).await?;
        info!(object_id = object.id, city = %object.city, "物件を作成");
        Ok(ApiResponse::created(&object))
    }

    /// 指定されたフィールドのみを更新する
    async fn update(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let body = request.json_body()?;
        let patch = ObjectPatch::from_body(&body)?;

        let object = self
            .object_repo
            .update(&patch)
            .await?
            .ok_or(HandlerError::NotFound("Object"))?;
        info!(object_id = object.id, "物件を更新");
        Ok(ApiResponse::ok(&object))
    }
}
