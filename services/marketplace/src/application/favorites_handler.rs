/// お気に入りハンドラー（resource=favorites）
use lambda_http::http::Method;
use serde_json::json;
use tracing::info;

use super::error::HandlerError;
use super::request::ApiRequest;
use super::response::ApiResponse;
use crate::domain::validation::parse_int_param;
use crate::domain::{FavoriteKey, ValidationError};
use crate::infrastructure::FavoriteRepository;

pub struct FavoritesHandler<FR>
where
    FR: FavoriteRepository,
{
    favorite_repo: FR,
}

impl<FR> FavoritesHandler<FR>
where
    FR: FavoriteRepository,
{
    pub fn new(favorite_repo: FR) -> Self {
        Self { favorite_repo }
    }

    pub async fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        match *request.method() {
            Method::GET => self.list(request).await,
            Method::POST => self.add(request).await,
            Method::DELETE => self.remove(request).await,
            _ => Err(HandlerError::MethodNotAllowed),
        }
    }

    async fn list(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let user_id = request
            .query_param("user_id")
            .ok_or(ValidationError::Required("user_id is required"))?;
        let user_id = parse_int_param("user_id", user_id)?;

        let favorites = self.favorite_repo.list_for_user(user_id).await?;
        Ok(ApiResponse::ok(&favorites))
    }

    /// 既に登録済みの組は作成せずにそのIDを返す
    async fn add(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let body = request.json_body()?;
        let key = FavoriteKey::from_body(&body)?;

        if let Some(id) = self.favorite_repo.find_id(key).await? {
            return Ok(ApiResponse::ok(
                &json!({ "message": "Already in favorites", "id": id }),
            ));
        }

        let favorite = self.favorite_repo.insert(key).await?;
        info!(
            favorite_id = favorite.id,
            user_id = key.user_id,
            object_id = key.object_id,
            "お気に入りを追加"
        );
        Ok(ApiResponse::created(&favorite))
    }

    async fn remove(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let key = FavoriteKey::from_query(request.query())?;

        let id = self
            .favorite_repo
            .delete(key)
            .await?
            .ok_or(HandlerError::NotFound("Favorite"))?;
        info!(favorite_id = id, "お気に入りを削除");
        Ok(ApiResponse::ok(&json!({ "message": "Favorite removed", "id": id })))
    }
}
