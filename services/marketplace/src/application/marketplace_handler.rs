/// マーケットプレイスハンドラー
///
/// `resource`クエリパラメータで users / objects / favorites に振り分ける。
/// 未指定の場合はusers。
use tracing::info;

use super::error::{into_api_response, HandlerError};
use super::favorites_handler::FavoritesHandler;
use super::objects_handler::ObjectsHandler;
use super::request::ApiRequest;
use super::response::{ApiResponse, MARKETPLACE_CORS};
use super::users_handler::UsersHandler;
use crate::infrastructure::{FavoriteRepository, InvestmentObjectRepository, UserRepository};

/// resource未指定時の振り分け先
pub const DEFAULT_RESOURCE: &str = "users";

pub struct MarketplaceHandler<UR, OR, FR>
where
    UR: UserRepository,
    OR: InvestmentObjectRepository,
    FR: FavoriteRepository,
{
    users: UsersHandler<UR>,
    objects: ObjectsHandler<OR>,
    favorites: FavoritesHandler<FR>,
}

impl<UR, OR, FR> MarketplaceHandler<UR, OR, FR>
where
    UR: UserRepository,
    OR: InvestmentObjectRepository,
    FR: FavoriteRepository,
{
    pub fn new(user_repo: UR, object_repo: OR, favorite_repo: FR) -> Self {
        Self {
            users: UsersHandler::new(user_repo),
            objects: ObjectsHandler::new(object_repo),
            favorites: FavoritesHandler::new(favorite_repo),
        }
    }

    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        if request.is_preflight() {
            return ApiResponse::preflight(&MARKETPLACE_CORS);
        }

        let resource = request.query_param("resource").unwrap_or(DEFAULT_RESOURCE);
        info!(method = %request.method(), resource, "マーケットプレイスリクエスト受信");

        let result = match resource {
            "users" => self.users.handle(request).await,
            "objects" => self.objects.handle(request).await,
            "favorites" => self.favorites.handle(request).await,
            _ => Err(HandlerError::UnknownResource),
        };
        into_api_response(result)
    }
}
