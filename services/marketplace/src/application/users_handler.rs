/// ユーザーハンドラー（resource=users）
use lambda_http::http::Method;
use serde_json::json;
use tracing::info;

use super::error::HandlerError;
use super::request::ApiRequest;
use super::response::ApiResponse;
use crate::domain::user::USER_LIST_LIMIT;
use crate::domain::validation::parse_int_param;
use crate::domain::NewUser;
use crate::infrastructure::{RepositoryError, UserRepository};

pub struct UsersHandler<UR>
where
    UR: UserRepository,
{
    user_repo: UR,
}

impl<UR> UsersHandler<UR>
where
    UR: UserRepository,
{
    pub fn new(user_repo: UR) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        match *request.method() {
            Method::GET => self.get(request).await,
            Method::POST => self.create(request).await,
            _ => Err(HandlerError::MethodNotAllowed),
        }
    }

    /// id、email、一覧の順に解決する
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        if let Some(id) = request.query_param("id") {
            let id = parse_int_param("id", id)?;
            let user = self
                .user_repo
                .find_by_id(id)
                .await?
                .ok_or(HandlerError::NotFound("User"))?;
            return Ok(ApiResponse::ok(&user));
        }

        if let Some(email) = request.query_param("email") {
            let user = self
                .user_repo
                .find_by_email(email)
                .await?
                .ok_or(HandlerError::NotFound("User"))?;
            return Ok(ApiResponse::ok(&user));
        }

        let users = self.user_repo.list_recent(USER_LIST_LIMIT).await?;
        Ok(ApiResponse::ok(&users))
    }

    /// 同じメールアドレスのユーザーがいれば作成せずにそのIDを返す
    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let body = request.json_body()?;
        let new_user = NewUser::from_body(&body)?;

        if let Some(existing) = self.user_repo.find_by_email(&new_user.email).await? {
            return Ok(already_exists(existing.id));
        }

        match self.user_repo.insert(&new_user).await {
            Ok(user) => {
                info!(user_id = user.id, role = %user.role, "ユーザーを作成");
                Ok(ApiResponse::created(&user))
            }
            // 事前チェック後に同じメールアドレスで作成された場合
            Err(RepositoryError::UniqueViolation(_)) => {
                let existing = self
                    .user_repo
                    .find_by_email(&new_user.email)
                    .await?
                    .ok_or(HandlerError::NotFound("User"))?;
                Ok(already_exists(existing.id))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn already_exists(id: i32) -> ApiResponse {
    ApiResponse::ok(&json!({ "id": id, "message": "User already exists" }))
}
