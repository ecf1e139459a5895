/// ブローカーハンドラー
///
/// IDと紹介コードはサーバー側で生成する。紹介コードが既存のものと衝突した場合は
/// コードを作り直して再試行する。
use lambda_http::http::Method;
use tracing::{info, warn};

use super::error::{into_api_response, HandlerError};
use super::request::ApiRequest;
use super::response::{ApiResponse, BROKER_CORS};
use crate::domain::broker::{generate_broker_id, generate_referral_code};
use crate::domain::{BrokerUpdate, NewBroker};
use crate::infrastructure::{BrokerRepository, RepositoryError};

/// 紹介コード衝突時の最大試行回数
pub const REFERRAL_CODE_ATTEMPTS: usize = 3;

pub struct BrokersHandler<BR>
where
    BR: BrokerRepository,
{
    broker_repo: BR,
}

impl<BR> BrokersHandler<BR>
where
    BR: BrokerRepository,
{
    pub fn new(broker_repo: BR) -> Self {
        Self { broker_repo }
    }

    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        if request.is_preflight() {
            return ApiResponse::preflight(&BROKER_CORS);
        }
        info!(method = %request.method(), "ブローカーリクエスト受信");
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
        match request.query_param("id") {
            Some(id) => {
                let broker = self
                    .broker_repo
                    .find_by_id(id)
                    .await?
                    .ok_or(HandlerError::NotFound("Broker"))?;
                Ok(ApiResponse::ok(&broker))
            }
            None => {
                let brokers = self.broker_repo.list_all().await?;
                Ok(ApiResponse::ok(&brokers))
            }
        }
    }

    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let new_broker = NewBroker::from_body(request.json_body()?)?;
        let id = generate_broker_id();

        let mut attempt = 1;
        loop {
            let referral_code = generate_referral_code();
            match self
                .broker_repo
                .insert(&id, &referral_code, &new_broker)
                .await
            {
                Ok(broker) => {
                    info!(broker_id = %broker.id, referral_code = %referral_code, "ブローカーを作成");
                    return Ok(ApiResponse::created(&broker));
                }
                Err(RepositoryError::UniqueViolation(detail))
                    if attempt < REFERRAL_CODE_ATTEMPTS =>
                {
                    warn!(attempt, detail = %detail, "紹介コードが衝突したため再生成");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// プロフィールを上書きする（存在確認は行わない）
    async fn update(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let update = BrokerUpdate::from_body(request.json_body()?)?;

        let broker = self.broker_repo.update(&update).await?;
        info!(broker_id = %update.id, matched = broker.is_some(), "ブローカーを更新");
        Ok(ApiResponse::ok(&broker))
    }
}
