/// ブローカーHTTP Lambdaエントリポイント
///
/// # 環境変数
/// - DATABASE_URL: PostgreSQL接続文字列（必須）
/// - DATABASE_MAX_CONNECTIONS: 接続プールの最大接続数（デフォルト: 5）
/// - DATABASE_ACQUIRE_TIMEOUT_SECS: 接続取得タイムアウト秒数（デフォルト: 5）
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use marketplace::application::{ApiRequest, ApiResponse, BrokersHandler, BROKER_CORS};
use marketplace::infrastructure::{init_logging, shared_pool, PgBrokerRepository};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("ブローカーLambda関数を初期化");

    run(service_fn(handler)).await
}

/// HTTPリクエストハンドラー
///
/// プリフライトは接続プールを初期化せずに応答する。
/// 設定エラーはプロセスを落とさず500レスポンスにする。
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let request = ApiRequest::from_http(&event);

    if request.is_preflight() {
        return Ok(ApiResponse::preflight(&BROKER_CORS).into_http()?);
    }

    let pool = match shared_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "接続プールの初期化に失敗");
            return Ok(ApiResponse::internal_error().into_http()?);
        }
    };

    let handler = BrokersHandler::new(PgBrokerRepository::new(pool.clone()));
    let response = handler.handle(&request).await;

    Ok(response.into_http()?)
}
