/// PostgreSQL接続プールとリポジトリ共通のエラー型
///
/// プールは`connect_lazy`で作成するため、最初のクエリまで接続は確立されない。
/// OPTIONSやバリデーションエラーのリクエストはデータベースに触れない。
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use super::config::{ConfigError, DatabaseConfig};

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// データベースへの接続に失敗
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// クエリの実行に失敗
    #[error("Query error: {0}")]
    QueryError(String),

    /// 一意制約違反
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// 行のデコード、JSON列のシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::UniqueViolation(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => RepositoryError::ConnectionFailed(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                RepositoryError::SerializationError(err.to_string())
            }
            _ => RepositoryError::QueryError(err.to_string()),
        }
    }
}

/// 設定から遅延接続のプールを作成する
pub fn create_pool(config: &DatabaseConfig) -> Result<PgPool, ConfigError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections())
        .acquire_timeout(config.acquire_timeout())
        .connect_lazy(config.database_url())
        .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))
}

/// プロセス内で共有する接続プール
///
/// Lambda warm start時にプールを再利用するため静的に保持する。
/// 初期化に失敗した場合はキャッシュされず、次のリクエストで再試行される。
static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// 共有プールを取得（初期化されていなければ環境変数から初期化）
pub async fn shared_pool() -> Result<&'static PgPool, ConfigError> {
    POOL.get_or_try_init(|| async {
        let config = DatabaseConfig::from_env()?;
        info!(
            max_connections = config.max_connections(),
            acquire_timeout_secs = config.acquire_timeout().as_secs(),
            "接続プールを初期化"
        );
        create_pool(&config)
    })
    .await
}
