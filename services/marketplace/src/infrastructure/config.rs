/// PostgreSQL接続設定
///
/// 環境変数から接続文字列とプール設定を読み込む。
use std::time::Duration;

use thiserror::Error;

/// 環境変数名: 接続文字列
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// 環境変数名: プールの最大接続数
pub const ENV_DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";

/// 環境変数名: 接続取得タイムアウト（秒）
pub const ENV_DATABASE_ACQUIRE_TIMEOUT_SECS: &str = "DATABASE_ACQUIRE_TIMEOUT_SECS";

/// Lambda 1インスタンスは同時に1リクエストしか処理しないため小さめに取る
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 接続取得タイムアウトのデフォルト値（秒）
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// 設定読み込みのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("Invalid database url: {0}")]
    InvalidDatabaseUrl(String),
}

/// データベース接続設定
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// PostgreSQL接続文字列
    database_url: String,
    /// プールの最大接続数
    max_connections: u32,
    /// 接続取得タイムアウト
    acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// 明示的な値で設定を作成
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }

    /// 環境変数から設定を読み込む
    ///
    /// # 環境変数
    /// - `DATABASE_URL`: 接続文字列（必須）
    /// - `DATABASE_MAX_CONNECTIONS`: 最大接続数（デフォルト: 5）
    /// - `DATABASE_ACQUIRE_TIMEOUT_SECS`: 接続取得タイムアウト秒（デフォルト: 5）
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var(ENV_DATABASE_URL)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_DATABASE_URL.to_string()))?;

        let max_connections =
            parse_env_or(ENV_DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS)?;
        let acquire_timeout_secs =
            parse_env_or(ENV_DATABASE_ACQUIRE_TIMEOUT_SECS, DEFAULT_ACQUIRE_TIMEOUT_SECS)?;

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }

    /// 最大接続数を上書き
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn acquire_timeout(&self) -> Duration {
        self.acquire_timeout
    }
}

/// 環境変数を数値として読み込む。未設定ならデフォルト値、0や数値以外はエラー
fn parse_env_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value != T::default() => Ok(value),
            _ => Err(ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            }),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    unsafe fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    unsafe fn cleanup() {
        unsafe {
            remove_env(ENV_DATABASE_URL);
            remove_env(ENV_DATABASE_MAX_CONNECTIONS);
            remove_env(ENV_DATABASE_ACQUIRE_TIMEOUT_SECS);
        }
    }

    #[test]
    fn test_missing_env_var_error_display() {
        let error = ConfigError::MissingEnvVar("DATABASE_URL".to_string());
        assert_eq!(error.to_string(), "Missing environment variable: DATABASE_URL");
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = DatabaseConfig::new("postgres://localhost/marketplace");

        assert_eq!(config.database_url(), "postgres://localhost/marketplace");
        assert_eq!(config.max_connections(), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            config.acquire_timeout(),
            Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_with_max_connections() {
        let config = DatabaseConfig::new("postgres://localhost/db").with_max_connections(12);
        assert_eq!(config.max_connections(), 12);
    }

    #[test]
    #[serial(database_env)]
    fn test_from_env_success() {
        unsafe {
            cleanup();
            set_env(ENV_DATABASE_URL, "postgres://user:pass@db:5432/marketplace");
            set_env(ENV_DATABASE_MAX_CONNECTIONS, "10");
            set_env(ENV_DATABASE_ACQUIRE_TIMEOUT_SECS, "3");
        }

        let config = DatabaseConfig::from_env().unwrap();

        assert_eq!(config.database_url(), "postgres://user:pass@db:5432/marketplace");
        assert_eq!(config.max_connections(), 10);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(3));

        unsafe { cleanup() };
    }

    #[test]
    #[serial(database_env)]
    fn test_from_env_missing_url() {
        unsafe { cleanup() };

        let result = DatabaseConfig::from_env();

        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar("DATABASE_URL".to_string())
        );
    }

    #[test]
    #[serial(database_env)]
    fn test_from_env_blank_url_is_missing() {
        unsafe {
            cleanup();
            set_env(ENV_DATABASE_URL, "   ");
        }

        let result = DatabaseConfig::from_env();
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));

        unsafe { cleanup() };
    }

    #[test]
    #[serial(database_env)]
    fn test_from_env_invalid_max_connections() {
        unsafe {
            cleanup();
            set_env(ENV_DATABASE_URL, "postgres://localhost/db");
            set_env(ENV_DATABASE_MAX_CONNECTIONS, "many");
        }

        let result = DatabaseConfig::from_env();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidValue {
                name: ENV_DATABASE_MAX_CONNECTIONS.to_string(),
                value: "many".to_string(),
            }
        );

        unsafe { cleanup() };
    }

    #[test]
    #[serial(database_env)]
    fn test_from_env_zero_max_connections_rejected() {
        unsafe {
            cleanup();
            set_env(ENV_DATABASE_URL, "postgres://localhost/db");
            set_env(ENV_DATABASE_MAX_CONNECTIONS, "0");
        }

        let result = DatabaseConfig::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        unsafe { cleanup() };
    }

    #[test]
    #[serial(database_env)]
    fn test_from_env_defaults_when_optional_unset() {
        unsafe {
            cleanup();
            set_env(ENV_DATABASE_URL, "postgres://localhost/db");
        }

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.max_connections(), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            config.acquire_timeout(),
            Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS)
        );

        unsafe { cleanup() };
    }
}
