/// ログ基盤モジュール
///
/// Lambda環境向けの構造化ログ設定を提供する。
/// 出力はCloudWatch Logsでの検索を前提としたJSON形式。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// `RUST_LOG`未設定時のフィルター
///
/// sqlxは実行した文を毎回infoで出力するため、warn以上に絞る。
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// `RUST_LOG`でフィルタリングし、未設定なら`DEFAULT_LOG_FILTER`。
/// 複数回呼び出しても初期化は最初の1回だけ行われる。
///
/// ```ignore
/// use marketplace::infrastructure::init_logging;
///
/// init_logging();
/// tracing::info!(resource = "users", "リクエスト受信");
/// ```
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
            .with_current_span(false);

        // テストと同一プロセスで既にサブスクライバーがある場合は無視する
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}
