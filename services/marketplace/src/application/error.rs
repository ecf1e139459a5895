/// ハンドラー共通のエラー型
///
/// すべてのエラーは`{"error": "..."}`形式のレスポンスに変換され、
/// ランタイムまで伝播することはない。
use lambda_http::http::StatusCode;
use thiserror::Error;
use tracing::{error, warn};

use super::response::ApiResponse;
use crate::domain::ValidationError;
use crate::infrastructure::RepositoryError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HandlerError {
    /// 対象のレコードが存在しない
    #[error("{0} not found")]
    NotFound(&'static str),

    /// リクエストの検証エラー
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// ハンドラーが受け付けないメソッド
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// 未知のresourceパラメータ
    #[error("Resource not found")]
    UnknownResource,

    /// データベース操作エラー（詳細はログのみ）
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::NotFound(_) | HandlerError::UnknownResource => StatusCode::NOT_FOUND,
            HandlerError::Validation(_) => StatusCode::BAD_REQUEST,
            HandlerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HandlerError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// クライアントに返すメッセージ
    pub fn client_message(&self) -> String {
        match self {
            HandlerError::Repository(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// エラーレスポンスに変換（ログ出力を伴う）
    pub fn into_response(self) -> ApiResponse {
        match &self {
            HandlerError::Repository(err) => {
                error!(error = %err, "データベース操作に失敗");
            }
            other => {
                warn!(status = other.status().as_u16(), error = %other, "リクエストを拒否");
            }
        }
        ApiResponse::error(self.status(), &self.client_message())
    }
}

/// ハンドラー結果をレスポンスに畳み込む
pub fn into_api_response(result: Result<ApiResponse, HandlerError>) -> ApiResponse {
    result.unwrap_or_else(HandlerError::into_response)
}
