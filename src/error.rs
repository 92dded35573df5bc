use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 报表服务错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("database read failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("no database driver available (installed: {installed:?})")]
    NoDriver { installed: Vec<String> },

    #[error("invalid table name: {0}")]
    InvalidTableName(String),

    #[error("invalid connection parameters: {0}")]
    InvalidConnectionUrl(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// 数据源不可用 (连接/读取失败) 属于致命错误, 整个报表不输出
    pub fn is_fatal_source_error(&self) -> bool {
        matches!(
            self,
            ReportError::Database(_) | ReportError::InvalidTableName(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_fatal_source_error() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!("Request failed: {}", self);

        let body = Json(json!({
            "success": false,
            "message": format!("Error: {}", self),
        }));

        (status, body).into_response()
    }
}
