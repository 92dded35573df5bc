pub mod handlers;
pub mod html;

pub use handlers::*;

use crate::service::ReportService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建路由
pub fn router(service: Arc<ReportService>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health_check))
        .route("/api/tables", get(list_tables))
        .route("/api/report", get(report))
        .route("/api/tables/:id", get(price_table))
        .route("/api/tables/:id/csv", get(price_table_csv))
        .route("/api/cache/refresh", post(refresh_cache))
        .layer(ServiceBuilder::new())
        .with_state(service)
}
