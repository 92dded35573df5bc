use crate::api::html;
use crate::db::installed_driver_names;
use crate::error::ReportError;
use crate::models::{PriceTable, Report};
use crate::service::export::{csv_file_name, export_to_csv};
use crate::service::report::{ReportQuery, ReportService};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// 缓存刷新响应体
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 报表页面
///
/// 读取数据库失败时只显示错误页面和已安装驱动, 不输出任何部分结果.
pub async fn dashboard(
    State(service): State<Arc<ReportService>>,
    Query(query): Query<ReportQuery>,
) -> Response {
    match service.report(&query).await {
        Ok(report) => Html(html::render_dashboard(&report, &query)).into_response(),
        Err(e) => {
            tracing::error!("报表生成失败: {}", e);
            let page = html::render_fatal(&e.to_string(), &installed_driver_names());
            (e.status_code(), Html(page)).into_response()
        }
    }
}

/// 价格表编号列表
pub async fn list_tables(
    State(service): State<Arc<ReportService>>,
) -> Result<Json<Vec<String>>, ReportError> {
    Ok(Json(service.available_tables().await?))
}

/// 报表 JSON
pub async fn report(
    State(service): State<Arc<ReportService>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, ReportError> {
    Ok(Json(service.report(&query).await?))
}

/// 单张价格表 JSON
pub async fn price_table(
    State(service): State<Arc<ReportService>>,
    Path(price_table_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<PriceTable>, ReportError> {
    let table = service
        .table(&price_table_id, query.product_filter(), query.include_unpriced())
        .await?;
    Ok(Json(table))
}

/// 单张价格表 CSV 下载
pub async fn price_table_csv(
    State(service): State<Arc<ReportService>>,
    Path(price_table_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ReportError> {
    let table = service
        .table(&price_table_id, query.product_filter(), query.include_unpriced())
        .await?;
    let body = export_to_csv(&table)?;

    tracing::info!("导出 CSV: {} ({} 行)", price_table_id, table.rows.len());

    let disposition = format!("attachment; filename=\"{}\"", csv_file_name(&price_table_id));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// 清空表缓存
pub async fn refresh_cache(State(service): State<Arc<ReportService>>) -> Json<RefreshResponse> {
    service.refresh();
    Json(RefreshResponse {
        success: true,
        message: "Table cache cleared".to_string(),
    })
}
