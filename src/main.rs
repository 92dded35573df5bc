use erp_price_tables::db::{installed_driver_names, SqlTableSource};
use erp_price_tables::service::TableNames;
use erp_price_tables::{api, create_pool, AppConfig, ReportService};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式, RUST_LOG 控制级别 (默认 info)
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 选择驱动并创建连接池 (延迟连接, 连接失败在报表页面展示)
    let (pool, driver) = match create_pool(&config.database) {
        Ok(created) => created,
        Err(e) => {
            error!("{}", e);
            error!("已安装的数据库驱动: {:?}", installed_driver_names());
            return Err(e.into());
        }
    };
    info!("Database pool created, driver: {}", driver);

    let source = Arc::new(SqlTableSource::new(pool, driver));
    let service = Arc::new(ReportService::new(
        source,
        TableNames::from(&config.database),
        config.cache.ttl(),
    ));

    let app = api::router(service);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("Endpoints:");
    info!("  GET  /                     - 价格表报表页面");
    info!("  GET  /api/tables           - 价格表编号列表");
    info!("  GET  /api/report           - 报表 JSON");
    info!("  GET  /api/tables/:id       - 单张价格表 JSON");
    info!("  GET  /api/tables/:id/csv   - 单张价格表 CSV");
    info!("  POST /api/cache/refresh    - 清空表缓存");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
