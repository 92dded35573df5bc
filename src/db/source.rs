use crate::db::driver::Driver;
use crate::db::queries;
use crate::error::ReportError;
use crate::models::{PackageRecord, PriceLine};
use async_trait::async_trait;
use sqlx::AnyPool;

/// 报表数据来源: 整表读取包装表与价格明细表
#[async_trait]
pub trait TableSource: Send + Sync {
    /// 当前使用的驱动名 (页面上展示)
    fn driver_name(&self) -> String;

    async fn fetch_packages(&self, table: &str) -> Result<Vec<PackageRecord>, ReportError>;

    async fn fetch_price_lines(&self, table: &str) -> Result<Vec<PriceLine>, ReportError>;
}

/// 基于 sqlx 连接池的数据来源
pub struct SqlTableSource {
    pool: AnyPool,
    driver: Driver,
}

impl SqlTableSource {
    pub fn new(pool: AnyPool, driver: Driver) -> Self {
        Self { pool, driver }
    }
}

#[async_trait]
impl TableSource for SqlTableSource {
    fn driver_name(&self) -> String {
        self.driver.name().to_string()
    }

    async fn fetch_packages(&self, table: &str) -> Result<Vec<PackageRecord>, ReportError> {
        queries::list_packages(&self.pool, self.driver, table).await
    }

    async fn fetch_price_lines(&self, table: &str) -> Result<Vec<PriceLine>, ReportError> {
        queries::list_price_lines(&self.pool, self.driver, table).await
    }
}
