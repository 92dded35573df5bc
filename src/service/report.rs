use crate::config::DatabaseConfig;
use crate::db::{TableSource, TtlCache};
use crate::error::ReportError;
use crate::models::{PackageRecord, PriceLine, PriceTable, Report};
use crate::service::builder::PriceTableBuilder;
use rayon::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 下拉框中"全部价格表"的取值
pub const ALL_TABLES: &str = "Todas";

/// 两张源表的表名
#[derive(Debug, Clone)]
pub struct TableNames {
    pub packages: String,
    pub price_lines: String,
}

impl From<&DatabaseConfig> for TableNames {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            packages: config.packages_table.clone(),
            price_lines: config.price_lines_table.clone(),
        }
    }
}

/// 报表查询参数 (页面表单与 JSON 接口共用)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    /// 价格表编号, 为空或 "Todas" 表示全部
    pub table: Option<String>,
    /// 产品编码片段 (不区分大小写)
    pub product: Option<String>,
    /// 复选框提交 "on", 接口可传 "true"
    pub include_unpriced: Option<String>,
}

impl ReportQuery {
    pub fn selected_table(&self) -> Option<&str> {
        self.table
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != ALL_TABLES)
    }

    pub fn product_filter(&self) -> Option<&str> {
        self.product
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn include_unpriced(&self) -> bool {
        matches!(
            self.include_unpriced.as_deref().map(str::trim),
            Some("on" | "true" | "1" | "yes")
        )
    }
}

/// 同一次请求使用的两张表快照
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub packages: Arc<Vec<PackageRecord>>,
    pub price_lines: Arc<Vec<PriceLine>>,
}

/// 按产品编码片段过滤包装表 (不区分大小写)
pub fn filter_packages(packages: &[PackageRecord], product: Option<&str>) -> Vec<PackageRecord> {
    match product {
        Some(needle) => {
            let needle = needle.to_lowercase();
            packages
                .iter()
                .filter(|p| p.product_code.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        }
        None => packages.to_vec(),
    }
}

/// 报表服务: 读取 (带缓存) -> 过滤 -> 按价格表合并
pub struct ReportService {
    source: Arc<dyn TableSource>,
    tables: TableNames,
    packages: TtlCache<Arc<Vec<PackageRecord>>>,
    price_lines: TtlCache<Arc<Vec<PriceLine>>>,
}

impl ReportService {
    pub fn new(source: Arc<dyn TableSource>, tables: TableNames, ttl: Duration) -> Self {
        Self {
            source,
            tables,
            packages: TtlCache::new(ttl),
            price_lines: TtlCache::new(ttl),
        }
    }

    pub fn driver_name(&self) -> String {
        self.source.driver_name()
    }

    /// 读取两张表, 任一失败则整体失败
    pub async fn snapshot(&self) -> Result<Snapshot, ReportError> {
        let packages_table = self.tables.packages.as_str();
        let price_lines_table = self.tables.price_lines.as_str();

        let (packages, price_lines) = futures::try_join!(
            self.packages.get_or_try_load(packages_table, || async move {
                self.source.fetch_packages(packages_table).await.map(Arc::new)
            }),
            self.price_lines.get_or_try_load(price_lines_table, || async move {
                self.source.fetch_price_lines(price_lines_table).await.map(Arc::new)
            }),
        )?;

        Ok(Snapshot {
            packages,
            price_lines,
        })
    }

    /// 清空表缓存, 下次请求重新读取数据库
    pub fn refresh(&self) {
        self.packages.invalidate(&self.tables.packages);
        self.price_lines.invalidate(&self.tables.price_lines);
        tracing::info!("Table cache invalidated");
    }

    pub async fn available_tables(&self) -> Result<Vec<String>, ReportError> {
        let snapshot = self.snapshot().await?;
        Ok(PriceTableBuilder::new(&[], &snapshot.price_lines).available_table_ids())
    }

    /// 生成报表: 选中单张价格表或全部价格表
    pub async fn report(&self, query: &ReportQuery) -> Result<Report, ReportError> {
        let snapshot = self.snapshot().await?;
        let start = Instant::now();

        let packages = filter_packages(&snapshot.packages, query.product_filter());
        let builder = PriceTableBuilder::new(&packages, &snapshot.price_lines);
        let available_tables = builder.available_table_ids();

        let ids: Vec<String> = match query.selected_table() {
            Some(id) => vec![id.to_string()],
            None => available_tables.clone(),
        };

        let include_unpriced = query.include_unpriced();
        let tables: Vec<PriceTable> = ids
            .par_iter()
            .map(|id| builder.build(id, include_unpriced))
            .collect();

        tracing::info!(
            "报表生成完成: {} 张价格表, {} 个产品, 耗时: {:?}",
            tables.len(),
            packages.len(),
            start.elapsed()
        );

        Ok(Report {
            driver: self.driver_name(),
            available_tables,
            tables,
        })
    }

    /// 单张价格表
    pub async fn table(
        &self,
        price_table_id: &str,
        product: Option<&str>,
        include_unpriced: bool,
    ) -> Result<PriceTable, ReportError> {
        let snapshot = self.snapshot().await?;
        let packages = filter_packages(&snapshot.packages, product);

        Ok(PriceTableBuilder::new(&packages, &snapshot.price_lines)
            .build(price_table_id, include_unpriced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MemorySource {
        packages: Vec<PackageRecord>,
        price_lines: Vec<PriceLine>,
        fetches: AtomicUsize,
        fail: AtomicBool,
    }

    impl MemorySource {
        fn new() -> Self {
            let on = NaiveDate::from_ymd_opt(2024, 5, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
            Self {
                packages: vec![
                    PackageRecord::new("AB-100", Some("10".into()), Some("0,5".into())),
                    PackageRecord::new("ab-200", Some("6".into()), Some("1".into())),
                    PackageRecord::new("CD-300", Some("12".into()), Some("2".into())),
                ],
                price_lines: vec![
                    PriceLine::new("T2", "CD-300", on, Some(RawValue::from("3,00"))),
                    PriceLine::new("T1", "AB-100", on, Some(RawValue::from("9999.99"))),
                    PriceLine::new("T1", "CD-300", on, Some(RawValue::from("2,50"))),
                ],
                fetches: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn check(&self) -> Result<(), ReportError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ReportError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TableSource for MemorySource {
        fn driver_name(&self) -> String {
            "memory".to_string()
        }

        async fn fetch_packages(&self, _table: &str) -> Result<Vec<PackageRecord>, ReportError> {
            self.check()?;
            Ok(self.packages.clone())
        }

        async fn fetch_price_lines(&self, _table: &str) -> Result<Vec<PriceLine>, ReportError> {
            self.check()?;
            Ok(self.price_lines.clone())
        }
    }

    fn service(source: Arc<MemorySource>) -> ReportService {
        let names = TableNames {
            packages: "usu_t075pro".to_string(),
            price_lines: "usu_t081itp".to_string(),
        };
        ReportService::new(source, names, Duration::from_secs(300))
    }

    fn query(table: Option<&str>, product: Option<&str>, unpriced: bool) -> ReportQuery {
        ReportQuery {
            table: table.map(str::to_string),
            product: product.map(str::to_string),
            include_unpriced: unpriced.then(|| "on".to_string()),
        }
    }

    #[test]
    fn test_query_parsing() {
        assert_eq!(query(Some("Todas"), None, false).selected_table(), None);
        assert_eq!(query(Some(" "), None, false).selected_table(), None);
        assert_eq!(query(Some("T1"), None, false).selected_table(), Some("T1"));
        assert!(query(None, None, true).include_unpriced());
        assert!(!ReportQuery::default().include_unpriced());
        assert_eq!(query(None, Some("  "), false).product_filter(), None);
    }

    #[tokio::test]
    async fn test_report_builds_every_table() {
        let svc = service(Arc::new(MemorySource::new()));

        let report = svc.report(&query(None, None, false)).await.unwrap();

        assert_eq!(report.driver, "memory");
        assert_eq!(report.available_tables, vec!["T1", "T2"]);
        let ids: Vec<_> = report.tables.iter().map(|t| t.price_table_id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2"]);
        assert_eq!(report.tables[0].rows.len(), 2);
        assert_eq!(report.tables[0].rows[0].box_price.as_deref(), Some("R$ 0,00"));
        assert_eq!(report.tables[1].rows.len(), 1);
    }

    #[tokio::test]
    async fn test_product_filter_is_case_insensitive() {
        let svc = service(Arc::new(MemorySource::new()));

        let report = svc.report(&query(Some("T1"), Some("Ab"), true)).await.unwrap();

        assert_eq!(report.tables.len(), 1);
        let codes: Vec<_> = report.tables[0].rows.iter().map(|r| r.product_code.as_str()).collect();
        assert_eq!(codes, vec!["AB-100", "ab-200"]);
        assert_eq!(report.tables[0].rows[1].package_price, None);
    }

    #[tokio::test]
    async fn test_snapshot_is_cached_until_refresh() {
        let source = Arc::new(MemorySource::new());
        let svc = service(source.clone());

        svc.report(&ReportQuery::default()).await.unwrap();
        svc.table("T1", None, false).await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

        svc.refresh();
        svc.available_tables().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_source_failure_is_fatal() {
        let source = Arc::new(MemorySource::new());
        source.fail.store(true, Ordering::SeqCst);
        let svc = service(source);

        let err = svc.report(&ReportQuery::default()).await.unwrap_err();
        assert!(err.is_fatal_source_error());
    }
}
