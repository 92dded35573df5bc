use crate::db::driver::Driver;
use crate::error::ReportError;
use crate::models::{PackageRecord, PackageRow, PriceLine, PriceLineRow};
use sqlx::AnyPool;
use std::time::Instant;

/// 表名只允许字母/数字/下划线/点, 防止拼接 SQL 时注入
pub fn validate_table_name(name: &str) -> Result<&str, ReportError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if valid {
        Ok(name)
    } else {
        Err(ReportError::InvalidTableName(name.to_string()))
    }
}

pub fn packages_sql(driver: Driver, table: &str) -> Result<String, ReportError> {
    let table = validate_table_name(table)?;
    Ok(format!(
        "SELECT {} AS usu_codpro, {} AS usu_qtdpct, {} AS usu_kgpct FROM {}",
        driver.text_cast("usu_codpro"),
        driver.text_cast("usu_qtdpct"),
        driver.text_cast("usu_kgpct"),
        table
    ))
}

/// 排序固定了数据集顺序, 同一天的多条价格取第一条时结果稳定
pub fn price_lines_sql(driver: Driver, table: &str) -> Result<String, ReportError> {
    let table = validate_table_name(table)?;
    Ok(format!(
        "SELECT {} AS usu_codtpr, {} AS usu_codpro, {} AS usu_datini, {} AS usu_prebas FROM {} \
         ORDER BY usu_codtpr, usu_codpro, usu_datini, usu_prebas",
        driver.text_cast("usu_codtpr"),
        driver.text_cast("usu_codpro"),
        driver.text_cast("usu_datini"),
        driver.text_cast("usu_prebas"),
        table
    ))
}

/// 读取包装表全量数据
pub async fn list_packages(
    pool: &AnyPool,
    driver: Driver,
    table: &str,
) -> Result<Vec<PackageRecord>, ReportError> {
    let sql = packages_sql(driver, table)?;
    let start = Instant::now();

    let rows = sqlx::query_as::<_, PackageRow>(&sql).fetch_all(pool).await?;
    let total = rows.len();

    let records: Vec<PackageRecord> = rows
        .into_iter()
        .filter_map(|row| PackageRecord::try_from(row).ok())
        .collect();

    if records.len() < total {
        tracing::debug!("{}: 跳过 {} 条产品编码为空的记录", table, total - records.len());
    }
    tracing::info!("读取 {} 完成, {} 行, 耗时: {:?}", table, records.len(), start.elapsed());

    Ok(records)
}

/// 读取价格明细表全量数据
pub async fn list_price_lines(
    pool: &AnyPool,
    driver: Driver,
    table: &str,
) -> Result<Vec<PriceLine>, ReportError> {
    let sql = price_lines_sql(driver, table)?;
    let start = Instant::now();

    let rows = sqlx::query_as::<_, PriceLineRow>(&sql).fetch_all(pool).await?;
    let total = rows.len();

    let lines: Vec<PriceLine> = rows
        .into_iter()
        .filter_map(|row| PriceLine::try_from(row).ok())
        .collect();

    if lines.len() < total {
        tracing::debug!(
            "{}: 跳过 {} 条价格表或产品编码为空的记录",
            table,
            total - lines.len()
        );
    }
    tracing::info!("读取 {} 完成, {} 行, 耗时: {:?}", table, lines.len(), start.elapsed());

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("erp.dbo.usu_t075pro").is_ok());
        assert!(validate_table_name("usu_t081itp").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("t; DROP TABLE x").is_err());
        assert!(validate_table_name("erp.dbo.").is_err());
        assert!(validate_table_name("\"quoted\"").is_err());
    }

    #[test]
    fn test_price_lines_sql_is_ordered() {
        let sql = price_lines_sql(Driver::Postgres, "erp.dbo.usu_t081itp").unwrap();
        assert!(sql.contains("CAST(usu_datini AS TEXT) AS usu_datini"));
        assert!(sql.contains("FROM erp.dbo.usu_t081itp"));
        assert!(sql.ends_with("ORDER BY usu_codtpr, usu_codpro, usu_datini, usu_prebas"));
    }

    #[test]
    fn test_packages_sql_rejects_bad_table() {
        assert!(matches!(
            packages_sql(Driver::MySql, "x;--"),
            Err(ReportError::InvalidTableName(_))
        ));
    }
}
