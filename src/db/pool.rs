use crate::config::DatabaseConfig;
use crate::db::driver::{choose_driver, installed_drivers, Driver};
use crate::error::ReportError;
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use sqlx::{AnyPool, ConnectOptions};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// 构建连接串, 用户名和密码会做百分号编码
pub fn build_database_url(config: &DatabaseConfig, driver: Driver) -> Result<Url, ReportError> {
    let invalid = |what: &str| ReportError::InvalidConnectionUrl(format!("{} for host {}", what, config.host));

    let mut url = Url::parse(&format!("{}://{}", driver.scheme(), config.host))
        .map_err(|e| ReportError::InvalidConnectionUrl(e.to_string()))?;
    url.set_port(Some(config.port.unwrap_or_else(|| driver.default_port())))
        .map_err(|_| invalid("invalid port"))?;
    url.set_username(&config.user)
        .map_err(|_| invalid("invalid user"))?;
    if !config.password.is_empty() {
        url.set_password(Some(&config.password))
            .map_err(|_| invalid("invalid password"))?;
    }
    url.set_path(&config.name);

    Ok(url)
}

/// 创建数据库连接池 (延迟连接, 首次查询时才建立连接)
///
/// 返回连接池和选中的驱动. 没有可用驱动时直接失败.
pub fn create_pool(config: &DatabaseConfig) -> Result<(AnyPool, Driver), ReportError> {
    sqlx::any::install_default_drivers();

    let driver = choose_driver(&config.drivers, &installed_drivers())?;
    let url = build_database_url(config, driver)?;

    let mut connect_options = AnyConnectOptions::from_str(url.as_str())?;

    // 设置慢查询日志阈值为 5秒
    connect_options = connect_options.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_secs(5),
    );

    let pool = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy_with(connect_options);

    Ok((pool, driver))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "db.example.com".to_string(),
            port: None,
            name: "erp".to_string(),
            user: "report".to_string(),
            password: "p@ss:word".to_string(),
            drivers: vec!["postgres".to_string()],
            max_connections: 5,
            packages_table: "erp.dbo.usu_t075pro".to_string(),
            price_lines_table: "erp.dbo.usu_t081itp".to_string(),
        }
    }

    #[test]
    fn test_url_uses_driver_default_port() {
        let url = build_database_url(&db_config(), Driver::Postgres).unwrap();
        assert_eq!(url.scheme(), "postgres");
        assert_eq!(url.port(), Some(5432));
        assert_eq!(url.path(), "/erp");

        let url = build_database_url(&db_config(), Driver::MySql).unwrap();
        assert_eq!(url.port(), Some(3306));
    }

    #[test]
    fn test_url_encodes_credentials() {
        let url = build_database_url(&db_config(), Driver::Postgres).unwrap();
        assert_eq!(url.username(), "report");
        assert_eq!(url.password(), Some("p%40ss%3Aword"));
    }

    #[test]
    fn test_empty_password_omitted() {
        let mut config = db_config();
        config.password.clear();
        config.port = Some(15432);
        let url = build_database_url(&config, Driver::Postgres).unwrap();
        assert_eq!(url.password(), None);
        assert_eq!(url.port(), Some(15432));
    }
}
