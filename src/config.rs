use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    /// 为空时使用驱动默认端口
    pub port: Option<u16>,
    pub name: String,
    pub user: String,
    pub password: String,
    /// 驱动优先级
    pub drivers: Vec<String>,
    pub max_connections: u32,
    pub packages_table: String,
    pub price_lines_table: String,
}

// 启动时会打印配置, 密码不能出现在日志里
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("drivers", &self.drivers)
            .field("max_connections", &self.max_connections)
            .field("packages_table", &self.packages_table)
            .field("price_lines_table", &self.price_lines_table)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// 扁平的配置键, 与环境变量一一对应 (DB_HOST -> db_host)
#[derive(Debug, Deserialize)]
struct Settings {
    server_host: String,
    server_port: u16,
    db_host: String,
    db_port: Option<u16>,
    db_name: String,
    db_user: String,
    db_pass: String,
    db_drivers: String,
    db_max_connections: u32,
    db_packages_table: String,
    db_price_lines_table: String,
    cache_ttl_secs: u64,
}

impl From<Settings> for AppConfig {
    fn from(s: Settings) -> Self {
        Self {
            server: ServerConfig {
                host: s.server_host,
                port: s.server_port,
            },
            database: DatabaseConfig {
                host: s.db_host,
                port: s.db_port,
                name: s.db_name,
                user: s.db_user,
                password: s.db_pass,
                drivers: s
                    .db_drivers
                    .split(',')
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty())
                    .collect(),
                max_connections: s.db_max_connections,
                packages_table: s.db_packages_table,
                price_lines_table: s.db_price_lines_table,
            },
            cache: CacheConfig {
                ttl_secs: s.cache_ttl_secs,
            },
        }
    }
}

/// 默认值 (密码默认为空, 需由运维提供)
fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("server_host", "127.0.0.1")?
        .set_default("server_port", 8080_i64)?
        .set_default("db_host", "localhost")?
        .set_default("db_name", "erp")?
        .set_default("db_user", "erp")?
        .set_default("db_pass", "")?
        .set_default("db_drivers", "postgres,mysql")?
        .set_default("db_max_connections", 5_i64)?
        .set_default("db_packages_table", "erp.dbo.usu_t075pro")?
        .set_default("db_price_lines_table", "erp.dbo.usu_t081itp")?
        .set_default("cache_ttl_secs", 300_i64)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: None,
                name: "erp".to_string(),
                user: "erp".to_string(),
                password: String::new(),
                drivers: vec!["postgres".to_string(), "mysql".to_string()],
                max_connections: 5,
                packages_table: "erp.dbo.usu_t075pro".to_string(),
                price_lines_table: "erp.dbo.usu_t081itp".to_string(),
            },
            cache: CacheConfig { ttl_secs: 300 },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 < 配置文件 (REPORT_CONFIG, 默认 report.toml, 可选) < 环境变量
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let path = std::env::var("REPORT_CONFIG").unwrap_or_else(|_| "report.toml".to_string());

        let config = with_defaults(Config::builder())?
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::default())
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, config::ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        Ok(settings.into())
    }
}
