use crate::error::ReportError;
use std::fmt;

/// 默认驱动优先级
pub const PREFERRED_DRIVERS: &[&str] = &["postgres", "mysql"];

/// sqlx Any 支持的驱动
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Postgres,
    MySql,
}

impl Driver {
    pub fn name(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Driver::Postgres),
            "mysql" | "mariadb" => Some(Driver::MySql),
            _ => None,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Driver::Postgres => 5432,
            Driver::MySql => 3306,
        }
    }

    /// 将列转为文本, 保留数据库中的原始表示
    pub fn text_cast(&self, column: &str) -> String {
        match self {
            Driver::Postgres => format!("CAST({} AS TEXT)", column),
            Driver::MySql => format!("CAST({} AS CHAR)", column),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 当前编译进来的驱动 (由 crate features 决定)
pub fn installed_drivers() -> Vec<Driver> {
    #[allow(unused_mut)]
    let mut drivers = Vec::new();
    #[cfg(feature = "postgres")]
    drivers.push(Driver::Postgres);
    #[cfg(feature = "mysql")]
    drivers.push(Driver::MySql);
    drivers
}

pub fn installed_driver_names() -> Vec<String> {
    installed_drivers()
        .iter()
        .map(|d| d.name().to_string())
        .collect()
}

/// 按优先级选择驱动: 先按配置顺序匹配, 否则取第一个已安装的驱动
pub fn choose_driver(preferred: &[String], installed: &[Driver]) -> Result<Driver, ReportError> {
    for name in preferred {
        if let Some(driver) = Driver::from_name(name) {
            if installed.contains(&driver) {
                return Ok(driver);
            }
        }
    }

    installed.first().copied().ok_or_else(|| ReportError::NoDriver {
        installed: installed.iter().map(|d| d.name().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preference_order_respected() {
        let installed = [Driver::Postgres, Driver::MySql];
        let chosen = choose_driver(&names(&["mysql", "postgres"]), &installed).unwrap();
        assert_eq!(chosen, Driver::MySql);
    }

    #[test]
    fn test_skips_preferences_not_installed() {
        let installed = [Driver::MySql];
        let chosen = choose_driver(&names(&["postgres", "mysql"]), &installed).unwrap();
        assert_eq!(chosen, Driver::MySql);
    }

    #[test]
    fn test_falls_back_to_any_installed() {
        let installed = [Driver::Postgres];
        let chosen = choose_driver(&names(&["oracle"]), &installed).unwrap();
        assert_eq!(chosen, Driver::Postgres);
    }

    #[test]
    fn test_no_driver_is_an_error() {
        let err = choose_driver(&names(&["postgres"]), &[]).unwrap_err();
        assert!(matches!(err, ReportError::NoDriver { ref installed } if installed.is_empty()));
    }

    #[test]
    fn test_text_cast_per_dialect() {
        assert_eq!(Driver::Postgres.text_cast("usu_prebas"), "CAST(usu_prebas AS TEXT)");
        assert_eq!(Driver::MySql.text_cast("usu_prebas"), "CAST(usu_prebas AS CHAR)");
    }
}
