pub mod cache;
pub mod driver;
pub mod pool;
pub mod queries;
pub mod source;

pub use cache::{TtlCache, DEFAULT_TABLE_TTL};
pub use driver::{choose_driver, installed_driver_names, installed_drivers, Driver};
pub use pool::create_pool;
pub use source::{SqlTableSource, TableSource};
