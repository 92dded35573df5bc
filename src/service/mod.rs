pub mod builder;
pub mod export;
pub mod number;
pub mod report;

pub use builder::PriceTableBuilder;
pub use number::{format_brl, parse_number};
pub use report::{ReportQuery, ReportService, TableNames, ALL_TABLES};
