pub mod package;
pub mod price_line;
pub mod table;
pub mod value;

pub use package::{PackageRecord, PackageRow};
pub use price_line::{parse_effective_date, PriceLine, PriceLineRow};
pub use table::{ConsolidatedRow, PriceTable, Report, COLUMNS};
pub use value::RawValue;
