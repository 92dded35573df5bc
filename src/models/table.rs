use super::RawValue;
use serde::Serialize;

/// 导出列顺序 (CSV 表头与页面表头共用)
pub const COLUMNS: [&str; 5] = [
    "product_code",
    "package_price",
    "packages_per_box",
    "box_price",
    "package_weight",
];

/// 合并后的价格行: 包装信息 + 最新价格
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedRow {
    pub product_code: String,
    pub package_price: Option<String>,
    pub packages_per_box: Option<RawValue>,
    pub box_price: Option<String>,
    pub package_weight: Option<RawValue>,
}

impl ConsolidatedRow {
    /// 按 COLUMNS 顺序输出各列的展示文本, 缺失值为空串
    pub fn cells(&self) -> [String; 5] {
        [
            self.product_code.clone(),
            self.package_price.clone().unwrap_or_default(),
            option_to_text(&self.packages_per_box),
            self.box_price.clone().unwrap_or_default(),
            option_to_text(&self.package_weight),
        ]
    }
}

fn option_to_text(val: &Option<RawValue>) -> String {
    val.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// 单张价格表的合并结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    pub price_table_id: String,
    pub rows: Vec<ConsolidatedRow>,
}

impl PriceTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 一次报表请求的完整结果
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub driver: String,
    pub available_tables: Vec<String>,
    pub tables: Vec<PriceTable>,
}
