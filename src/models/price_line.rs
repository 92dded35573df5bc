use super::RawValue;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

/// 价格表明细原始行 (usu_t081itp)
#[derive(Debug, Clone, FromRow)]
pub struct PriceLineRow {
    pub usu_codtpr: Option<String>,
    pub usu_codpro: Option<String>,
    pub usu_datini: Option<String>,
    pub usu_prebas: Option<String>,
}

/// 价格明细: 同一 (价格表, 产品) 可能有多条, 以生效日期区分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceLine {
    pub price_table_id: String,
    pub product_code: String,
    pub effective_date: Option<NaiveDateTime>,
    pub base_price: Option<RawValue>,
}

impl PriceLine {
    pub fn new(
        price_table_id: impl Into<String>,
        product_code: impl Into<String>,
        effective_date: Option<NaiveDateTime>,
        base_price: Option<RawValue>,
    ) -> Self {
        Self {
            price_table_id: price_table_id.into(),
            product_code: product_code.into(),
            effective_date,
            base_price,
        }
    }
}

impl TryFrom<PriceLineRow> for PriceLine {
    type Error = PriceLineRow;

    fn try_from(row: PriceLineRow) -> Result<Self, Self::Error> {
        match (&row.usu_codtpr, &row.usu_codpro) {
            (Some(table), Some(code)) => Ok(Self {
                price_table_id: table.clone(),
                product_code: code.clone(),
                effective_date: row.usu_datini.as_deref().and_then(parse_effective_date),
                base_price: row.usu_prebas.map(RawValue::Text),
            }),
            _ => Err(row),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// 解析生效日期, 无法识别的格式视为缺失
pub fn parse_effective_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // 带时区后缀的时间戳 (postgres timestamptz 转文本)
    if let Ok(dt) = chrono::DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
