use super::RawValue;
use serde::Serialize;
use sqlx::FromRow;

/// 包装表原始行 (usu_t075pro), 所有列在 SQL 中已转为文本
#[derive(Debug, Clone, FromRow)]
pub struct PackageRow {
    pub usu_codpro: Option<String>,
    pub usu_qtdpct: Option<String>,
    pub usu_kgpct: Option<String>,
}

/// 产品包装信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageRecord {
    pub product_code: String,
    pub packages_per_box: Option<RawValue>,
    pub package_weight: Option<RawValue>,
}

impl PackageRecord {
    pub fn new(
        product_code: impl Into<String>,
        packages_per_box: Option<RawValue>,
        package_weight: Option<RawValue>,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            packages_per_box,
            package_weight,
        }
    }
}

impl TryFrom<PackageRow> for PackageRecord {
    type Error = PackageRow;

    /// 产品编码为空的行无法参与关联, 原样返回给调用方计数
    fn try_from(row: PackageRow) -> Result<Self, Self::Error> {
        match row.usu_codpro {
            Some(code) => Ok(Self {
                product_code: code,
                packages_per_box: row.usu_qtdpct.map(RawValue::Text),
                package_weight: row.usu_kgpct.map(RawValue::Text),
            }),
            None => Err(row),
        }
    }
}
