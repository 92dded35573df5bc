use crate::models::{ConsolidatedRow, PackageRecord, PriceLine, PriceTable, RawValue};
use crate::service::number::format_brl;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// 占位价格: 上游系统用 9.999,99 表示"未定价", 只展示不参与计算
pub const PLACEHOLDER_PRICE: f64 = 9999.99;
const PLACEHOLDER_TOLERANCE: f64 = 1e-6;

/// 价格表构建器
///
/// 输入为包装表和价格明细表的完整快照, 对指定价格表输出
/// 每个产品一行的合并结果. 纯函数, 相同输入得到相同输出.
pub struct PriceTableBuilder<'a> {
    packages: &'a [PackageRecord],
    price_lines: &'a [PriceLine],
}

impl<'a> PriceTableBuilder<'a> {
    pub fn new(packages: &'a [PackageRecord], price_lines: &'a [PriceLine]) -> Self {
        Self {
            packages,
            price_lines,
        }
    }

    /// 价格明细中出现过的价格表编号 (去重, 升序)
    pub fn available_table_ids(&self) -> Vec<String> {
        self.price_lines
            .iter()
            .map(|line| line.price_table_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// 构建单张价格表
    ///
    /// `include_unpriced = true` 时保留没有价格的产品 (左连接),
    /// 否则只保留有价格的产品 (内连接).
    pub fn build(&self, price_table_id: &str, include_unpriced: bool) -> PriceTable {
        let latest = self.latest_prices(price_table_id);

        let mut rows: Vec<ConsolidatedRow> = self
            .unique_packages()
            .into_values()
            .filter_map(|package| {
                let line = latest.get(package.product_code.as_str()).copied();
                if line.is_none() && !include_unpriced {
                    return None;
                }
                Some(consolidate(package, line))
            })
            .collect();

        rows.sort_by(|a, b| a.product_code.cmp(&b.product_code));

        tracing::debug!(
            "价格表 {}: {} 个产品 (include_unpriced={})",
            price_table_id,
            rows.len(),
            include_unpriced
        );

        PriceTable {
            price_table_id: price_table_id.to_string(),
            rows,
        }
    }

    /// 每个产品取生效日期最新的一条价格
    ///
    /// 日期相同时保留数据集中先出现的一条. 若该价格表下所有明细都没有
    /// 有效日期, 则按产品编码排序后取每个产品的第一条.
    fn latest_prices(&self, price_table_id: &str) -> IndexMap<&'a str, &'a PriceLine> {
        let mut selected: Vec<&'a PriceLine> = self
            .price_lines
            .iter()
            .filter(|line| line.price_table_id == price_table_id)
            .collect();

        let mut latest: IndexMap<&'a str, &'a PriceLine> = IndexMap::new();

        if selected.iter().any(|line| line.effective_date.is_some()) {
            for line in selected {
                let Some(date) = line.effective_date else {
                    continue;
                };
                match latest.entry(line.product_code.as_str()) {
                    Entry::Occupied(mut entry) => {
                        if Some(date) > entry.get().effective_date {
                            entry.insert(line);
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(line);
                    }
                }
            }
        } else {
            selected.sort_by(|a, b| a.product_code.cmp(&b.product_code));
            for line in selected {
                latest.entry(line.product_code.as_str()).or_insert(line);
            }
        }

        latest
    }

    /// 包装表去重: 按产品编码排序后保留第一条
    fn unique_packages(&self) -> IndexMap<&'a str, &'a PackageRecord> {
        let mut sorted: Vec<&'a PackageRecord> = self.packages.iter().collect();
        sorted.sort_by(|a, b| a.product_code.cmp(&b.product_code));

        let mut unique = IndexMap::with_capacity(sorted.len());
        for package in sorted {
            unique.entry(package.product_code.as_str()).or_insert(package);
        }
        unique
    }
}

/// 占位价格在计算中按 0 处理
fn price_for_calc(raw: f64) -> f64 {
    if (raw - PLACEHOLDER_PRICE).abs() < PLACEHOLDER_TOLERANCE {
        0.0
    } else {
        raw
    }
}

fn consolidate(package: &PackageRecord, line: Option<&PriceLine>) -> ConsolidatedRow {
    let per_box = package
        .packages_per_box
        .as_ref()
        .and_then(RawValue::as_number);
    let raw_price = line
        .and_then(|l| l.base_price.as_ref())
        .and_then(RawValue::as_number);

    let box_price = raw_price
        .map(price_for_calc)
        .zip(per_box)
        .map(|(price, qty)| price * qty);

    ConsolidatedRow {
        product_code: package.product_code.clone(),
        package_price: raw_price.and_then(format_brl),
        packages_per_box: package.packages_per_box.clone(),
        box_price: box_price.and_then(format_brl),
        package_weight: package.package_weight.clone(),
    }
}
