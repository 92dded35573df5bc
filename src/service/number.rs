//! 数值解析与巴西雷亚尔格式化
//!
//! 源表中的数量和价格可能是数字, 也可能是带千分位的文本
//! (如 "1.234,56" 或 "1234,56"), 这里统一转换为 f64.

/// 解析数值文本, 失败时返回 None (不会 panic)
///
/// 规则:
/// 1. 去掉所有空白 (含不换行空格)
/// 2. 同时包含 '.' 和 ',' 时, '.' 为千分位, ',' 为小数点
/// 3. 只有一个 ',' 且没有 '.' 时, ',' 为小数点
/// 4. 其余情况下 ',' 视为千分位并去掉
pub fn parse_number(text: &str) -> Option<f64> {
    let s: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return None;
    }

    let normalized = if s.contains('.') && s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else if s.matches(',').count() == 1 && !s.contains('.') {
        s.replace(',', ".")
    } else {
        s.replace(',', "")
    };

    normalized.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// 格式化为 "R$ 1.234,56", NaN 或无穷大返回 None
pub fn format_brl(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let fixed = format!("{:.2}", value);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    Some(format!(
        "R$ {}{},{}",
        sign,
        group_thousands(int_part),
        frac_part
    ))
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
