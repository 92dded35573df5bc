use serde::{Serialize, Serializer};
use std::fmt;

/// 源表中的原始取值 (保留数据库里的表示形式, 展示时原样输出)
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// 转换为数值, 无法解析时返回 None
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) if v.is_nan() => None,
            RawValue::Number(v) => Some(*v),
            RawValue::Text(s) => crate::service::number::parse_number(s),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(v) => write!(f, "{}", v),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawValue::Number(v) => serializer.serialize_f64(*v),
            RawValue::Text(s) => serializer.serialize_str(s),
        }
    }
}
