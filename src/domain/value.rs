// ==========================================
// 表格数据导入引擎 - 单元格值与语义类型
// ==========================================
// 红线: 类型判定只看枚举判别式,不做隐式转换
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 语义类型标签 (Value Type)
// ==========================================
// 列声明的期望类型,与 CellValue 的判别式一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    Timestamp,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Text => "Text",
            ValueType::Integer => "Integer",
            ValueType::Float => "Float",
            ValueType::Boolean => "Boolean",
            ValueType::Date => "Date",
            ValueType::Timestamp => "Timestamp",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 序列化格式: untagged（JSON 中直接落原始值）
// 变体顺序决定反序列化优先级,Text 必须放在最后
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Text(String),
}

impl CellValue {
    /// 语义类型（Null 无类型）
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            CellValue::Null => None,
            CellValue::Boolean(_) => Some(ValueType::Boolean),
            CellValue::Integer(_) => Some(ValueType::Integer),
            CellValue::Float(_) => Some(ValueType::Float),
            CellValue::Timestamp(_) => Some(ValueType::Timestamp),
            CellValue::Date(_) => Some(ValueType::Date),
            CellValue::Text(_) => Some(ValueType::Text),
        }
    }

    /// 是否视为"缺失"
    ///
    /// Null 与空文本视为缺失；0 / false 是有效值
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// 数值视图（Integer / Float）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// 日期视图（Date / Timestamp 的日期部分）
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Boolean(v) => write!(f, "{}", v),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Integer(value as i64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Timestamp(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_discriminator() {
        assert_eq!(CellValue::from("x").value_type(), Some(ValueType::Text));
        assert_eq!(CellValue::from(1_i64).value_type(), Some(ValueType::Integer));
        assert_eq!(CellValue::from(1.5_f64).value_type(), Some(ValueType::Float));
        assert_eq!(CellValue::Null.value_type(), None);

        let ts = NaiveDate::from_ymd_opt(1960, 6, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::from(ts).value_type(), Some(ValueType::Timestamp));
    }

    #[test]
    fn test_is_absent() {
        assert!(CellValue::Null.is_absent());
        assert!(CellValue::from("").is_absent());
        assert!(!CellValue::from(" ").is_absent());
        // 0 / false 不是缺失值
        assert!(!CellValue::from(0_i64).is_absent());
        assert!(!CellValue::from(false).is_absent());
    }

    #[test]
    fn test_from_option() {
        let none: Option<i64> = None;
        assert_eq!(CellValue::from(none), CellValue::Null);
        assert_eq!(CellValue::from(Some("M")), CellValue::Text("M".to_string()));
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            CellValue::Null,
            CellValue::from(3_i64),
            CellValue::from("Doe"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,3,"Doe"]"#);
    }
}
