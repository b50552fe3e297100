// ==========================================
// 表格数据导入引擎 - 行数据存储格式
// ==========================================
// import_row.payload_json 使用带类型标签的 JSON:
//   {"name": {"type": "text", "value": "John Doe"}, "gender": {"type": "null"}}
// 读回时类型与写入时一致（"2020-01-01" 文本不会变成日期）
// ==========================================

use crate::domain::{CellValue, Row};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum StoredCell {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Text(String),
}

impl From<&CellValue> for StoredCell {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Null => StoredCell::Null,
            CellValue::Boolean(v) => StoredCell::Boolean(*v),
            CellValue::Integer(v) => StoredCell::Integer(*v),
            CellValue::Float(v) => StoredCell::Float(*v),
            CellValue::Timestamp(v) => StoredCell::Timestamp(*v),
            CellValue::Date(v) => StoredCell::Date(*v),
            CellValue::Text(v) => StoredCell::Text(v.clone()),
        }
    }
}

impl From<StoredCell> for CellValue {
    fn from(value: StoredCell) -> Self {
        match value {
            StoredCell::Null => CellValue::Null,
            StoredCell::Boolean(v) => CellValue::Boolean(v),
            StoredCell::Integer(v) => CellValue::Integer(v),
            StoredCell::Float(v) => CellValue::Float(v),
            StoredCell::Timestamp(v) => CellValue::Timestamp(v),
            StoredCell::Date(v) => CellValue::Date(v),
            StoredCell::Text(v) => CellValue::Text(v),
        }
    }
}

/// Row → 存储 JSON
pub(crate) fn encode_row(row: &Row) -> serde_json::Result<String> {
    let payload: BTreeMap<&str, StoredCell> = row
        .iter()
        .map(|(name, value)| (name.as_str(), StoredCell::from(value)))
        .collect();
    serde_json::to_string(&payload)
}

/// 存储 JSON → Row
pub(crate) fn decode_row(payload: &str) -> serde_json::Result<Row> {
    let stored: BTreeMap<String, StoredCell> = serde_json::from_str(payload)?;
    Ok(stored
        .into_iter()
        .map(|(name, cell)| (name, CellValue::from(cell)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_like_text_keeps_its_type() {
        let mut row = Row::new();
        row.insert("code", "2020-01-01");
        row.insert("birth_date", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        row.insert("gender", CellValue::Null);

        let decoded = decode_row(&encode_row(&row).unwrap()).unwrap();

        assert_eq!(decoded, row);
        assert_eq!(decoded.get("code"), Some(&CellValue::from("2020-01-01")));
    }

    #[test]
    fn test_payload_shape() {
        let mut row = Row::new();
        row.insert("n", 7_i64);

        assert_eq!(
            encode_row(&row).unwrap(),
            r#"{"n":{"type":"integer","value":7}}"#
        );
    }
}
