// ==========================================
// 表格数据导入引擎 - 数据清洗器
// ==========================================
// 职责: TRIM / NULL 标准化
// 规则: 文本去除首尾空白；空文本、空值标记、NaN 统一为 Null
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{CellValue, Table};
use std::collections::HashSet;

pub struct DataCleaner {
    null_sentinels: HashSet<String>,
}

impl DataCleaner {
    pub fn new<I, S>(null_sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            null_sentinels: null_sentinels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.null_sentinels.iter().cloned())
    }

    /// 清洗文本字段（TRIM）
    pub fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 标准化 NULL 值（空字符串/空白/空值标记 → None）
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() || self.null_sentinels.contains(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 清洗单个单元格
    pub fn clean_cell(&self, value: CellValue) -> CellValue {
        match value {
            CellValue::Text(s) => self.normalize_null(Some(s)).into(),
            CellValue::Float(f) if f.is_nan() => CellValue::Null,
            other => other,
        }
    }

    /// 清洗整张表格
    pub fn clean_table(&self, table: &mut Table) {
        table.map_cells(|cell| self.clean_cell(cell));
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}
