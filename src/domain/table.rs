// ==========================================
// 表格数据导入引擎 - 表格与行
// ==========================================
// 职责: 有序列标签 + 有序行的二维表；按需生成单行视图
// 红线: 列标签唯一,每行长度与列数一致
// ==========================================

use crate::domain::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// 表格结构错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("列标签重复: {0}")]
    DuplicateColumn(String),

    #[error("第 {row} 行单元格数量为 {actual}，应为 {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

// ==========================================
// Table - 输入表格
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// 创建空表（仅列标签）
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Result<Self, TableError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        ensure_unique(&columns)?;
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// 由列标签与行数据创建表格
    pub fn from_rows<S: Into<String>>(
        columns: Vec<S>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowLength {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// 写入单元格；行或列不存在时返回 false
    pub fn set_cell(&mut self, row: usize, column: &str, value: CellValue) -> bool {
        let Some(col) = self.column_index(column) else {
            return false;
        };
        match self.rows.get_mut(row) {
            Some(cells) => {
                cells[col] = value;
                true
            }
            None => false,
        }
    }

    /// 追加一列并以 fill 填充；列已存在时整列重置为 fill
    pub fn add_column(&mut self, label: impl Into<String>, fill: CellValue) {
        let label = label.into();
        match self.column_index(&label) {
            Some(col) => {
                for row in &mut self.rows {
                    row[col] = fill.clone();
                }
            }
            None => {
                self.columns.push(label);
                for row in &mut self.rows {
                    row.push(fill.clone());
                }
            }
        }
    }

    /// 按映射表重命名列；映射外的列保持不变
    pub fn rename_columns(mut self, mapping: &HashMap<String, String>) -> Result<Self, TableError> {
        for column in &mut self.columns {
            if let Some(renamed) = mapping.get(column) {
                *column = renamed.clone();
            }
        }
        ensure_unique(&self.columns)?;
        Ok(self)
    }

    /// 对每个单元格应用转换
    pub fn map_cells<F>(&mut self, mut f: F)
    where
        F: FnMut(CellValue) -> CellValue,
    {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                *cell = f(std::mem::take(cell));
            }
        }
    }

    /// 第 index 行的视图（0-based）
    pub fn row(&self, index: usize) -> Option<Row> {
        let cells = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect(),
        )
    }

    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.rows.len()).filter_map(move |i| self.row(i))
    }
}

fn ensure_unique(columns: &[String]) -> Result<(), TableError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(TableError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}

// ==========================================
// Row - 单行视图（列名 -> 值）
// ==========================================
// 仅在处理单条记录期间存在
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<CellValue> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.fields.iter()
    }
}

impl FromIterator<(String, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
