// ==========================================
// 表格数据导入引擎 - 表格 Schema
// ==========================================
// 职责: 列存在性检查、外部标签 → 内部名重命名、单行校验入口
// 红线: name / label 在 Schema 内唯一；构建后不可变
// ==========================================

use crate::domain::table::TableError;
use crate::domain::{Row, Table};
use crate::schema::column::Column;
use crate::schema::error::{SchemaError, ValidationError};
use crate::schema::row_validator;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct TableSchema {
    columns: Vec<Column>,
}

impl TableSchema {
    /// 创建 Schema,拒绝重复的 name / label
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let mut names = HashSet::new();
        let mut labels = HashSet::new();
        for column in &columns {
            if !names.insert(column.name()) {
                return Err(SchemaError::DuplicateName(column.name().to_string()));
            }
            if !labels.insert(column.label()) {
                return Err(SchemaError::DuplicateLabel(column.label().to_string()));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// 检查 Schema 中所有列标签均出现在表格中
    ///
    /// 缺失列一次性全部列出
    pub fn validate_columns_present(&self, table: &Table) -> Result<(), SchemaError> {
        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !table.has_column(c.label()))
            .map(|c| c.label().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingColumns(missing))
        }
    }

    /// 外部标签 → 内部名；Schema 外的列原样保留
    pub fn rename_to_internal(&self, table: Table) -> Result<Table, TableError> {
        let mapping: HashMap<String, String> = self
            .columns
            .iter()
            .map(|c| (c.label().to_string(), c.name().to_string()))
            .collect();
        table.rename_columns(&mapping)
    }

    /// 校验单行（行已使用内部名）
    pub fn validate_row(&self, row: &Row) -> Vec<ValidationError> {
        row_validator::validate_row(&self.columns, row)
    }
}
