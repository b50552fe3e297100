// ==========================================
// 表格数据导入引擎 - Schema 错误类型
// ==========================================
// SchemaError: 构建/列检查阶段的致命错误
// ValidationError: 单行校验的可恢复缺陷（汇总进报告,不单独抛出）
// ==========================================

use crate::domain::{CellValue, ValueType};
use crate::i18n::{t, t_with_args};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Schema 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Schema 列名重复: {0}")]
    DuplicateName(String),

    #[error("Schema 列标签重复: {0}")]
    DuplicateLabel(String),

    #[error("{}", missing_columns_message(.0))]
    MissingColumns(Vec<String>),
}

fn missing_columns_message(labels: &[String]) -> String {
    t_with_args("import.missing_columns", &[("columns", &labels.join(", "))])
}

// ==========================================
// 校验错误
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    /// 必填值缺失
    RequiredValue,
    /// 类型不匹配（严格相等,不做转换）
    TypeMismatch {
        actual: ValueType,
        expected: ValueType,
    },
    /// 校验器未通过
    InvalidValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    /// 列的外部标签
    pub column: Option<String>,
    pub field_value: Option<CellValue>,
}

impl ValidationError {
    pub fn required_value(label: &str) -> Self {
        Self {
            kind: ValidationErrorKind::RequiredValue,
            message: t("validation.required_value"),
            column: Some(label.to_string()),
            field_value: None,
        }
    }

    pub fn type_mismatch(name: &str, label: &str, actual: ValueType, expected: ValueType) -> Self {
        Self {
            kind: ValidationErrorKind::TypeMismatch { actual, expected },
            message: t_with_args(
                "validation.incorrect_type",
                &[
                    ("name", name),
                    ("actual", actual.as_str()),
                    ("expected", expected.as_str()),
                ],
            ),
            column: Some(label.to_string()),
            field_value: None,
        }
    }

    pub fn invalid_value(message: &str, label: &str, value: CellValue) -> Self {
        Self {
            kind: ValidationErrorKind::InvalidValue,
            message: message.to_string(),
            column: Some(label.to_string()),
            field_value: Some(value),
        }
    }

    /// 无列归属的错误
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::InvalidValue,
            message: message.into(),
            column: None,
            field_value: None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "{} - {}", column, self.message),
            None => write!(f, "Error: {}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}
