// ==========================================
// 表格数据导入引擎 - 导入模块错误类型
// ==========================================
// ImportError: 返回给调用方的错误（构建期/文件读取/事务开启）
// ProcessException: 单行可恢复错误（记入报告,继续下一行）
// RowError: 单行处理结果的错误分类（可恢复 / 致命）
// ==========================================

use crate::domain::table::TableError;
use crate::repository::error::RepositoryError;
use crate::schema::error::{SchemaError, ValidationError};
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表格/Schema 错误 =====
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("表格结构错误: {0}")]
    Table(#[from] TableError),

    #[error("状态列与已有列重名: {0}")]
    StatusColumnConflict(String),

    // ===== 运行错误 =====
    #[error("数据库事务失败: {0}")]
    Transaction(String),

    #[error("导入已执行，处理器不可重复运行")]
    AlreadyProcessed,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

// ==========================================
// ProcessException - 单行可恢复错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .messages.join("; "))]
pub struct ProcessException {
    messages: Vec<String>,
}

impl ProcessException {
    pub fn new<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// 由校验错误构造（逐条转为字符串）
    pub fn from_errors(errors: &[ValidationError]) -> Self {
        Self::new(errors.iter().map(ToString::to_string))
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

// ==========================================
// RowError - 单行处理错误分类
// ==========================================
#[derive(Error, Debug)]
pub enum RowError {
    /// 可恢复：记入报告,继续下一行
    #[error(transparent)]
    Process(#[from] ProcessException),

    /// 致命：中止剩余行,整体回滚
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl RowError {
    pub fn fatal(message: impl std::fmt::Display) -> Self {
        RowError::Fatal(anyhow::anyhow!("{}", message))
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, RowError::Process(_))
    }
}

// 存储层错误一律视为致命
impl From<RepositoryError> for RowError {
    fn from(err: RepositoryError) -> Self {
        RowError::Fatal(err.into())
    }
}
