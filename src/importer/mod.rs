// ==========================================
// 表格数据导入引擎 - 导入层
// ==========================================
// 职责: 外部表格 → 预处理 → 逐行校验/落库 → 整体提交或回滚
// 支持: Excel, CSV, 代码构建的表格
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod import_hooks;
pub mod processor;
pub mod sqlite_handler;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult, ProcessException, RowError};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use import_hooks::{
    DefaultRowHandler, ErrorReporter, NoTransaction, RowHandler, TracingErrorReporter,
    TransactionScope,
};
pub use processor::{ProcessorBuilder, ProcessorState, TableProcessor};
pub use sqlite_handler::SqliteRowHandler;
