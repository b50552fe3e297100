// ==========================================
// 表格数据导入引擎 - 核心库
// ==========================================
// 职责: 基于声明式 Schema 校验表格数据，逐行导入并整体提交/回滚
// 技术栈: Rust + SQLite (rusqlite)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 单元格值 / 表格 / 导入报告
pub mod domain;

// Schema 层 - 列定义 / 校验器 / 行校验引擎
pub mod schema;

// 导入层 - 预处理 / 文件解析 / 批处理器
pub mod importer;

// 数据仓储层 - SQLite 存储与事务
pub mod repository;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{CellValue, ImportReport, ReportEntry, ReportStatus, Row, RunResult, Table, ValueType};

// Schema
pub use schema::{Column, TableSchema, ValidationError, ValidationErrorKind, Validator};

// 导入
pub use importer::{
    DefaultRowHandler, ErrorReporter, ImportError, ImportResult, NoTransaction, ProcessException,
    ProcessorState, RowError, RowHandler, TableProcessor, TransactionScope,
};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
