// ==========================================
// 表格数据导入引擎 - 领域模型层
// ==========================================
// 职责: 定义单元格值、语义类型、表格、行与导入报告
// 红线: 不含数据访问逻辑,不含校验逻辑
// ==========================================

pub mod report;
pub mod table;
pub mod value;

// 重导出核心类型
pub use report::{ImportReport, ReportEntry, ReportStatus, RunResult};
pub use table::{Row, Table};
pub use value::{CellValue, ValueType};
