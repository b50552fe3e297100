// ==========================================
// 表格数据导入引擎 - Schema 层
// ==========================================
// 职责: 声明式列定义、可复用校验器、单行校验引擎
// 红线: 校验过程纯函数,不访问存储,不修改 Schema
// ==========================================

pub mod column;
pub mod error;
pub mod row_validator;
pub mod table_schema;
pub mod validator;
pub mod validators;

// 重导出核心类型
pub use column::Column;
pub use error::{SchemaError, ValidationError, ValidationErrorKind};
pub use table_schema::TableSchema;
pub use validator::{ValuePredicate, Validator};
pub use validators::{choices_validator, date_range_validator, length_validator, range_validator};
