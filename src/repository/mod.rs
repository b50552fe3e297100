// ==========================================
// 表格数据导入引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供导入数据访问与事务边界,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod import_batch_repo;
mod row_payload;
pub mod sqlite_transaction;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use import_batch_repo::{ImportBatchRecord, ImportBatchRepository};
pub use sqlite_transaction::SqliteTransaction;
