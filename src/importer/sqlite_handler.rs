// ==========================================
// 表格数据导入引擎 - SQLite 行处理器
// ==========================================
// 职责: 将校验通过的行写入 import_row,全部成功后写入批次汇总
// 红线: 存储失败一律视为致命错误（中止并回滚）
// ==========================================

use crate::domain::Row;
use crate::i18n::t;
use crate::importer::error::RowError;
use crate::importer::import_hooks::RowHandler;
use crate::repository::{ImportBatchRecord, ImportBatchRepository};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct SqliteRowHandler {
    repo: ImportBatchRepository,
    batch_id: String,
    source_name: Option<String>,
    saved: usize,
}

impl SqliteRowHandler {
    /// 创建处理器（自动生成批次 ID）
    pub fn new(repo: ImportBatchRepository) -> Self {
        Self {
            repo,
            batch_id: Uuid::new_v4().to_string(),
            source_name: None,
            saved: 0,
        }
    }

    /// 记录数据来源（如文件名）
    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// 本次运行已写入的行数（回滚后不代表库中实际行数）
    pub fn saved_rows(&self) -> usize {
        self.saved
    }
}

impl RowHandler for SqliteRowHandler {
    fn save(&mut self, line: usize, row: &Row) -> Result<String, RowError> {
        self.repo.insert_row(&self.batch_id, line, row)?;
        self.saved += 1;
        debug!(batch_id = %self.batch_id, line, "行数据已写入");
        Ok(t("import.ok"))
    }

    fn finish_processing(&mut self) -> anyhow::Result<()> {
        let record = ImportBatchRecord {
            batch_id: self.batch_id.clone(),
            source_name: self.source_name.clone(),
            total_rows: self.saved as i64,
            imported_at: Utc::now(),
        };
        self.repo.insert_batch(&record)?;
        info!(batch_id = %self.batch_id, total_rows = self.saved, "批次汇总已写入");
        Ok(())
    }
}
