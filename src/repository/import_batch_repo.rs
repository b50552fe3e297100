// ==========================================
// 表格数据导入引擎 - 导入批次 Repository
// ==========================================
// 职责: 逐行数据落库（import_row）与批次汇总（import_batch）
// 红线: 不自行开启事务,事务边界由 SqliteTransaction 管理
// ==========================================

use crate::db::{init_import_schema, open_sqlite_connection};
use crate::domain::Row;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_payload::{decode_row, encode_row};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// 批次汇总记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatchRecord {
    pub batch_id: String,
    pub source_name: Option<String>,
    pub total_rows: i64,
    pub imported_at: DateTime<Utc>,
}

// ==========================================
// ImportBatchRepository
// ==========================================
#[derive(Clone)]
pub struct ImportBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepository {
    /// 打开数据库并确保导入表存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_import_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 SqliteTransaction 共享同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入单行数据（JSON）
    pub fn insert_row(&self, batch_id: &str, line: usize, row: &Row) -> RepositoryResult<()> {
        let payload = encode_row(row)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO import_row (batch_id, line, payload_json) VALUES (?1, ?2, ?3)",
            params![batch_id, line as i64, payload],
        )?;
        Ok(())
    }

    /// 写入批次汇总
    pub fn insert_batch(&self, batch: &ImportBatchRecord) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_batch (batch_id, source_name, total_rows, imported_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                batch.batch_id,
                batch.source_name,
                batch.total_rows,
                batch.imported_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatchRecord>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT batch_id, source_name, total_rows, imported_at FROM import_batch WHERE batch_id = ?1",
                params![batch_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((batch_id, source_name, total_rows, imported_at)) = raw else {
            return Ok(None);
        };
        Ok(Some(ImportBatchRecord {
            batch_id,
            source_name,
            total_rows,
            imported_at: parse_imported_at(&imported_at)?,
        }))
    }

    /// 全部批次汇总（按导入时间倒序）
    pub fn list_batches(&self) -> RepositoryResult<Vec<ImportBatchRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, source_name, total_rows, imported_at
            FROM import_batch
            ORDER BY imported_at DESC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut batches = Vec::new();
        for row in rows {
            let (batch_id, source_name, total_rows, imported_at) = row?;
            batches.push(ImportBatchRecord {
                batch_id,
                source_name,
                total_rows,
                imported_at: parse_imported_at(&imported_at)?,
            });
        }
        Ok(batches)
    }

    /// 某批次已落库行数
    pub fn count_rows(&self, batch_id: &str) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM import_row WHERE batch_id = ?1",
            params![batch_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 全部批次已落库行数
    pub fn count_all_rows(&self) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM import_row", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 按行号顺序读取某批次的行数据
    pub fn list_rows(&self, batch_id: &str) -> RepositoryResult<Vec<(usize, Row)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT line, payload_json FROM import_row WHERE batch_id = ?1 ORDER BY line",
        )?;
        let rows = stmt.query_map(params![batch_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (line, payload) = row?;
            result.push((line as usize, decode_row(&payload)?));
        }
        Ok(result)
    }
}

fn parse_imported_at(raw: &str) -> RepositoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}
