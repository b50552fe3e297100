// ==========================================
// 表格数据导入引擎 - SQLite 事务边界
// ==========================================
// 与 ImportBatchRepository 共享同一连接；BEGIN / COMMIT / ROLLBACK
// 作用于连接级事务,期间的所有写入同进同退
// ==========================================

use crate::importer::import_hooks::TransactionScope;
use crate::repository::error::RepositoryError;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct SqliteTransaction {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTransaction {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn execute(&self, sql: &str) -> Result<(), RepositoryError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute_batch(sql)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    /// 连接当前是否处于事务中
    pub fn is_active(&self) -> bool {
        self.conn
            .lock()
            .map(|conn| !conn.is_autocommit())
            .unwrap_or(false)
    }
}

impl TransactionScope for SqliteTransaction {
    fn begin(&mut self) -> anyhow::Result<()> {
        Ok(self.execute("BEGIN IMMEDIATE")?)
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        Ok(self.execute("COMMIT")?)
    }

    fn rollback(&mut self) -> anyhow::Result<()> {
        Ok(self.execute("ROLLBACK")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Arc<Mutex<Connection>>, SqliteTransaction) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER)").unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let tx = SqliteTransaction::new(Arc::clone(&conn));
        (conn, tx)
    }

    fn count(conn: &Arc<Mutex<Connection>>) -> i64 {
        conn.lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_rollback_discards_writes() {
        let (conn, mut tx) = setup();
        tx.begin().unwrap();
        assert!(tx.is_active());
        conn.lock().unwrap().execute("INSERT INTO t VALUES (1)", []).unwrap();
        tx.rollback().unwrap();

        assert!(!tx.is_active());
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn test_commit_keeps_writes() {
        let (conn, mut tx) = setup();
        tx.begin().unwrap();
        conn.lock().unwrap().execute("INSERT INTO t VALUES (1)", []).unwrap();
        tx.commit().unwrap();

        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn test_nested_begin_fails() {
        let (_conn, mut tx) = setup();
        tx.begin().unwrap();
        assert!(tx.begin().is_err());
    }
}
