// ==========================================
// 表格数据导入引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config::{ImportConfig, ImportConfigReader};
use crate::db::{init_import_schema, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const STATUS_COLUMN: &str = "import_status_column";
    pub const NULL_SENTINELS: &str = "import_null_sentinels";
    pub const DEFAULT_SAVE_STATUS: &str = "import_default_save_status";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
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

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global 配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_config_or_else<F>(&self, key: &str, default: F) -> RepositoryResult<String>
    where
        F: FnOnce() -> String,
    {
        Ok(self.get_config_value(key)?.unwrap_or_else(default))
    }

    /// 读取完整导入配置
    pub fn load_import_config(&self) -> anyhow::Result<ImportConfig> {
        ImportConfig::load(self)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_status_column(&self) -> anyhow::Result<String> {
        Ok(self.get_config_or_else(config_keys::STATUS_COLUMN, || {
            ImportConfig::default().status_column
        })?)
    }

    fn get_null_sentinels(&self) -> anyhow::Result<Vec<String>> {
        let Some(raw) = self.get_config_value(config_keys::NULL_SENTINELS)? else {
            return Ok(ImportConfig::default().null_sentinels);
        };

        // 配置格式为 JSON 数组: ["NaN", "NULL"]
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(sentinels) => Ok(sentinels),
            Err(e) => {
                tracing::warn!(
                    config_key = config_keys::NULL_SENTINELS,
                    raw_value = %raw,
                    error = %e,
                    "空值标记配置格式错误，使用默认配置"
                );
                Ok(ImportConfig::default().null_sentinels)
            }
        }
    }

    fn get_default_save_status(&self) -> anyhow::Result<String> {
        Ok(self.get_config_or_else(config_keys::DEFAULT_SAVE_STATUS, || {
            ImportConfig::default().default_save_status
        })?)
    }
}
