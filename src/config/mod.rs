// ==========================================
// 表格数据导入引擎 - 配置层
// ==========================================
// 职责: 导入配置读取,支持 config_kv 表覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use import_config::{
    ImportConfig, ImportConfigReader, DEFAULT_NULL_SENTINELS, EXTENDED_NULL_SENTINELS,
};
