// ==========================================
// 表格数据导入引擎 - 导入配置
// ==========================================
// 职责: 定义导入所需配置项、默认值与读取接口
// 红线: 不包含配置写入
// ==========================================

use crate::i18n::t;
use serde::{Deserialize, Serialize};

/// 默认空值标记（仅非数字标记；"NA" / "None" 等可能是真实文本）
pub const DEFAULT_NULL_SENTINELS: &[&str] = &["NaN", "nan", "-NaN"];

/// 扩展空值标记（常见表格工具导出的空值写法），需通过配置显式启用
pub const EXTENDED_NULL_SENTINELS: &[&str] = &[
    "NaN", "nan", "-NaN", "NULL", "null", "None", "N/A", "n/a", "NA", "<NA>", "#N/A",
];

// ==========================================
// ImportConfig - 导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 逐行状态列名
    pub status_column: String,
    /// 视为空值的文本标记（TRIM 后精确匹配）
    pub null_sentinels: Vec<String>,
    /// 默认 save 返回的状态
    pub default_save_status: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            status_column: t("import.status_column"),
            null_sentinels: DEFAULT_NULL_SENTINELS.iter().map(|s| s.to_string()).collect(),
            default_save_status: t("import.ok"),
        }
    }
}

impl ImportConfig {
    /// 启用扩展空值标记（"NULL" / "N/A" / "NA" 等）
    pub fn with_extended_null_sentinels(mut self) -> Self {
        self.null_sentinels = EXTENDED_NULL_SENTINELS.iter().map(|s| s.to_string()).collect();
        self
    }

    /// 从配置读取器加载完整配置
    pub fn load(reader: &dyn ImportConfigReader) -> anyhow::Result<Self> {
        Ok(Self {
            status_column: reader.get_status_column()?,
            null_sentinels: reader.get_null_sentinels()?,
            default_save_status: reader.get_default_save_status()?,
        })
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader {
    /// 获取逐行状态列名
    ///
    /// # 默认值
    /// - "Import Status"
    fn get_status_column(&self) -> anyhow::Result<String>;

    /// 获取空值标记列表
    ///
    /// # 默认值
    /// - DEFAULT_NULL_SENTINELS
    fn get_null_sentinels(&self) -> anyhow::Result<Vec<String>>;

    /// 获取默认 save 状态
    ///
    /// # 默认值
    /// - "OK"
    fn get_default_save_status(&self) -> anyhow::Result<String>;
}
