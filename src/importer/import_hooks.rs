// ==========================================
// 表格数据导入引擎 - 导入扩展点
// ==========================================
// 职责: 定义批处理器对外的可插拔接口（不包含业务实现）
// - RowHandler: 单行落库 + 全部成功后的收尾
// - TransactionScope: 事务开启/提交/回滚
// - ErrorReporter: 致命错误上报（可选,失败不影响导入结果）
// ==========================================

use crate::config::ImportConfig;
use crate::domain::Row;
use crate::i18n::t;
use crate::importer::error::RowError;
use tracing::error;

// ==========================================
// RowHandler Trait
// ==========================================
// 用途: 集成方实现逐行持久化
// 实现者: DefaultRowHandler, SqliteRowHandler
pub trait RowHandler {
    /// 保存一行已校验的数据
    ///
    /// # 参数
    /// - line: 行号（1-based,与报告一致）
    /// - row: 使用内部列名的行数据
    ///
    /// # 返回
    /// - Ok(String): 写入报告的状态（默认 "OK"）
    /// - Err(RowError::Process): 可恢复,记入报告后继续
    /// - Err(RowError::Fatal): 致命,中止剩余行并回滚
    fn save(&mut self, line: usize, row: &Row) -> Result<String, RowError> {
        let _ = (line, row);
        Ok(t("import.ok"))
    }

    /// 所有行成功后、提交前调用一次（如写入汇总记录）
    fn finish_processing(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<H: RowHandler + ?Sized> RowHandler for &mut H {
    fn save(&mut self, line: usize, row: &Row) -> Result<String, RowError> {
        (**self).save(line, row)
    }

    fn finish_processing(&mut self) -> anyhow::Result<()> {
        (**self).finish_processing()
    }
}

impl<H: RowHandler + ?Sized> RowHandler for Box<H> {
    fn save(&mut self, line: usize, row: &Row) -> Result<String, RowError> {
        (**self).save(line, row)
    }

    fn finish_processing(&mut self) -> anyhow::Result<()> {
        (**self).finish_processing()
    }
}

/// 默认处理器：不持久化,返回固定状态
#[derive(Debug, Clone)]
pub struct DefaultRowHandler {
    status: String,
}

impl DefaultRowHandler {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    /// 使用配置中的默认保存状态
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.default_save_status.as_str())
    }
}

impl Default for DefaultRowHandler {
    fn default() -> Self {
        Self::new(t("import.ok"))
    }
}

impl RowHandler for DefaultRowHandler {
    fn save(&mut self, _line: usize, _row: &Row) -> Result<String, RowError> {
        Ok(self.status.clone())
    }
}

// ==========================================
// TransactionScope Trait
// ==========================================
// 用途: 导入运行期间的事务边界
// 实现者: NoTransaction, SqliteTransaction
pub trait TransactionScope {
    fn begin(&mut self) -> anyhow::Result<()>;
    fn commit(&mut self) -> anyhow::Result<()>;
    fn rollback(&mut self) -> anyhow::Result<()>;
}

impl<T: TransactionScope + ?Sized> TransactionScope for &mut T {
    fn begin(&mut self) -> anyhow::Result<()> {
        (**self).begin()
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> anyhow::Result<()> {
        (**self).rollback()
    }
}

/// 无存储场景的空事务
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransaction;

impl TransactionScope for NoTransaction {
    fn begin(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

// ==========================================
// ErrorReporter Trait
// ==========================================
// 用途: 致命错误上报（崩溃收集服务等）
// 约束: 上报失败仅记录日志,不影响导入结果
pub trait ErrorReporter {
    fn capture(&self, error: &anyhow::Error) -> anyhow::Result<()>;
}

/// 将致命错误写入日志
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn capture(&self, err: &anyhow::Error) -> anyhow::Result<()> {
        error!(error = ?err, "导入致命错误");
        Ok(())
    }
}
