// ==========================================
// 表格数据导入引擎 - 校验器
// ==========================================
// 职责: 具名谓词 + 失败消息,可在多列/多 Schema 间共享
// ==========================================

use crate::domain::CellValue;
use crate::i18n::t;
use std::fmt;
use std::sync::Arc;

/// 单值谓词（策略对象）
///
/// 闭包 `Fn(&CellValue) -> bool` 自动实现
pub trait ValuePredicate: Send + Sync {
    fn test(&self, value: &CellValue) -> bool;
}

impl<F> ValuePredicate for F
where
    F: Fn(&CellValue) -> bool + Send + Sync,
{
    fn test(&self, value: &CellValue) -> bool {
        self(value)
    }
}

#[derive(Clone)]
pub struct Validator {
    name: String,
    predicate: Arc<dyn ValuePredicate>,
    message: String,
}

impl Validator {
    /// 创建校验器,默认消息为 "Invalid value"
    pub fn new<P>(name: impl Into<String>, predicate: P) -> Self
    where
        P: ValuePredicate + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            message: t("validation.invalid_value"),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn test(&self, value: &CellValue) -> bool {
        self.predicate.test(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
