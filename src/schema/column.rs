// ==========================================
// 表格数据导入引擎 - 列定义
// ==========================================
// 构建完成后不可变；name 为内部名,label 为输入表格中的外部标签
// ==========================================

use crate::domain::ValueType;
use crate::schema::validator::Validator;

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    label: String,
    value_type: ValueType,
    required: bool,
    validators: Vec<Validator>,
}

impl Column {
    /// 创建列定义（默认必填,无校验器）
    pub fn new(name: impl Into<String>, label: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value_type,
            required: true,
            validators: Vec::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// 追加校验器（按追加顺序执行）
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn validator_list(&self) -> &[Validator] {
        &self.validators
    }
}
