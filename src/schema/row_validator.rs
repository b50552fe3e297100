// ==========================================
// 表格数据导入引擎 - 单行校验引擎
// ==========================================
// 规则（按列声明顺序）:
// 1. 按内部名取值；Null / 缺键 / 空文本 视为缺失
// 2. 缺失且必填 → RequiredValue,跳过该列后续检查
// 3. 存在 → 类型标签严格相等,不匹配 → TypeMismatch,跳过该列校验器
// 4. 类型正确 → 依次执行全部校验器,不短路,逐个收集失败
// 红线: 纯函数,无副作用
// ==========================================

use crate::domain::{CellValue, Row};
use crate::schema::column::Column;
use crate::schema::error::ValidationError;

/// 校验单行,返回全部校验错误（空表示通过）
pub fn validate_row<'a, I>(columns: I, row: &Row) -> Vec<ValidationError>
where
    I: IntoIterator<Item = &'a Column>,
{
    let mut errors = Vec::new();
    for column in columns {
        validate_column(column, row.get(column.name()), &mut errors);
    }
    errors
}

fn validate_column(column: &Column, value: Option<&CellValue>, errors: &mut Vec<ValidationError>) {
    let value = match value {
        Some(v) if !v.is_absent() => v,
        _ => {
            if column.is_required() {
                errors.push(ValidationError::required_value(column.label()));
            }
            return;
        }
    };

    // is_absent 已排除 Null,这里必有类型
    let Some(actual) = value.value_type() else {
        return;
    };
    if actual != column.value_type() {
        errors.push(ValidationError::type_mismatch(
            column.name(),
            column.label(),
            actual,
            column.value_type(),
        ));
        return;
    }

    for validator in column.validator_list() {
        if !validator.test(value) {
            errors.push(ValidationError::invalid_value(
                validator.message(),
                column.label(),
                value.clone(),
            ));
        }
    }
}
