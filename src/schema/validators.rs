// ==========================================
// 表格数据导入引擎 - 常用校验器
// ==========================================

use crate::domain::CellValue;
use crate::i18n::{t, t_with_args};
use crate::schema::validator::Validator;
use chrono::NaiveDate;
use std::collections::HashSet;

/// 日期范围校验（开区间 begin < value < end）
///
/// Timestamp 取其日期部分比较
pub fn date_range_validator(begin: NaiveDate, end: NaiveDate) -> Validator {
    Validator::new("date_range", move |value: &CellValue| {
        value.as_date().is_some_and(|d| begin < d && d < end)
    })
    .with_message(t("validation.invalid_date_range"))
}

/// 可选值校验（文本精确匹配）
pub fn choices_validator<I, S>(choices: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let ordered: Vec<String> = choices.into_iter().map(Into::into).collect();
    let message = t_with_args("validation.value_not_in", &[("choices", &ordered.join(", "))]);
    let allowed: HashSet<String> = ordered.into_iter().collect();

    Validator::new("choices", move |value: &CellValue| {
        value.as_text().is_some_and(|s| allowed.contains(s))
    })
    .with_message(message)
}

/// 数值范围校验（闭区间,Integer / Float）
pub fn range_validator(min: f64, max: f64) -> Validator {
    Validator::new("range", move |value: &CellValue| {
        value.as_f64().is_some_and(|v| v >= min && v <= max)
    })
    .with_message(t_with_args(
        "validation.out_of_range",
        &[("min", &min.to_string()), ("max", &max.to_string())],
    ))
}

/// 文本长度校验（按字符计,闭区间）
pub fn length_validator(min: usize, max: usize) -> Validator {
    Validator::new("length", move |value: &CellValue| {
        value
            .as_text()
            .map(|s| s.chars().count())
            .is_some_and(|len| len >= min && len <= max)
    })
    .with_message(t_with_args(
        "validation.invalid_length",
        &[("min", &min.to_string()), ("max", &max.to_string())],
    ))
}
