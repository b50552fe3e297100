// ==========================================
// 表格数据导入引擎 - 消息本地化
// ==========================================
// 文案位于 locales/*.yml（en 为回退语言）；宏在 lib.rs 中注册
// 占位符写法: %{name}
// ==========================================

/// 当前全局语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换全局语言（"en" / "zh-CN"），影响之后创建的 Schema 与配置默认值
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 按全局语言查找文案
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

pub fn t_in(key: &str, locale: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 查找文案并填充占位符
///
/// ```no_run
/// use table_import::i18n::t_with_args;
/// let msg = t_with_args("import.missing_columns", &[("columns", "Name*")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    interpolate(t(key), args)
}

fn interpolate(template: String, args: &[(&str, &str)]) -> String {
    args.iter().fold(template, |acc, (name, value)| {
        acc.replace(&format!("%{{{name}}}"), value)
    })
}
