// ==========================================
// 表格数据导入引擎 - 日志初始化
// ==========================================
// 库本身只产生 tracing 事件；宿主程序按需选择一种输出格式
// 过滤规则优先取 RUST_LOG,未设置时使用 DEFAULT_DIRECTIVE
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的过滤规则
pub const DEFAULT_DIRECTIVE: &str = "table_import=info";

fn env_filter_or(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// 人类可读格式（终端 / 开发环境）
///
/// ```no_run
/// table_import::logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter_or(DEFAULT_DIRECTIVE))
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// JSON 行格式（接入日志采集）
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(env_filter_or(DEFAULT_DIRECTIVE))
        .with_current_span(true)
        .init();
}

/// 测试用: debug 级别,输出交给测试框架捕获；可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(env_filter_or("table_import=debug"))
        .with_test_writer()
        .try_init();
}
