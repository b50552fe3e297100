// ==========================================
// 表格数据导入引擎 - 导入报告
// ==========================================
// 职责: 逐行结果日志 + 运行结果
// 红线: 行号从 1 开始且严格递增
// ==========================================

use serde::{Deserialize, Serialize};

/// 单行状态：成功消息 或 校验错误列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportStatus {
    Message(String),
    Errors(Vec<String>),
}

impl ReportStatus {
    pub fn is_errors(&self) -> bool {
        matches!(self, ReportStatus::Errors(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub line: usize,
    pub status: ReportStatus,
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportReport {
    entries: Vec<ReportEntry>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录
    ///
    /// 行号必须 >= 1 且大于上一条记录的行号
    pub(crate) fn push(&mut self, line: usize, status: ReportStatus) {
        debug_assert!(line >= 1, "report lines are 1-based");
        debug_assert!(
            self.entries.last().map_or(true, |last| last.line < line),
            "report lines must be strictly increasing"
        );
        self.entries.push(ReportEntry { line, status });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, line: usize) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.line == line)
    }

    /// 带校验错误的行数
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_errors()).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ==========================================
// RunResult - 一次导入运行的结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub succeeded: bool,
    pub error_occurred: bool,
    pub report: ImportReport,
    /// 运行级失败信息（致命错误 / 提交失败）
    pub failure: Option<String>,
}
