// ==========================================
// 表格数据导入引擎 - 文件解析器实现
// ==========================================
// 职责: 文件 → Table（首行为表头）
// 支持: Excel (.xlsx/.xls/.ods) / CSV (.csv)
// 规则: 完全空白的行跳过；单元格按原始类型落入 CellValue
// ==========================================

use crate::domain::{CellValue, Table};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// 文件解析接口
pub trait FileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<Table>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ImportError::FileNotFound(path.display().to_string()))
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 由表头与原始行构建 Table（短行补 Null,多余单元格丢弃）
fn build_table(headers: Vec<String>, raw_rows: Vec<Vec<CellValue>>) -> ImportResult<Table> {
    let headers = normalize_headers(headers);
    let width = headers.len();
    let mut table = Table::new(headers)?;
    for mut cells in raw_rows {
        // 跳过完全空白的行
        if cells.iter().all(CellValue::is_absent) {
            continue;
        }
        cells.resize(width, CellValue::Null);
        table.push_row(cells)?;
    }
    Ok(table)
}

/// 表头整理: 去空白；末尾空表头列丢弃；中间空表头命名为 "Unnamed: {列序号}"
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    while headers.last().is_some_and(|h| h.is_empty()) {
        headers.pop();
    }
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, h)| if h.is_empty() { format!("Unnamed: {}", idx) } else { h })
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ==========================================
// CSV Parser 实现
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    /// 按时间戳解析的列（外部标签）
    date_columns: HashSet<String>,
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// 单元格类型推断: Integer → Float → Boolean → Text
    ///
    /// 日期列: 可解析则为 Timestamp,否则保留文本交由 Schema 判定
    pub fn infer_cell(&self, column: &str, raw: &str) -> CellValue {
        let raw = raw.trim();
        if raw.is_empty() {
            return CellValue::Null;
        }
        if self.date_columns.contains(column) {
            return parse_timestamp(raw)
                .map(CellValue::Timestamp)
                .unwrap_or_else(|| CellValue::from(raw));
        }
        if let Ok(v) = raw.parse::<i64>() {
            return CellValue::Integer(v);
        }
        // "inf" / "NaN" 等非有限值保留为文本
        if let Some(v) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
            return CellValue::Float(v);
        }
        match raw {
            "true" | "True" | "TRUE" => CellValue::Boolean(true),
            "false" | "False" | "FALSE" => CellValue::Boolean(false),
            _ => CellValue::from(raw),
        }
    }
}

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<Table> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !ext.is_empty() && ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut raw_rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let cells: Vec<CellValue> = record
                .iter()
                .zip(headers.iter())
                .map(|(value, header)| self.infer_cell(header, value))
                .collect();
            raw_rows.push(cells);
        }

        debug!(file = %file_path.display(), rows = raw_rows.len(), "CSV 解析完成");
        build_table(headers, raw_rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelParser;

impl ExcelParser {
    /// 工作表区域 → Table（首行为表头）
    pub fn table_from_range(range: &Range<Data>) -> ImportResult<Table> {
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();

        let raw_rows: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(Self::convert_cell).collect())
            .collect();

        build_table(headers, raw_rows)
    }

    /// calamine 单元格 → CellValue
    ///
    /// 整数值的浮点单元格（Excel 内部均以浮点存储）还原为 Integer
    pub fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Null,
            Data::Int(v) => CellValue::Integer(*v),
            Data::Float(v) => {
                if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                    CellValue::Integer(*v as i64)
                } else {
                    CellValue::Float(*v)
                }
            }
            Data::Bool(v) => CellValue::Boolean(*v),
            Data::String(s) => CellValue::from(s.trim()),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(CellValue::Timestamp)
                .unwrap_or(CellValue::Null),
            Data::DateTimeIso(s) => parse_timestamp(s)
                .map(CellValue::Timestamp)
                .unwrap_or_else(|| CellValue::from(s.as_str())),
            Data::DurationIso(s) => CellValue::from(s.as_str()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<Table> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !matches!(ext.as_str(), "xlsx" | "xls" | "xlsm" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let table = Self::table_from_range(&range)?;
        debug!(file = %file_path.display(), sheet = %sheet_name, rows = table.len(), "Excel 解析完成");
        Ok(table)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct UniversalFileParser {
    csv: CsvParser,
    excel: ExcelParser,
}

impl UniversalFileParser {
    pub fn new(csv: CsvParser) -> Self {
        Self {
            csv,
            excel: ExcelParser,
        }
    }
}

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<Table> {
        match extension_of(file_path).as_str() {
            "csv" => self.csv.parse(file_path),
            "xlsx" | "xls" | "xlsm" | "ods" => self.excel.parse(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
