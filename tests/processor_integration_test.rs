// ==========================================
// TableProcessor 集成测试
// ==========================================
// 测试目标: 预处理、逐行校验、错误分类与整体提交/回滚
// ==========================================


use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use table_import::config::ImportConfig;
use table_import::importer::{ProcessorState, RowError, RowHandler};
use table_import::logging;
use table_import::schema::{Column, SchemaError, TableSchema, ValidationErrorKind};
use table_import::{
    CellValue, ErrorReporter, ImportError, NoTransaction, ReportStatus, Row, Table,
    TableProcessor, ValueType,
};
use test_helpers::{birth, person_schema, person_table};

/// 记录 save 调用,指定行号触发致命错误
#[derive(Default)]
struct RecordingHandler {
    saved: Vec<usize>,
    fatal_on: Option<usize>,
    finished: usize,
}

impl RowHandler for RecordingHandler {
    fn save(&mut self, line: usize, _row: &Row) -> Result<String, RowError> {
        if self.fatal_on == Some(line) {
            return Err(RowError::fatal("storage unavailable"));
        }
        self.saved.push(line);
        Ok("OK".to_string())
    }

    fn finish_processing(&mut self) -> anyhow::Result<()> {
        self.finished += 1;
        Ok(())
    }
}

struct CountingReporter(Arc<AtomicUsize>);

impl ErrorReporter for CountingReporter {
    fn capture(&self, _err: &anyhow::Error) -> anyhow::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("reporter offline")
    }
}

fn valid_person(name: &str, document: i64) -> Vec<CellValue> {
    vec![name.into(), document.into(), birth(1990, 5, 17), "M".into()]
}

#[test]
fn test_schema_less_run_reports_every_row() {
    logging::init_test();

    let table = Table::from_rows(
        vec!["0", "1", "2"],
        vec![
            vec![1_i64.into(), 2_i64.into(), 3_i64.into()],
            vec![4_i64.into(), 5_i64.into(), 6_i64.into()],
        ],
    )
    .unwrap();
    let mut processor = TableProcessor::new(table).unwrap();

    let result = processor.process(&mut NoTransaction).unwrap();

    assert!(result.succeeded);
    assert_eq!(result.report.len(), 2);
    for (i, entry) in result.report.entries().iter().enumerate() {
        assert_eq!(entry.line, i + 1);
        assert_eq!(entry.status, ReportStatus::Message("OK".to_string()));
    }
}

#[test]
fn test_missing_required_value_fails_run() {
    logging::init_test();

    let schema = person_schema();
    let mut row = Row::new();
    row.insert("name", "John Doe");
    row.insert("birth_date", birth(1990, 5, 17));
    let errors = schema.validate_row(&row);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::RequiredValue);
    assert_eq!(errors[0].column.as_deref(), Some("Document*"));

    let table = person_table(vec![vec![
        "John Doe".into(),
        CellValue::Null,
        birth(1990, 5, 17),
        CellValue::Null,
    ]]);
    let mut processor = TableProcessor::builder(table)
        .schema(schema)
        .build()
        .unwrap();

    let result = processor.process(&mut NoTransaction).unwrap();

    assert!(!result.succeeded);
    assert!(result.error_occurred);
    assert_eq!(
        result.report.entries()[0].status,
        ReportStatus::Errors(vec!["Document* - Required value".to_string()])
    );
}

#[test]
fn test_choice_violation_carries_offending_value() {
    let schema = person_schema();
    let mut row = Row::new();
    row.insert("name", "John Doe");
    row.insert("document_number", 123456_i64);
    row.insert("birth_date", birth(1990, 5, 17));
    row.insert("gender", "G");

    let errors = schema.validate_row(&row);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::InvalidValue);
    assert_eq!(errors[0].message, "Value not in: M, F");
    assert_eq!(errors[0].field_value, Some(CellValue::from("G")));
}

#[test]
fn test_missing_column_rejected_before_any_row() {
    let table = Table::from_rows(
        vec!["Name*", "Document*", "Gender*"],
        vec![vec!["John Doe".into(), 123456_i64.into(), "M".into()]],
    )
    .unwrap();

    let err = TableProcessor::builder(table)
        .schema(person_schema())
        .handler(RecordingHandler::default())
        .build()
        .err()
        .expect("construction should fail");

    match err {
        ImportError::Schema(SchemaError::MissingColumns(labels)) => {
            assert_eq!(labels, vec!["Date of birth*".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fatal_error_stops_remaining_rows() {
    logging::init_test();

    let table = person_table(vec![
        vec!["Ana".into(), 1_i64.into(), birth(1990, 1, 1), "G".into()],
        valid_person("Bruno", 2),
        valid_person("Carla", 3),
    ]);
    let handler = RecordingHandler {
        fatal_on: Some(2),
        ..Default::default()
    };
    let calls = Arc::new(AtomicUsize::new(0));
    let mut processor = TableProcessor::builder(table)
        .schema(person_schema())
        .handler(handler)
        .error_reporter(CountingReporter(Arc::clone(&calls)))
        .build()
        .unwrap();

    let result = processor.process(&mut NoTransaction).unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.report.len(), 2);
    assert!(result.report.entries()[0].status.is_errors());
    assert_eq!(
        result.report.entries()[1].status,
        ReportStatus::Message("storage unavailable".to_string())
    );
    assert!(result.report.get(3).is_none());
    assert_eq!(result.failure.as_deref(), Some("storage unavailable"));
    // 上报失败不影响结果
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(processor.state(), ProcessorState::RolledBack);
    assert_eq!(processor.handler().finished, 0);
}

#[test]
fn test_save_only_called_for_valid_rows() {
    let table = person_table(vec![
        valid_person("Ana", 1),
        vec!["Bruno".into(), CellValue::Null, birth(1990, 1, 1), CellValue::Null],
        valid_person("Carla", 3),
        vec!["Dora".into(), "4".into(), birth(1990, 1, 1), "F".into()],
    ]);
    let mut processor = TableProcessor::builder(table)
        .schema(person_schema())
        .handler(RecordingHandler::default())
        .build()
        .unwrap();

    let result = processor.process(&mut NoTransaction).unwrap();

    // 可恢复错误不中止,全部行都有报告
    assert_eq!(result.report.len(), 4);
    assert_eq!(result.report.error_count(), 2);
    assert_eq!(processor.handler().saved, vec![1, 3]);
    assert_eq!(
        result.report.entries()[3].status,
        ReportStatus::Errors(vec![
            "Document* - Column document_number is of incorrect type: Text, it should be Integer"
                .to_string()
        ])
    );
}

#[test]
fn test_finish_processing_runs_once_on_success() {
    let table = person_table(vec![valid_person("Ana", 1), valid_person("Bruno", 2)]);
    let mut processor = TableProcessor::builder(table)
        .schema(person_schema())
        .handler(RecordingHandler::default())
        .build()
        .unwrap();

    let result = processor.process(&mut NoTransaction).unwrap();

    assert!(result.succeeded);
    assert_eq!(result.failure, None);
    assert_eq!(processor.state(), ProcessorState::Committed);
    let handler = processor.into_handler();
    assert_eq!(handler.finished, 1);
    assert_eq!(handler.saved, vec![1, 2]);
}

#[test]
fn test_preprocessing_cleans_before_validation() {
    let table = person_table(vec![vec![
        "  Ana  ".into(),
        1_i64.into(),
        birth(1990, 1, 1),
        "N/A".into(),
    ]]);
    let mut processor = TableProcessor::builder(table)
        .schema(person_schema())
        .config(ImportConfig::default().with_extended_null_sentinels())
        .build()
        .unwrap();

    assert_eq!(processor.table().cell(0, "name"), Some(&CellValue::from("Ana")));
    assert_eq!(processor.table().cell(0, "gender"), Some(&CellValue::Null));

    let result = processor.process(&mut NoTransaction).unwrap();
    assert!(result.succeeded);
}

#[test]
fn test_required_text_lookalikes_are_present_values() {
    let schema = TableSchema::new(vec![Column::new("country", "Country*", ValueType::Text)]).unwrap();
    let table = Table::from_rows(
        vec!["Country*"],
        vec![vec!["NA".into()], vec!["None".into()], vec!["NaN".into()]],
    )
    .unwrap();
    let mut processor = TableProcessor::builder(table).schema(schema).build().unwrap();

    let result = processor.process(&mut NoTransaction).unwrap();

    assert_eq!(
        result.report.entries()[0].status,
        ReportStatus::Message("OK".to_string())
    );
    assert_eq!(
        result.report.entries()[1].status,
        ReportStatus::Message("OK".to_string())
    );
    // 非数字标记仍按空值处理
    assert_eq!(
        result.report.entries()[2].status,
        ReportStatus::Errors(vec!["Country* - Required value".to_string()])
    );
}

#[test]
fn test_report_serializes_to_json() {
    let table = person_table(vec![
        valid_person("Ana", 1),
        vec!["Bruno".into(), CellValue::Null, birth(1990, 1, 1), CellValue::Null],
    ]);
    let mut processor = TableProcessor::builder(table)
        .schema(person_schema())
        .build()
        .unwrap();

    let result = processor.process(&mut NoTransaction).unwrap();

    assert_eq!(
        result.report.to_json().unwrap(),
        r#"[{"line":1,"status":"OK"},{"line":2,"status":["Document* - Required value"]}]"#
    );
}

#[test]
fn test_fatal_error_on_first_row_reports_line_one() {
    let table = person_table(vec![valid_person("Ana", 1), valid_person("Bruno", 2)]);
    let handler = RecordingHandler {
        fatal_on: Some(1),
        ..Default::default()
    };
    let mut processor = TableProcessor::builder(table)
        .schema(person_schema())
        .handler(handler)
        .build()
        .unwrap();

    let result = processor.process(&mut NoTransaction).unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.report.len(), 1);
    assert_eq!(result.report.entries()[0].line, 1);
    assert_eq!(
        result.report.entries()[0].status,
        ReportStatus::Message("storage unavailable".to_string())
    );
    assert!(processor.handler().saved.is_empty());
}
