// ==========================================
// 表格数据导入引擎 - 批处理器
// ==========================================
// 状态机: Initialized → Preprocessing → Running → {Committed, RolledBack}
// 流程: 列检查 → 重命名 → 清洗 → 开启事务 → 逐行校验/保存 → 收尾 → 提交或回滚
// 红线:
// - 任一行出错（可恢复或致命）整批回滚,不留部分写入
// - 可恢复错误不中止后续行；致命错误立即中止剩余行
// - 事务在所有退出路径上恰好结束一次
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{CellValue, ImportReport, ReportStatus, Row, RunResult, Table};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult, ProcessException, RowError};
use crate::importer::import_hooks::{DefaultRowHandler, ErrorReporter, RowHandler, TransactionScope};
use crate::schema::TableSchema;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Initialized,
    /// 预处理完成,等待运行
    Preprocessing,
    Running,
    Committed,
    RolledBack,
}

// ==========================================
// TransactionGuard - 事务作用域守卫
// ==========================================
// 未显式提交/回滚即被释放时自动回滚
struct TransactionGuard<'a, T: TransactionScope + ?Sized> {
    scope: &'a mut T,
    active: bool,
}

impl<'a, T: TransactionScope + ?Sized> TransactionGuard<'a, T> {
    fn begin(scope: &'a mut T) -> anyhow::Result<Self> {
        scope.begin()?;
        Ok(Self {
            scope,
            active: true,
        })
    }

    fn commit(mut self) -> anyhow::Result<()> {
        self.active = false;
        if let Err(e) = self.scope.commit() {
            if let Err(rollback_err) = self.scope.rollback() {
                warn!(error = %rollback_err, "提交失败后回滚失败");
            }
            return Err(e);
        }
        Ok(())
    }

    fn rollback(mut self) -> anyhow::Result<()> {
        self.active = false;
        self.scope.rollback()
    }
}

impl<T: TransactionScope + ?Sized> Drop for TransactionGuard<'_, T> {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.scope.rollback() {
                warn!(error = %e, "事务守卫回滚失败");
            }
        }
    }
}

// ==========================================
// ProcessorBuilder
// ==========================================
pub struct ProcessorBuilder<H> {
    table: Table,
    schema: Option<Arc<TableSchema>>,
    handler: H,
    config: ImportConfig,
    reporter: Option<Box<dyn ErrorReporter>>,
}

impl<H> ProcessorBuilder<H> {
    /// 绑定 Schema（不绑定则跳过列检查、重命名与行校验）
    pub fn schema(mut self, schema: impl Into<Arc<TableSchema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn handler<H2: RowHandler>(self, handler: H2) -> ProcessorBuilder<H2> {
        ProcessorBuilder {
            table: self.table,
            schema: self.schema,
            handler,
            config: self.config,
            reporter: self.reporter,
        }
    }

    pub fn config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn error_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }
}

impl<H: RowHandler> ProcessorBuilder<H> {
    /// 执行预处理并创建处理器
    ///
    /// # 返回
    /// - Err(ImportError::Schema(MissingColumns)): Schema 列缺失,不创建处理器
    /// - Err(ImportError::StatusColumnConflict): 预处理后的表格已含状态列
    pub fn build(self) -> ImportResult<TableProcessor<H>> {
        let ProcessorBuilder {
            table,
            schema,
            handler,
            config,
            reporter,
        } = self;

        debug!(state = ?ProcessorState::Initialized, rows = table.len(), "开始预处理");
        let table = TableProcessor::<H>::preprocess(table, schema.as_deref(), &config)?;
        // 状态列会在运行时整列重写,不能覆盖输入数据
        if table.has_column(&config.status_column) {
            return Err(ImportError::StatusColumnConflict(config.status_column));
        }

        Ok(TableProcessor {
            schema,
            table,
            handler,
            reporter,
            config,
            state: ProcessorState::Preprocessing,
            error: false,
            status: String::new(),
            report: ImportReport::new(),
        })
    }
}

// ==========================================
// TableProcessor - 批处理器
// ==========================================
pub struct TableProcessor<H = DefaultRowHandler> {
    schema: Option<Arc<TableSchema>>,
    table: Table,
    handler: H,
    reporter: Option<Box<dyn ErrorReporter>>,
    config: ImportConfig,
    state: ProcessorState,
    error: bool,
    status: String,
    report: ImportReport,
}

impl TableProcessor<DefaultRowHandler> {
    pub fn builder(table: Table) -> ProcessorBuilder<DefaultRowHandler> {
        ProcessorBuilder {
            table,
            schema: None,
            handler: DefaultRowHandler::default(),
            config: ImportConfig::default(),
            reporter: None,
        }
    }

    /// 无 Schema、默认保存的处理器
    pub fn new(table: Table) -> ImportResult<Self> {
        Self::builder(table).build()
    }
}

impl<H: RowHandler> TableProcessor<H> {
    /// 预处理: 列检查 → 重命名 → TRIM / NULL 标准化
    fn preprocess(
        table: Table,
        schema: Option<&TableSchema>,
        config: &ImportConfig,
    ) -> ImportResult<Table> {
        let mut table = match schema {
            Some(schema) => {
                schema.validate_columns_present(&table)?;
                schema.rename_to_internal(table)?
            }
            None => table,
        };

        DataCleaner::from_config(config).clean_table(&mut table);
        Ok(table)
    }

    /// 校验单行；有错误时返回可恢复的 ProcessException
    pub fn clean_row(&self, row: Row) -> Result<Row, ProcessException> {
        if let Some(schema) = &self.schema {
            let errors = schema.validate_row(&row);
            if !errors.is_empty() {
                return Err(ProcessException::from_errors(&errors));
            }
        }
        Ok(row)
    }

    /// 校验并保存单行（校验失败时不调用 save）
    pub fn process_row(&mut self, line: usize, row: Row) -> Result<String, RowError> {
        let cleaned = self.clean_row(row)?;
        self.handler.save(line, &cleaned)
    }

    /// 执行导入
    ///
    /// # 返回
    /// - Ok(RunResult): 运行结束（成功提交或已回滚）,报告完整
    /// - Err(ImportError::AlreadyProcessed): 处理器已运行过
    /// - Err(ImportError::Transaction): 事务开启失败,未处理任何行
    #[instrument(skip_all, fields(rows = self.table.len(), has_schema = self.schema.is_some()))]
    pub fn process<T>(&mut self, scope: &mut T) -> ImportResult<RunResult>
    where
        T: TransactionScope + ?Sized,
    {
        if self.state != ProcessorState::Preprocessing {
            return Err(ImportError::AlreadyProcessed);
        }

        let tx = TransactionGuard::begin(scope)
            .map_err(|e| ImportError::Transaction(e.to_string()))?;
        self.state = ProcessorState::Running;
        info!("开始逐行导入");

        let status_column = self.config.status_column.clone();
        self.table.add_column(status_column.as_str(), CellValue::from(""));

        for index in 0..self.table.len() {
            let line = index + 1;
            let Some(mut row) = self.table.row(index) else {
                break;
            };
            row.remove(&status_column);

            let message = match self.process_row(line, row) {
                Ok(message) => {
                    debug!(line, status = %message, "行导入成功");
                    self.report.push(line, ReportStatus::Message(message.clone()));
                    message
                }
                Err(RowError::Process(e)) => {
                    self.error = true;
                    warn!(line, error = %e, "行校验失败");
                    self.report
                        .push(line, ReportStatus::Errors(e.messages().to_vec()));
                    e.to_string()
                }
                Err(RowError::Fatal(e)) => {
                    self.error = true;
                    self.status = e.to_string();
                    error!(line, error = %e, "行处理致命错误，中止剩余行");
                    self.report.push(line, ReportStatus::Message(self.status.clone()));
                    self.table
                        .set_cell(index, &status_column, CellValue::from(self.status.as_str()));
                    self.report_fatal(&e);
                    break;
                }
            };
            self.table
                .set_cell(index, &status_column, CellValue::from(message));
        }

        if !self.error {
            if let Err(e) = self.handler.finish_processing() {
                self.fail_run(e, "收尾处理失败");
            }
        }

        let succeeded = if self.error {
            if let Err(e) = tx.rollback() {
                warn!(error = %e, "回滚失败");
            }
            self.state = ProcessorState::RolledBack;
            false
        } else {
            match tx.commit() {
                Ok(()) => {
                    self.state = ProcessorState::Committed;
                    true
                }
                Err(e) => {
                    self.fail_run(e, "事务提交失败");
                    self.state = ProcessorState::RolledBack;
                    false
                }
            }
        };

        info!(
            succeeded,
            entries = self.report.len(),
            errors = self.report.error_count(),
            state = ?self.state,
            "导入运行结束"
        );

        Ok(self.run_result(succeeded))
    }

    /// 运行级致命错误（收尾/提交阶段）：无对应行,不写报告条目
    fn fail_run(&mut self, err: anyhow::Error, context: &str) {
        self.error = true;
        self.status = err.to_string();
        error!(error = %err, "{}", context);
        self.report_fatal(&err);
    }

    /// 尽力上报,上报失败只记日志
    fn report_fatal(&self, err: &anyhow::Error) {
        if let Some(reporter) = &self.reporter {
            if let Err(e) = reporter.capture(err) {
                warn!(error = %e, "错误上报失败，已忽略");
            }
        }
    }

    fn run_result(&self, succeeded: bool) -> RunResult {
        RunResult {
            succeeded,
            error_occurred: self.error,
            report: self.report.clone(),
            failure: (!self.status.is_empty()).then(|| self.status.clone()),
        }
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// 预处理后的表格（运行后含逐行状态列）
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_deref()
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// 运行级状态信息（致命错误消息,无错误时为空）
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValueType;
    use crate::importer::import_hooks::NoTransaction;
    use crate::schema::{choices_validator, Column, SchemaError};

    #[derive(Default)]
    struct RecordingTransaction {
        begun: usize,
        committed: usize,
        rolled_back: usize,
    }

    impl TransactionScope for RecordingTransaction {
        fn begin(&mut self) -> anyhow::Result<()> {
            self.begun += 1;
            Ok(())
        }

        fn commit(&mut self) -> anyhow::Result<()> {
            self.committed += 1;
            Ok(())
        }

        fn rollback(&mut self) -> anyhow::Result<()> {
            self.rolled_back += 1;
            Ok(())
        }
    }

    fn numeric_table() -> Table {
        Table::from_rows(
            vec!["0", "1", "2"],
            vec![
                vec![1_i64.into(), 2_i64.into(), 3_i64.into()],
                vec![4_i64.into(), 5_i64.into(), 6_i64.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_schema_less_run_commits() {
        let mut processor = TableProcessor::new(numeric_table()).unwrap();
        let mut tx = RecordingTransaction::default();

        let result = processor.process(&mut tx).unwrap();

        assert!(result.succeeded);
        assert!(!result.error_occurred);
        assert_eq!(result.report.len(), 2);
        assert_eq!(tx.begun, 1);
        assert_eq!(tx.committed, 1);
        assert_eq!(tx.rolled_back, 0);
        assert_eq!(processor.state(), ProcessorState::Committed);
        assert_eq!(
            processor.table().cell(1, "Import Status"),
            Some(&CellValue::from("OK"))
        );
    }

    #[test]
    fn test_preprocessing_trims_and_normalizes() {
        let table = Table::from_rows(
            vec!["a", "b"],
            vec![vec![" x ".into(), f64::NAN.into()]],
        )
        .unwrap();
        let processor = TableProcessor::new(table).unwrap();

        assert_eq!(processor.state(), ProcessorState::Preprocessing);
        assert_eq!(processor.table().cell(0, "a"), Some(&CellValue::from("x")));
        assert_eq!(processor.table().cell(0, "b"), Some(&CellValue::Null));
    }

    #[test]
    fn test_missing_columns_fail_construction() {
        let schema = TableSchema::new(vec![
            Column::new("name", "Name*", ValueType::Text),
            Column::new("birth_date", "Date of birth*", ValueType::Timestamp),
        ])
        .unwrap();
        let table = Table::new(vec!["Name*"]).unwrap();

        let result = TableProcessor::builder(table).schema(schema).build();

        assert!(matches!(
            result,
            Err(ImportError::Schema(SchemaError::MissingColumns(labels)))
                if labels == vec!["Date of birth*".to_string()]
        ));
    }

    #[test]
    fn test_recoverable_error_rolls_back_and_continues() {
        let schema = TableSchema::new(vec![Column::new("gender", "Gender*", ValueType::Text)
            .validator(choices_validator(["M", "F"]).with_message("Invalid value"))])
        .unwrap();
        let table = Table::from_rows(
            vec!["Gender*"],
            vec![vec!["G".into()], vec!["F".into()]],
        )
        .unwrap();
        let mut processor = TableProcessor::builder(table).schema(schema).build().unwrap();
        let mut tx = RecordingTransaction::default();

        let result = processor.process(&mut tx).unwrap();

        assert!(!result.succeeded);
        assert_eq!(result.failure, None);
        assert_eq!(
            result.report.entries()[0].status,
            ReportStatus::Errors(vec!["Gender* - Invalid value".to_string()])
        );
        assert_eq!(
            result.report.entries()[1].status,
            ReportStatus::Message("OK".to_string())
        );
        assert_eq!(tx.committed, 0);
        assert_eq!(tx.rolled_back, 1);
        assert_eq!(processor.state(), ProcessorState::RolledBack);
        assert_eq!(
            processor.table().cell(0, "Import Status"),
            Some(&CellValue::from("Gender* - Invalid value"))
        );
    }

    #[test]
    fn test_existing_status_column_rejected() {
        let table = Table::from_rows(
            vec!["Name*", "Import Status"],
            vec![vec!["Ana".into(), "OK".into()]],
        )
        .unwrap();

        let result = TableProcessor::new(table);

        assert!(matches!(
            result,
            Err(ImportError::StatusColumnConflict(name)) if name == "Import Status"
        ));
    }

    #[test]
    fn test_status_column_matching_schema_name_rejected() {
        let schema =
            TableSchema::new(vec![Column::new("result", "Result*", ValueType::Text)]).unwrap();
        let table = Table::from_rows(vec!["Result*"], vec![vec!["x".into()]]).unwrap();
        let config = ImportConfig {
            status_column: "result".to_string(),
            ..ImportConfig::default()
        };

        let result = TableProcessor::builder(table)
            .schema(schema)
            .config(config)
            .build();

        assert!(matches!(result, Err(ImportError::StatusColumnConflict(_))));
    }

    #[test]
    fn test_second_run_rejected() {
        let mut processor = TableProcessor::new(numeric_table()).unwrap();
        processor.process(&mut NoTransaction).unwrap();

        let err = processor.process(&mut NoTransaction).unwrap_err();
        assert!(matches!(err, ImportError::AlreadyProcessed));
    }

    #[test]
    fn test_begin_failure_is_returned() {
        struct Unavailable;

        impl TransactionScope for Unavailable {
            fn begin(&mut self) -> anyhow::Result<()> {
                anyhow::bail!("database is locked")
            }

            fn commit(&mut self) -> anyhow::Result<()> {
                Ok(())
            }

            fn rollback(&mut self) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let mut processor = TableProcessor::new(numeric_table()).unwrap();
        let err = processor.process(&mut Unavailable).unwrap_err();

        assert!(matches!(err, ImportError::Transaction(msg) if msg == "database is locked"));
        assert!(processor.report().is_empty());
        assert_eq!(processor.state(), ProcessorState::Preprocessing);
    }

    #[test]
    fn test_guard_rolls_back_on_drop() {
        let mut tx = RecordingTransaction::default();
        {
            let _guard = TransactionGuard::begin(&mut tx).unwrap();
        }
        assert_eq!(tx.rolled_back, 1);
    }

    #[test]
    fn test_status_column_excluded_from_saved_row() {
        struct Capture(Vec<Row>);

        impl RowHandler for Capture {
            fn save(&mut self, _line: usize, row: &Row) -> Result<String, RowError> {
                self.0.push(row.clone());
                Ok("saved".to_string())
            }
        }

        let mut processor = TableProcessor::builder(numeric_table())
            .handler(Capture(Vec::new()))
            .build()
            .unwrap();
        processor.process(&mut NoTransaction).unwrap();

        let saved = &processor.handler().0;
        assert_eq!(saved.len(), 2);
        assert!(saved[0].get("Import Status").is_none());
        assert_eq!(saved[1].get("2"), Some(&CellValue::Integer(6)));
    }
}
