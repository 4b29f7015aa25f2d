use std::io::Write;

use async_trait::async_trait;
use mssql_bootstrap::MssqlBootstrapError;
use mssql_bootstrap::script::{
    StatementExecutor, StatementStatus, run_script, run_script_file,
};

/// Records every statement it is handed; fails the statements whose 0-based
/// position is listed in `fail_on`.
#[derive(Default)]
struct RecordingExecutor {
    fail_on: Vec<usize>,
    seen: Vec<String>,
}

#[async_trait]
impl StatementExecutor for RecordingExecutor {
    async fn execute_statement(&mut self, sql: &str) -> Result<u64, MssqlBootstrapError> {
        let index = self.seen.len();
        self.seen.push(sql.to_string());
        if self.fail_on.contains(&index) {
            Err(MssqlBootstrapError::ExecutionError(format!(
                "statement {index} rejected"
            )))
        } else {
            Ok(1)
        }
    }
}

const SCRIPT: &str = "\
CREATE TABLE Customers (CustomerID INT PRIMARY KEY);
GO
INSERT INTO Customers VALUES (1);
GO
INSERT INTO Customers VALUES (2);
GO
";

#[tokio::test]
async fn runs_every_fragment_in_order() {
    let mut executor = RecordingExecutor::default();
    let report = run_script(&mut executor, SCRIPT).await;

    assert_eq!(executor.seen.len(), 3);
    assert!(executor.seen[0].starts_with("CREATE TABLE"));
    assert!(executor.seen[2].ends_with("VALUES (2);"));
    assert!(report.is_clean());
    assert_eq!(report.succeeded(), 3);
}

#[tokio::test]
async fn a_failed_fragment_does_not_stop_the_rest() {
    let mut executor = RecordingExecutor {
        fail_on: vec![0],
        ..Default::default()
    };
    let report = run_script(&mut executor, SCRIPT).await;

    // All three fragments ran, including the last one.
    assert_eq!(executor.seen.len(), 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 2);
    assert!(!report.is_clean());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 0);
    match &failures[0].status {
        StatementStatus::Failed { error } => assert!(error.contains("statement 0 rejected")),
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(
        report.outcomes[2].status,
        StatementStatus::Succeeded { rows_affected: 1 }
    );
}

#[tokio::test]
async fn failure_in_the_middle_still_runs_the_final_fragment() {
    let mut executor = RecordingExecutor {
        fail_on: vec![1],
        ..Default::default()
    };
    let report = run_script(&mut executor, SCRIPT).await;

    assert_eq!(executor.seen.len(), 3);
    assert_eq!(report.outcomes[1].index, 1);
    assert!(matches!(
        report.outcomes[1].status,
        StatementStatus::Failed { .. }
    ));
    assert!(matches!(
        report.outcomes[2].status,
        StatementStatus::Succeeded { .. }
    ));
}

#[tokio::test]
async fn report_keeps_the_executed_sql() {
    let mut executor = RecordingExecutor::default();
    let report = run_script(&mut executor, "SELECT 1; GO SELECT 2;").await;

    assert_eq!(report.outcomes[0].sql, "SELECT 1;");
    assert_eq!(report.outcomes[1].sql, "SELECT 2;");
}

#[tokio::test]
async fn loads_and_runs_a_script_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{SCRIPT}").unwrap();

    let mut executor = RecordingExecutor::default();
    let report = run_script_file(&mut executor, file.path()).await.unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert!(report.is_clean());
}

#[tokio::test]
async fn missing_script_file_is_a_script_error() {
    let mut executor = RecordingExecutor::default();
    let err = run_script_file(&mut executor, "/nonexistent/data-script.sql")
        .await
        .unwrap_err();
    assert!(matches!(err, MssqlBootstrapError::ScriptError(_)));
    assert!(executor.seen.is_empty());
}
