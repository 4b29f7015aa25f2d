//! Splitting and best-effort execution of GO-separated SQL scripts.

use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::MssqlBootstrapError;

/// The batch separator used by SQL Server's own client tools.
pub const BATCH_SEPARATOR: &str = "GO";

/// Anything that can run one SQL batch and report rows affected.
///
/// [`crate::Session`] implements this; tests substitute recording fakes.
#[async_trait]
pub trait StatementExecutor {
    async fn execute_statement(&mut self, sql: &str) -> Result<u64, MssqlBootstrapError>;
}

/// Split `script` on the literal `separator` token, trim each fragment, and
/// drop the empty ones. Fragment order follows the script.
///
/// Separators inside string literals are not recognized; scripts with nested
/// or escaped separators are out of scope.
#[must_use]
pub fn split_batches<'a>(script: &'a str, separator: &str) -> Vec<&'a str> {
    script
        .split(separator)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// What happened to one fragment of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementStatus {
    Succeeded { rows_affected: u64 },
    Failed { error: String },
}

/// One script fragment with its position and outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementOutcome {
    /// Position of the fragment within the script, 0-based.
    pub index: usize,
    /// The trimmed SQL text that was executed.
    pub sql: String,
    pub status: StatementStatus,
}

/// Per-fragment outcomes of a bulk script run.
///
/// The script is not transactional: failed fragments are recorded and
/// skipped, and the remaining fragments still run.
#[derive(Debug, Clone, Default)]
pub struct ScriptReport {
    pub outcomes: Vec<StatementOutcome>,
}

impl ScriptReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StatementStatus::Succeeded { .. }))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True when every fragment executed without error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// The outcomes of fragments that failed, in script order.
    pub fn failures(&self) -> impl Iterator<Item = &StatementOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StatementStatus::Failed { .. }))
    }
}

/// Run a script split on [`BATCH_SEPARATOR`]. See
/// [`run_script_with_separator`].
pub async fn run_script<E>(executor: &mut E, script: &str) -> ScriptReport
where
    E: StatementExecutor + ?Sized,
{
    run_script_with_separator(executor, script, BATCH_SEPARATOR).await
}

/// Execute every non-empty fragment of `script` in order, continuing past
/// per-fragment failures.
///
/// Each failure is logged and recorded in the returned report; a failed
/// fragment never prevents later fragments from running.
pub async fn run_script_with_separator<E>(
    executor: &mut E,
    script: &str,
    separator: &str,
) -> ScriptReport
where
    E: StatementExecutor + ?Sized,
{
    let mut report = ScriptReport::default();

    for (index, fragment) in split_batches(script, separator).into_iter().enumerate() {
        let status = match executor.execute_statement(fragment).await {
            Ok(rows_affected) => StatementStatus::Succeeded { rows_affected },
            Err(err) => {
                warn!("statement {index} failed, skipping: {err}");
                StatementStatus::Failed {
                    error: err.to_string(),
                }
            }
        };
        report.outcomes.push(StatementOutcome {
            index,
            sql: fragment.to_string(),
            status,
        });
    }

    info!(
        "script finished: {} ok, {} failed",
        report.succeeded(),
        report.failed()
    );
    report
}

/// Read a UTF-8 script file and run it with [`run_script`].
///
/// # Errors
///
/// Returns `MssqlBootstrapError::ScriptError` if the file cannot be read.
/// Per-statement failures do not error; they are reported in the
/// [`ScriptReport`].
pub async fn run_script_file<E>(
    executor: &mut E,
    path: impl AsRef<Path>,
) -> Result<ScriptReport, MssqlBootstrapError>
where
    E: StatementExecutor + ?Sized,
{
    let path = path.as_ref();
    let script = tokio::fs::read_to_string(path).await.map_err(|e| {
        MssqlBootstrapError::ScriptError(format!(
            "failed to read script file {}: {e}",
            path.display()
        ))
    })?;
    Ok(run_script(executor, &script).await)
}
