//! Convenient imports for common functionality.

pub use crate::config::ConnectionConfig;
pub use crate::error::MssqlBootstrapError;
pub use crate::results::{ResultRow, ResultSet};
pub use crate::retry::{RetryPolicy, run_with_retry};
pub use crate::schema::{ColumnInfo, TableInfo, describe_table, list_tables};
pub use crate::script::{
    BATCH_SEPARATOR, ScriptReport, StatementExecutor, StatementOutcome, StatementStatus,
    run_script, run_script_file, run_script_with_separator, split_batches,
};
pub use crate::session::{MssqlClient, Session};
pub use crate::types::RowValues;
