//! Startup helpers for SQL Server, built on [tiberius].
//!
//! Three concerns, in the order a loader process hits them:
//!
//! 1. **Connecting with retry** — [`Session::connect`] keeps attempting the
//!    TCP + TDS handshake under a [`RetryPolicy`] while the server is still
//!    coming up, and fails fast on terminal errors (bad credentials, missing
//!    database).
//! 2. **Bulk script execution** — [`script::run_script_file`] splits a
//!    script on the `GO` batch separator and runs each fragment best-effort,
//!    reporting per-fragment outcomes instead of aborting on the first
//!    failure.
//! 3. **Introspection** — [`schema::list_tables`] and
//!    [`schema::describe_table`] wrap the INFORMATION_SCHEMA views.
//!
//! ```no_run
//! use mssql_bootstrap::prelude::*;
//!
//! # async fn demo() -> Result<(), MssqlBootstrapError> {
//! let config = ConnectionConfig::from_env()?;
//! let mut session = Session::connect(config, &RetryPolicy::default()).await?;
//!
//! let report = run_script_file(&mut session, "data-script.sql").await?;
//! for failure in report.failures() {
//!     eprintln!("statement {} skipped: {:?}", failure.index, failure.status);
//! }
//!
//! let customers = session.query_as_table("SELECT TOP 5 * FROM Customers").await?;
//! println!("{} rows", customers.len());
//!
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [tiberius]: https://docs.rs/tiberius

pub mod config;
pub mod error;
pub mod prelude;
mod query;
pub mod results;
pub mod retry;
pub mod schema;
pub mod script;
pub mod session;
pub mod types;

pub use config::ConnectionConfig;
pub use error::MssqlBootstrapError;
pub use results::{ResultRow, ResultSet};
pub use retry::RetryPolicy;
pub use schema::{ColumnInfo, TableInfo};
pub use script::{ScriptReport, StatementExecutor, StatementOutcome, StatementStatus};
pub use session::Session;
pub use types::RowValues;
