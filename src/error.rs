use thiserror::Error;

use tiberius::error::Error as TiberiusError;

/// SQL Server login rejection, surfaced by the server as error 18456.
const LOGIN_FAILED: u32 = 18456;
/// "Cannot open database" family: 4060 (login-time), 911 (USE-time).
const DATABASE_UNAVAILABLE: [u32; 2] = [4060, 911];

#[derive(Debug, Error)]
pub enum MssqlBootstrapError {
    #[error(transparent)]
    MssqlError(#[from] TiberiusError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Database unavailable: {0}")]
    MissingDatabase(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Script error: {0}")]
    ScriptError(String),

    #[error("Session usage error: {0}")]
    UsageError(String),

    #[error("Gave up after {attempts} connection attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl MssqlBootstrapError {
    /// Whether waiting and retrying could plausibly fix this error.
    ///
    /// Only connectivity-level failures qualify: the server not accepting TCP
    /// connections yet, an interrupted stream, or a redirect we could not
    /// follow. Login rejections, missing databases, and statement errors are
    /// terminal and must not be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            MssqlBootstrapError::ConnectionError(_) => true,
            MssqlBootstrapError::MssqlError(err) => matches!(
                err,
                TiberiusError::Io { .. } | TiberiusError::Routing { .. }
            ),
            _ => false,
        }
    }
}

/// Map a driver error from the connect path onto the crate's taxonomy.
///
/// Server-reported token errors carry a numeric code; login failures and
/// unavailable databases get their own variants with a hint about the likely
/// cause, so callers can fail fast instead of retrying a lost cause.
pub(crate) fn classify_connect_error(err: TiberiusError) -> MssqlBootstrapError {
    match err {
        TiberiusError::Server(token) => {
            let code = token.code();
            if code == LOGIN_FAILED {
                MssqlBootstrapError::AuthenticationError(format!(
                    "login rejected by the server, check user and password (code {code}): {}",
                    token.message()
                ))
            } else if DATABASE_UNAVAILABLE.contains(&code) {
                MssqlBootstrapError::MissingDatabase(format!(
                    "cannot open the requested database, create it before connecting (code {code}): {}",
                    token.message()
                ))
            } else {
                MssqlBootstrapError::MssqlError(TiberiusError::Server(token))
            }
        }
        err @ (TiberiusError::Io { .. } | TiberiusError::Routing { .. }) => {
            MssqlBootstrapError::ConnectionError(format!("server not reachable: {err}"))
        }
        other => MssqlBootstrapError::MssqlError(other),
    }
}
