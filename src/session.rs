//! An open connection to SQL Server and the operations it supports.

use std::net::ToSocketAddrs;

use async_trait::async_trait;
use tiberius::Client;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::info;

use crate::config::ConnectionConfig;
use crate::error::{MssqlBootstrapError, classify_connect_error};
use crate::query::build_result_set;
use crate::results::ResultSet;
use crate::retry::{RetryPolicy, run_with_retry};
use crate::script::StatementExecutor;
use crate::types::RowValues;

/// Type alias for the underlying tiberius client.
pub type MssqlClient = Client<Compat<TcpStream>>;

/// An open logical connection to a SQL Server database.
///
/// A `Session` only exists after a successful connect; [`Session::close`]
/// shuts the connection down, and every operation issued afterwards fails
/// with `MssqlBootstrapError::UsageError`. The configuration it was created
/// from is kept for diagnostics and is immutable.
pub struct Session {
    client: Option<MssqlClient>,
    config: ConnectionConfig,
}

impl Session {
    /// Open a session, retrying transient connectivity failures under
    /// `policy`.
    ///
    /// Authentication failures and missing databases are terminal: they are
    /// returned on the first occurrence rather than retried, since waiting
    /// will not fix bad credentials or a database nobody created.
    ///
    /// # Errors
    ///
    /// Returns `MssqlBootstrapError::ConfigError` for an invalid config,
    /// the classified terminal error, or
    /// `MssqlBootstrapError::RetriesExhausted` once `policy` is spent.
    pub async fn connect(
        config: ConnectionConfig,
        policy: &RetryPolicy,
    ) -> Result<Self, MssqlBootstrapError> {
        config.validate()?;

        let client = run_with_retry(policy, |attempt| {
            let config = config.clone();
            async move {
                info!("connecting to {config} (attempt {attempt})");
                open_client(&config).await
            }
        })
        .await?;

        info!("connected to {config}");
        Ok(Self {
            client: Some(client),
            config,
        })
    }

    /// Execute a statement (DDL or DML) and return the rows affected.
    ///
    /// # Errors
    ///
    /// Returns `MssqlBootstrapError::UsageError` if the session is closed,
    /// or the driver error on execution failure.
    pub async fn execute(&mut self, sql: &str) -> Result<u64, MssqlBootstrapError> {
        let client = self.client_mut()?;
        let result = tiberius::Query::new(sql)
            .execute(client)
            .await
            .map_err(MssqlBootstrapError::from)?;
        Ok(result.rows_affected().iter().sum())
    }

    /// Run a query with positional parameters bound as `@P1..@Pn`.
    ///
    /// Column values are mapped onto [`RowValues`]: integer types, `float`/
    /// `real`, `bit`, `datetime`/`datetime2`, character types, and binary
    /// types. Columns of any other type (e.g. `decimal`,
    /// `uniqueidentifier`) materialize as [`RowValues::Null`]; `CAST` them
    /// to a mapped type in the query when their value matters.
    ///
    /// # Errors
    ///
    /// Returns `MssqlBootstrapError::UsageError` if the session is closed,
    /// or `MssqlBootstrapError::ExecutionError` on query failure.
    pub async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, MssqlBootstrapError> {
        let client = self.client_mut()?;
        build_result_set(client, sql, params).await
    }

    /// Run a parameterless query and materialize the result as a table.
    ///
    /// # Errors
    ///
    /// Same as [`Session::query`].
    pub async fn query_as_table(&mut self, sql: &str) -> Result<ResultSet, MssqlBootstrapError> {
        self.query(sql, &[]).await
    }

    /// Shut the connection down. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the connection fails to close cleanly.
    pub async fn close(&mut self) -> Result<(), MssqlBootstrapError> {
        if let Some(client) = self.client.take() {
            client.close().await.map_err(MssqlBootstrapError::from)?;
            info!("database connection closed ({})", self.config);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn client_mut(&mut self) -> Result<&mut MssqlClient, MssqlBootstrapError> {
        self.client.as_mut().ok_or_else(|| {
            MssqlBootstrapError::UsageError(
                "session is closed; connect() a new one before executing queries".to_string(),
            )
        })
    }
}

#[async_trait]
impl StatementExecutor for Session {
    async fn execute_statement(&mut self, sql: &str) -> Result<u64, MssqlBootstrapError> {
        self.execute(sql).await
    }
}

#[cfg(test)]
impl Session {
    fn closed_for_tests(config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
        }
    }
}

/// One raw connection attempt: resolve the address, open a TCP stream, and
/// complete the TDS handshake.
async fn open_client(config: &ConnectionConfig) -> Result<MssqlClient, MssqlBootstrapError> {
    let addr_iter = (config.server.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|e| {
            MssqlBootstrapError::ConnectionError(format!(
                "failed to resolve {}: {e}",
                config.server
            ))
        })?;

    let server_addr = addr_iter.into_iter().next().ok_or_else(|| {
        MssqlBootstrapError::ConnectionError(format!("no address found for {}", config.server))
    })?;

    let tcp = TcpStream::connect(server_addr).await.map_err(|e| {
        MssqlBootstrapError::ConnectionError(format!("TCP connection error: {e}"))
    })?;
    tcp.set_nodelay(true).ok();

    let tcp = tcp.compat_write();

    Client::connect(config.to_tiberius(), tcp)
        .await
        .map_err(classify_connect_error)
}
