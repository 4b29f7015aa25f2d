//! Connection configuration and environment loading.

use std::env;
use std::fmt;

use tiberius::{AuthMethod, Config as TiberiusConfig};

use crate::error::MssqlBootstrapError;

const DEFAULT_SERVER: &str = "sqlserver";
const DEFAULT_PORT: u16 = 1433;
const DEFAULT_USER: &str = "sa";
const DEFAULT_DATABASE: &str = "ShopDB";

/// Parameters needed to open a SQL Server session.
///
/// Values are fixed once a [`crate::Session`] has been created from them; the
/// session keeps its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionConfig {
    #[must_use]
    pub fn new(
        server: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Load configuration from `DB_SERVER`, `DB_PORT`, `DB_USER`,
    /// `DB_PASSWORD` and `DB_NAME`.
    ///
    /// All variables except `DB_PASSWORD` fall back to the historical
    /// defaults (`sqlserver`, 1433, `sa`, `ShopDB`). The password never has a
    /// built-in default; leaving `DB_PASSWORD` unset is a configuration
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `MssqlBootstrapError::ConfigError` if `DB_PASSWORD` is unset
    /// or `DB_PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, MssqlBootstrapError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, MssqlBootstrapError> {
        let server = lookup("DB_SERVER").unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let port = match lookup("DB_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                MssqlBootstrapError::ConfigError(format!("DB_PORT is not a valid port: {e}"))
            })?,
            None => DEFAULT_PORT,
        };
        let user = lookup("DB_USER").unwrap_or_else(|| DEFAULT_USER.to_string());
        let password = lookup("DB_PASSWORD").ok_or_else(|| {
            MssqlBootstrapError::ConfigError(
                "DB_PASSWORD must be set; there is no built-in default password".to_string(),
            )
        })?;
        let database = lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let config = Self::new(server, port, user, password, database);
        config.validate()?;
        Ok(config)
    }

    /// Check that every field a connection attempt needs has a value.
    ///
    /// # Errors
    ///
    /// Returns `MssqlBootstrapError::ConfigError` naming the first missing
    /// field.
    pub fn validate(&self) -> Result<(), MssqlBootstrapError> {
        for (field, value) in [
            ("server", &self.server),
            ("user", &self.user),
            ("password", &self.password),
            ("database", &self.database),
        ] {
            if value.is_empty() {
                return Err(MssqlBootstrapError::ConfigError(format!(
                    "connection {field} must not be empty"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn to_tiberius(&self) -> TiberiusConfig {
        let mut config = TiberiusConfig::new();
        config.host(&self.server);
        config.port(self.port);
        config.database(&self.database);
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        config.trust_cert();
        config
    }
}

// Never include the password in diagnostics.
impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{} as {}",
            self.server, self.port, self.database, self.user
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn applies_defaults_for_everything_but_the_password() {
        let vars = env(&[("DB_PASSWORD", "s3cret")]);
        let config = ConnectionConfig::from_lookup(|name| vars.get(name).cloned()).unwrap();
        assert_eq!(config.server, "sqlserver");
        assert_eq!(config.port, 1433);
        assert_eq!(config.user, "sa");
        assert_eq!(config.database, "ShopDB");
        assert_eq!(config.password, "s3cret");
    }

    #[test]
    fn missing_password_is_a_config_error() {
        let vars = env(&[("DB_SERVER", "db.internal")]);
        let err = ConnectionConfig::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, MssqlBootstrapError::ConfigError(_)));
    }

    #[test]
    fn explicit_variables_override_defaults() {
        let vars = env(&[
            ("DB_SERVER", "db.internal"),
            ("DB_PORT", "14330"),
            ("DB_USER", "loader"),
            ("DB_PASSWORD", "pw"),
            ("DB_NAME", "Inventory"),
        ]);
        let config = ConnectionConfig::from_lookup(|name| vars.get(name).cloned()).unwrap();
        assert_eq!(config.server, "db.internal");
        assert_eq!(config.port, 14330);
        assert_eq!(config.user, "loader");
        assert_eq!(config.database, "Inventory");
    }

    #[test]
    fn unparsable_port_is_a_config_error() {
        let vars = env(&[("DB_PORT", "fourteen"), ("DB_PASSWORD", "pw")]);
        let err = ConnectionConfig::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, MssqlBootstrapError::ConfigError(_)));
    }

    #[test]
    fn display_redacts_the_password() {
        let config = ConnectionConfig::new("host", 1433, "sa", "hunter2", "ShopDB");
        let rendered = config.to_string();
        assert_eq!(rendered, "host:1433/ShopDB as sa");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn empty_fields_fail_validation() {
        let config = ConnectionConfig::new("", 1433, "sa", "pw", "ShopDB");
        assert!(config.validate().is_err());
    }
}
