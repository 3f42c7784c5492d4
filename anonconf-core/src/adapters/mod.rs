//! Schema reader trait and connection configuration.
//!
//! The collector only talks to the database through [`SchemaReader`], so
//! classification and rendering can be exercised against an in-memory
//! reader in tests.

pub mod helpers;
pub mod postgres;

use crate::Result;
use crate::models::SourceColumn;
use async_trait::async_trait;
use std::time::Duration;
use zeroize::Zeroizing;

/// Default PostgreSQL server port
pub const DEFAULT_PORT: u16 = 5432;

/// Connection parameters for the introspected database.
///
/// The password is held in a [`Zeroizing`] buffer and is never part of the
/// `Debug` or `Display` output.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Database host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database (catalog) name
    pub database: String,
    /// Login role
    pub user: String,
    password: Zeroizing<String>,
    /// How long to wait for the initial connection
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    /// Creates a config for `host` on the default port.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            database: database.into(),
            user: user.into(),
            password: Zeroizing::new(password.into()),
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Builder method to set the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The password, for handing to the driver and the template.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Host as it appears in a JDBC URL: `host`, or `host:port` off the
    /// default port.
    pub fn jdbc_authority(&self) -> String {
        if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns a configuration error if a required field is empty or the
    /// port is zero.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(crate::AnonConfError::configuration("host cannot be empty"));
        }
        if self.port == 0 {
            return Err(crate::AnonConfError::configuration(
                "port must be greater than 0",
            ));
        }
        if self.database.is_empty() {
            return Err(crate::AnonConfError::configuration(
                "database cannot be empty",
            ));
        }
        if self.user.is_empty() {
            return Err(crate::AnonConfError::configuration("user cannot be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"****")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PostgreSQL host={} port={} database={} user={}",
            self.host, self.port, self.database, self.user
        )
    }
}

/// Read-only access to the catalog of one database.
///
/// Implementations issue one query per call, never retry, and return
/// results in the documented order.
#[async_trait]
pub trait SchemaReader: Send + Sync {
    /// Names of tables in `schema` owned by `owner`, sorted alphabetically.
    async fn list_tables(&self, owner: &str, schema: &str) -> Result<Vec<String>>;

    /// Columns of the primary key of `schema.table`, in constraint order.
    async fn list_primary_keys(&self, schema: &str, table: &str) -> Result<Vec<String>>;

    /// Every column of `schema.table` in `database` with its reported type,
    /// in declaration order.
    async fn list_columns(
        &self,
        schema: &str,
        table: &str,
        database: &str,
    ) -> Result<Vec<SourceColumn>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_defaults() {
        let config = ConnectionConfig::new("localhost", "foreman", "foreman", "foreman");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_config_validation() {
        let config = ConnectionConfig::new("", "foreman", "foreman", "foreman");
        assert!(config.validate().is_err());

        let config = ConnectionConfig::new("localhost", "foreman", "foreman", "x").with_port(0);
        assert!(config.validate().is_err());

        let config = ConnectionConfig::new("localhost", "", "foreman", "x");
        assert!(config.validate().is_err());

        let config = ConnectionConfig::new("localhost", "foreman", "", "x");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_jdbc_authority() {
        let config = ConnectionConfig::new("db.example.com", "foreman", "foreman", "x");
        assert_eq!(config.jdbc_authority(), "db.example.com");

        let config = config.with_port(6432);
        assert_eq!(config.jdbc_authority(), "db.example.com:6432");
    }

    #[test]
    fn test_debug_and_display_hide_password() {
        let config = ConnectionConfig::new("localhost", "foreman", "admin", "s3cret");

        let debug = format!("{config:?}");
        let display = config.to_string();

        assert!(!debug.contains("s3cret"));
        assert!(!display.contains("s3cret"));
        assert!(display.contains("user=admin"));
        assert_eq!(config.password(), "s3cret");
    }
}
