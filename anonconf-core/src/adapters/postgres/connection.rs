//! PostgreSQL connection setup.
//!
//! The tool runs its queries strictly one after another, so the pool holds a
//! single connection. Every session is switched to read-only before use.

use super::{ConnectionConfig, PostgresAdapter};
use crate::{AnonConfError, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

/// `application_name` reported to the server for every session
pub const APPLICATION_NAME: &str = concat!("anonconf-", env!("CARGO_PKG_VERSION"));

impl PostgresAdapter {
    /// Connects to the database described by `config`.
    ///
    /// The connection is established eagerly so an unreachable server or a
    /// rejected login surfaces here rather than on the first query.
    ///
    /// # Errors
    /// Returns a configuration error if `config` is invalid, or a connection
    /// error naming host, port, database and user (never the password).
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        use sqlx::Executor;

        config.validate()?;

        tracing::debug!("Connecting to {}", config);

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.connect_timeout)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET default_transaction_read_only = on")
                        .await?;
                    Ok(())
                })
            })
            .connect_with(Self::connect_options(&config))
            .await
            .map_err(|e| {
                tracing::debug!("Connection to {} failed: {}", config, e);
                AnonConfError::connection_failed(&config, e)
            })?;

        tracing::info!("Connected to {}", config);

        Ok(Self { pool, config })
    }

    /// Builds driver options from the connection config.
    pub(crate) fn connect_options(config: &ConnectionConfig) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(config.password())
            .application_name(APPLICATION_NAME)
    }

    /// Closes the pool, waiting for the connection to shut down.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
