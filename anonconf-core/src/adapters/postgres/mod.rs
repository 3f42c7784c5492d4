//! PostgreSQL schema reader.
//!
//! # Module Structure
//! - `connection`: connect options and the single-connection pool
//! - `catalog`: `pg_catalog` / `information_schema` introspection queries
//!
//! Sessions are opened read-only; nothing this adapter runs modifies the
//! database.

mod catalog;
mod connection;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, SchemaReader};
use crate::Result;
use crate::models::SourceColumn;
use async_trait::async_trait;
use sqlx::PgPool;

pub use connection::APPLICATION_NAME;

/// Schema reader backed by a PostgreSQL connection pool.
pub struct PostgresAdapter {
    pool: PgPool,
    config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresAdapter {
    /// The configuration this adapter connected with.
    pub const fn connection_config(&self) -> &ConnectionConfig {
        &self.config
    }
}

#[async_trait]
impl SchemaReader for PostgresAdapter {
    async fn list_tables(&self, owner: &str, schema: &str) -> Result<Vec<String>> {
        catalog::list_tables(&self.pool, owner, schema).await
    }

    async fn list_primary_keys(&self, schema: &str, table: &str) -> Result<Vec<String>> {
        catalog::list_primary_keys(&self.pool, schema, table).await
    }

    async fn list_columns(
        &self,
        schema: &str,
        table: &str,
        database: &str,
    ) -> Result<Vec<SourceColumn>> {
        catalog::list_columns(&self.pool, schema, table, database).await
    }
}
