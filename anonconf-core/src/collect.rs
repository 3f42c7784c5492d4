//! Walks the schema through a [`SchemaReader`] and classifies every column.

use crate::Result;
use crate::adapters::SchemaReader;
use crate::classify::classify_column;
use crate::models::TableDescriptor;
use crate::policy::ClassificationPolicy;
use std::collections::HashSet;

/// Default schema to introspect
pub const DEFAULT_SCHEMA: &str = "public";

/// Where in the database to look for tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectionTarget {
    /// Role owning the tables
    pub owner: String,
    /// Schema holding the tables
    pub schema: String,
    /// Catalog the columns belong to
    pub database: String,
}

impl IntrospectionTarget {
    /// Targets tables owned by `owner` in the `public` schema of `database`.
    pub fn new(owner: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            schema: DEFAULT_SCHEMA.to_string(),
            database: database.into(),
        }
    }

    /// Builder method to set the schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }
}

/// Builds the table list for the configuration.
///
/// Tables come back in the reader's (alphabetical) order and columns in
/// declaration order. Excluded tables are skipped before their keys or
/// columns are read; tables left with no columns are dropped because
/// Anonimatron fails on a table without columns.
///
/// # Errors
/// The first reader error is returned as is; no partial result is produced.
pub async fn collect_tables<R>(
    reader: &R,
    target: &IntrospectionTarget,
    policy: &ClassificationPolicy,
) -> Result<Vec<TableDescriptor>>
where
    R: SchemaReader + ?Sized,
{
    let start_time = std::time::Instant::now();
    let table_names = reader.list_tables(&target.owner, &target.schema).await?;

    let mut tables = Vec::with_capacity(table_names.len());
    let mut suppressed = 0_usize;

    for table_name in table_names {
        if policy.is_table_excluded(&table_name) {
            tracing::debug!("Skipping excluded table '{}'", table_name);
            continue;
        }

        let primary_keys: HashSet<String> = reader
            .list_primary_keys(&target.schema, &table_name)
            .await?
            .into_iter()
            .collect();
        let source_columns = reader
            .list_columns(&target.schema, &table_name, &target.database)
            .await?;

        let mut table = TableDescriptor::new(&table_name);
        for source in &source_columns {
            match classify_column(
                &table_name,
                &source.name,
                &source.data_type,
                &primary_keys,
                policy,
            ) {
                Some(column) => table.columns.push(column),
                None => tracing::trace!(
                    "Omitting column '{}.{}' ({})",
                    table_name,
                    source.name,
                    source.data_type
                ),
            }
        }

        if table.columns.is_empty() {
            tracing::info!("Table '{}' has no columns to anonymize", table_name);
            suppressed = suppressed.saturating_add(1);
            continue;
        }

        tracing::debug!(
            "Table '{}': {} of {} columns selected",
            table_name,
            table.columns.len(),
            source_columns.len()
        );
        tables.push(table);
    }

    tracing::info!(
        "Classified schema '{}' in {:.2}s - {} tables selected, {} without columns",
        target.schema,
        start_time.elapsed().as_secs_f64(),
        tables.len(),
        suppressed
    );

    Ok(tables)
}
