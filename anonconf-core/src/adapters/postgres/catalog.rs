//! Catalog queries used to describe tables, primary keys and columns.

use crate::adapters::helpers::RowExt;
use crate::models::SourceColumn;
use crate::{AnonConfError, Result};
use sqlx::PgPool;

const TABLES_QUERY: &str = r#"
    SELECT tablename::text AS tablename
    FROM pg_catalog.pg_tables
    WHERE schemaname = $1 AND tableowner = $2
    ORDER BY tablename
"#;

const PRIMARY_KEYS_QUERY: &str = r#"
    SELECT column_name::text AS column_name
    FROM information_schema.table_constraints
         JOIN information_schema.key_column_usage
             USING (constraint_catalog, constraint_schema, constraint_name,
                    table_catalog, table_schema, table_name)
    WHERE constraint_type = 'PRIMARY KEY'
      AND table_schema = $1
      AND table_name = $2
    ORDER BY ordinal_position
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT column_name::text AS column_name, data_type::text AS data_type
    FROM information_schema.columns
    WHERE table_name = $1 AND table_schema = $2 AND table_catalog = $3
    ORDER BY ordinal_position
"#;

pub(super) async fn list_tables(pool: &PgPool, owner: &str, schema: &str) -> Result<Vec<String>> {
    tracing::debug!("Listing tables in schema '{}' owned by '{}'", schema, owner);

    let rows = sqlx::query(TABLES_QUERY)
        .bind(schema)
        .bind(owner)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AnonConfError::query_failed(
                format!("Failed to list tables in schema '{schema}' owned by '{owner}'"),
                e,
            )
        })?;

    let tables = rows
        .iter()
        .map(|row| row.get_field("tablename", Some("pg_tables")))
        .collect::<Result<Vec<String>>>()?;

    tracing::info!("Found {} tables in schema '{}'", tables.len(), schema);
    Ok(tables)
}

pub(super) async fn list_primary_keys(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<String>> {
    let rows = sqlx::query(PRIMARY_KEYS_QUERY)
        .bind(schema)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AnonConfError::query_failed(
                format!("Failed to read primary key of table '{schema}.{table}'"),
                e,
            )
        })?;

    let keys = rows
        .iter()
        .map(|row| row.get_field("column_name", Some(table)))
        .collect::<Result<Vec<String>>>()?;

    tracing::debug!("Table '{}' primary key: {:?}", table, keys);
    Ok(keys)
}

pub(super) async fn list_columns(
    pool: &PgPool,
    schema: &str,
    table: &str,
    database: &str,
) -> Result<Vec<SourceColumn>> {
    let rows = sqlx::query(COLUMNS_QUERY)
        .bind(table)
        .bind(schema)
        .bind(database)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AnonConfError::query_failed(
                format!("Failed to list columns of table '{schema}.{table}'"),
                e,
            )
        })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        columns.push(SourceColumn {
            name: row.get_field("column_name", Some(table))?,
            data_type: row.get_field("data_type", Some(table))?,
        });
    }

    tracing::debug!("Table '{}' has {} columns", table, columns.len());
    Ok(columns)
}
