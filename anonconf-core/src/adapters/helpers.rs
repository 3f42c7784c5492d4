//! Row decoding helpers shared by the catalog queries.

use crate::{AnonConfError, Result};
use sqlx::{Row, postgres::PgRow};

/// Extension trait for extracting typed values from database rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use anonconf_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("column_name", Some("users"))?;
/// ```
pub trait RowExt {
    /// Extracts a typed field from the row, naming the field and table on
    /// failure.
    ///
    /// # Errors
    /// Returns a query error if the column is missing or has another type.
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

impl RowExt for PgRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(field_name).map_err(|e| {
            let context = match table_context {
                Some(table) => format!(
                    "Failed to parse field '{field_name}' from result for table '{table}'"
                ),
                None => format!("Failed to parse field '{field_name}' from database result"),
            };
            AnonConfError::query_failed(context, e)
        })
    }
}
