//! Column classification.
//!
//! Decides, for one column, whether it belongs in the Anonimatron
//! configuration and with which anonymizer. The decision depends only on
//! its arguments.

use crate::models::{ColumnDescriptor, UNSPECIFIED_SIZE};
use crate::policy::ClassificationPolicy;
use std::collections::HashSet;

/// Classifies a single column.
///
/// The anonymizer is the override's type when one is set, otherwise the
/// type map entry for `db_type`. The column is omitted (`None`) when it is
/// part of the primary key, when its action excludes it, or when no
/// anonymizer resolves.
pub fn classify_column(
    table: &str,
    column: &str,
    db_type: &str,
    primary_keys: &HashSet<String>,
    policy: &ClassificationPolicy,
) -> Option<ColumnDescriptor> {
    let action = policy.action_for(table, column);
    let anon_type = action
        .anon_type
        .or_else(|| policy.type_map.lookup(db_type));
    let primary_key = primary_keys.contains(column);

    if primary_key || action.exclude {
        return None;
    }

    anon_type.map(|anon_type| ColumnDescriptor {
        name: column.to_string(),
        db_data_type: db_type.to_string(),
        anon_type,
        anon_size: UNSPECIFIED_SIZE,
        primary_key,
    })
}
