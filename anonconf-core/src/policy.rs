//! Classification policy: the type map plus table and column overrides.
//!
//! A policy is plain data handed to the classifier. The built-in policy
//! carries the overrides needed for a Foreman database; a YAML file can
//! replace it wholesale.
//!
//! ```yaml
//! excluded_tables: [schema_migrations]
//! type_map:
//!   character varying: STRING
//!   integer: null
//! column_actions:
//!   users:
//!     mail: { anon_type: EMAIL_ADDRESS }
//!     login: { exclude: true }
//! ```

use crate::models::{AnonymizationType, ColumnAction, TypeMap};
use crate::{AnonConfError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Everything the classifier needs besides the column itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationPolicy {
    /// Tables skipped entirely, before any column is read
    pub excluded_tables: BTreeSet<String>,
    /// Default anonymizer per database type
    pub type_map: TypeMap,
    /// Overrides keyed by table, then column
    pub column_actions: BTreeMap<String, BTreeMap<String, ColumnAction>>,
    /// Action for columns without an override
    pub default_action: ColumnAction,
}

impl ClassificationPolicy {
    /// Policy compiled into the tool, tuned for a Foreman schema.
    pub fn builtin() -> Self {
        Self::default()
            .exclude_table("bloat_tables")
            .exclude_table("bloat_stats")
            .exclude_table("bloat_indexes")
            // Anonimatron refuses tables without a primary key.
            .exclude_table("dynflow_delayed_plans")
            .exclude_table("schema_migrations")
            .with_column_action("auth_sources", "type", ColumnAction::exclude())
            .with_column_action(
                "auth_sources",
                "attr_mail",
                ColumnAction::anonymize_as(AnonymizationType::EmailAddress),
            )
            .with_column_action(
                "domains",
                "name",
                ColumnAction::anonymize_as(AnonymizationType::Domain),
            )
            .with_column_action(
                "domains",
                "fullname",
                ColumnAction::anonymize_as(AnonymizationType::Domain),
            )
            .with_column_action("fact_names", "type", ColumnAction::exclude())
    }

    /// Loads a policy from a YAML file.
    ///
    /// Sections missing from the file take their defaults: the default
    /// type map, no exclusions and no overrides.
    ///
    /// # Errors
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AnonConfError::configuration(format!(
                "Failed to read policy file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&contents).map_err(|e| {
            AnonConfError::configuration(format!("Invalid policy file {}: {e}", path.display()))
        })
    }

    /// Parses a policy from YAML text.
    ///
    /// # Errors
    /// Returns a configuration error naming the offending field.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| AnonConfError::configuration(e.to_string()))
    }

    /// Builder method to skip a table entirely.
    #[must_use]
    pub fn exclude_table(mut self, table: impl Into<String>) -> Self {
        self.excluded_tables.insert(table.into());
        self
    }

    /// Builder method to override one column.
    #[must_use]
    pub fn with_column_action(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        action: ColumnAction,
    ) -> Self {
        self.column_actions
            .entry(table.into())
            .or_default()
            .insert(column.into(), action);
        self
    }

    /// Builder method to replace the type map.
    #[must_use]
    pub fn with_type_map(mut self, type_map: TypeMap) -> Self {
        self.type_map = type_map;
        self
    }

    /// Whether `table` is skipped entirely.
    pub fn is_table_excluded(&self, table: &str) -> bool {
        self.excluded_tables.contains(table)
    }

    /// The override for `table.column`, or the default action.
    pub fn action_for(&self, table: &str, column: &str) -> &ColumnAction {
        self.column_actions
            .get(table)
            .and_then(|columns| columns.get(column))
            .unwrap_or(&self.default_action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_policy() {
        let policy = ClassificationPolicy::builtin();

        assert!(policy.is_table_excluded("schema_migrations"));
        assert!(policy.is_table_excluded("dynflow_delayed_plans"));
        assert!(!policy.is_table_excluded("hosts"));

        assert!(policy.action_for("auth_sources", "type").exclude);
        assert_eq!(
            policy.action_for("auth_sources", "attr_mail").anon_type,
            Some(AnonymizationType::EmailAddress)
        );
        assert_eq!(
            policy.action_for("domains", "fullname").anon_type,
            Some(AnonymizationType::Domain)
        );
        assert_eq!(policy.type_map, TypeMap::default());
    }

    #[test]
    fn test_action_for_falls_back_to_default() {
        let policy = ClassificationPolicy::builtin();

        assert_eq!(policy.action_for("domains", "id"), &ColumnAction::default());
        assert_eq!(policy.action_for("hosts", "name"), &ColumnAction::default());
    }

    #[test]
    fn test_policy_from_yaml() {
        let yaml = r#"
excluded_tables:
  - audits
type_map:
  character varying: STRING
  citext: EMAIL_ADDRESS
  integer: null
column_actions:
  users:
    mail:
      anon_type: EMAIL_ADDRESS
    login:
      exclude: true
      size: 64
"#;
        let policy = ClassificationPolicy::from_yaml_str(yaml).unwrap();

        assert!(policy.is_table_excluded("audits"));
        assert_eq!(policy.type_map.len(), 3);
        assert_eq!(
            policy.action_for("users", "mail").anon_type,
            Some(AnonymizationType::EmailAddress)
        );
        let login = policy.action_for("users", "login");
        assert!(login.exclude);
        assert_eq!(login.size, Some(64));
        assert_eq!(policy.default_action, ColumnAction::default());
    }

    #[test]
    fn test_policy_yaml_defaults() {
        let policy = ClassificationPolicy::from_yaml_str("excluded_tables: [audits]").unwrap();

        assert_eq!(policy.type_map, TypeMap::default());
        assert!(policy.column_actions.is_empty());
    }

    #[test]
    fn test_policy_yaml_rejects_unknown_type() {
        let yaml = "column_actions: { users: { mail: { anon_type: PHONE } } }";
        let error = ClassificationPolicy::from_yaml_str(yaml).unwrap_err();

        assert!(matches!(error, AnonConfError::Configuration { .. }));
    }

    #[test]
    fn test_policy_yaml_rejects_unknown_field() {
        let error = ClassificationPolicy::from_yaml_str("exclude_tables: [audits]").unwrap_err();
        assert!(error.to_string().contains("exclude_tables"));
    }

    #[test]
    fn test_policy_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "excluded_tables: [sessions]").unwrap();

        let policy = ClassificationPolicy::from_yaml_file(file.path()).unwrap();
        assert!(policy.is_table_excluded("sessions"));

        let missing = ClassificationPolicy::from_yaml_file(Path::new("/nonexistent/policy.yaml"));
        assert!(missing.unwrap_err().to_string().contains("policy.yaml"));
    }
}
