//! Data model shared by the reader, the classifier and the renderer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Size written for every column; size inference is not implemented.
pub const UNSPECIFIED_SIZE: i32 = -1;

/// Anonymizer types understood by Anonimatron.
///
/// `Domain` is provided by the `DomainAnonymizer` class named in the
/// generated configuration; the rest are Anonimatron built-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnonymizationType {
    /// Random string of the same length
    #[serde(rename = "STRING")]
    String,
    /// Random address at a fixed example domain
    #[serde(rename = "EMAIL_ADDRESS")]
    EmailAddress,
    /// Random host name under `.example.com`
    #[serde(rename = "DOMAIN")]
    Domain,
    /// Roman-sounding generated name
    #[serde(rename = "ROMAN_NAME")]
    RomanName,
    /// Elven-sounding generated name
    #[serde(rename = "ELVEN_NAME")]
    ElvenName,
    /// Random UUID
    #[serde(rename = "UUID")]
    Uuid,
    /// Random digits of the same length
    #[serde(rename = "RANDOMDIGITS")]
    RandomDigits,
    /// Random characters of the same length
    #[serde(rename = "RANDOMCHARACTERS")]
    RandomCharacters,
    /// Valid Dutch bank account number
    #[serde(rename = "DUTCHBANKACCOUNT")]
    DutchBankAccount,
    /// Valid Dutch citizen service number
    #[serde(rename = "BURGERSERVICENUMMER")]
    BurgerServiceNummer,
    /// ISO country code
    #[serde(rename = "COUNTRY_CODE")]
    CountryCode,
    /// Valid IBAN
    #[serde(rename = "IBAN")]
    Iban,
}

impl AnonymizationType {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::String,
        Self::EmailAddress,
        Self::Domain,
        Self::RomanName,
        Self::ElvenName,
        Self::Uuid,
        Self::RandomDigits,
        Self::RandomCharacters,
        Self::DutchBankAccount,
        Self::BurgerServiceNummer,
        Self::CountryCode,
        Self::Iban,
    ];

    /// The type name as written in the Anonimatron configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::EmailAddress => "EMAIL_ADDRESS",
            Self::Domain => "DOMAIN",
            Self::RomanName => "ROMAN_NAME",
            Self::ElvenName => "ELVEN_NAME",
            Self::Uuid => "UUID",
            Self::RandomDigits => "RANDOMDIGITS",
            Self::RandomCharacters => "RANDOMCHARACTERS",
            Self::DutchBankAccount => "DUTCHBANKACCOUNT",
            Self::BurgerServiceNummer => "BURGERSERVICENUMMER",
            Self::CountryCode => "COUNTRY_CODE",
            Self::Iban => "IBAN",
        }
    }
}

impl std::fmt::Display for AnonymizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnonymizationType {
    type Err = crate::AnonConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                crate::AnonConfError::configuration(format!("unknown anonymization type '{s}'"))
            })
    }
}

/// A column as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    /// Column name
    pub name: String,
    /// Type as reported by `information_schema.columns.data_type`
    pub data_type: String,
}

impl SourceColumn {
    /// Creates a source column.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A column selected for anonymization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Source database type
    pub db_data_type: String,
    /// Anonymizer to apply
    pub anon_type: AnonymizationType,
    /// Always [`UNSPECIFIED_SIZE`]
    pub anon_size: i32,
    /// Informational; primary keys never reach the output
    pub primary_key: bool,
}

/// A table with at least one column to anonymize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Creates a table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }
}

/// Per-column override of the default classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnAction {
    /// Leave the column out regardless of its type
    pub exclude: bool,
    /// Anonymizer to use instead of the type map entry
    pub anon_type: Option<AnonymizationType>,
    /// Size override; accepted but not written to the output
    pub size: Option<i32>,
}

impl ColumnAction {
    /// An action that drops the column.
    pub fn exclude() -> Self {
        Self {
            exclude: true,
            ..Self::default()
        }
    }

    /// An action that forces a specific anonymizer.
    pub fn anonymize_as(anon_type: AnonymizationType) -> Self {
        Self {
            anon_type: Some(anon_type),
            ..Self::default()
        }
    }
}

/// Database type name to default anonymizer.
///
/// A `None` value and a missing key both mean "no mapping": the column is
/// left out unless an override supplies a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeMap(BTreeMap<String, Option<AnonymizationType>>);

impl TypeMap {
    /// Creates an empty type map.
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces the mapping for `db_type`.
    #[must_use]
    pub fn with(
        mut self,
        db_type: impl Into<String>,
        anon_type: Option<AnonymizationType>,
    ) -> Self {
        self.0.insert(db_type.into(), anon_type);
        self
    }

    /// Default anonymizer for `db_type`, if any.
    pub fn lookup(&self, db_type: &str) -> Option<AnonymizationType> {
        self.0.get(db_type).copied().flatten()
    }

    /// Number of database types listed, mapped or not.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no database types are listed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for TypeMap {
    /// Character types map to `STRING`; the numeric, temporal, boolean and
    /// system types seen in a typical schema are listed with no mapping.
    fn default() -> Self {
        let unmapped = [
            "integer",
            "timestamp without time zone",
            "timestamp with time zone",
            "boolean",
            "xid",
            "smallint",
            "regproc",
            "real",
            "oid",
            "bigint",
            "double precision",
        ];

        let mut map = Self::empty()
            .with("character varying", Some(AnonymizationType::String))
            .with("text", Some(AnonymizationType::String))
            .with("char", Some(AnonymizationType::String))
            .with("\"char\"", Some(AnonymizationType::String));
        for db_type in unmapped {
            map = map.with(db_type, None);
        }
        map
    }
}

impl<K: Into<String>> FromIterator<(K, Option<AnonymizationType>)> for TypeMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<AnonymizationType>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
