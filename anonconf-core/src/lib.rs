//! Core library for anonconf.
//!
//! Reads a PostgreSQL schema, decides which columns an Anonimatron run
//! should scramble and renders the matching Anonimatron XML configuration.
//!
//! # Architecture
//! - [`adapters`]: the [`SchemaReader`] seam and its PostgreSQL implementation
//! - [`classify`]: the per-column decision, a pure function of its inputs
//! - [`policy`]: type map and overrides, injected rather than global
//! - [`collect`]: drives the reader table by table
//! - [`render`]: template validation and XML output

pub mod adapters;
pub mod classify;
pub mod collect;
pub mod error;
pub mod logging;
pub mod models;
pub mod policy;
pub mod render;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, SchemaReader, postgres::PostgresAdapter};
pub use classify::classify_column;
pub use collect::{IntrospectionTarget, collect_tables};
pub use error::{AnonConfError, Result};
pub use logging::init_logging;
pub use models::{
    AnonymizationType, ColumnAction, ColumnDescriptor, SourceColumn, TableDescriptor, TypeMap,
};
pub use policy::ClassificationPolicy;
pub use render::{ConfigTemplate, ConfigVariables, check_template};
