//! Error types for configuration generation.
//!
//! Connection errors carry enough context to diagnose a failed login (host,
//! port, database and user) but never the password.

use thiserror::Error;

use crate::adapters::ConnectionConfig;

/// Main error type for anonconf operations.
#[derive(Debug, Error)]
pub enum AnonConfError {
    /// Database unreachable or credentials rejected
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Introspection query failed or returned unexpected data
    #[error("Query failed: {context}")]
    Query {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The template references variables that were not provided
    #[error(
        "Can not render the template - missing variables {} - provided variables {}",
        missing.join(","),
        provided.join(",")
    )]
    TemplateValidation {
        missing: Vec<String>,
        provided: Vec<String>,
    },

    /// Template syntax error or failure while rendering
    #[error("Template error: {context}")]
    Template {
        context: String,
        #[source]
        source: minijinja::Error,
    },

    /// Invalid settings, policy or template file
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results with `AnonConfError`
pub type Result<T> = std::result::Result<T, AnonConfError>;

impl AnonConfError {
    /// Creates a connection error naming the target without its password.
    pub fn connection_failed<E>(config: &ConnectionConfig, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: format!("could not connect to {config}"),
            source: Box::new(error),
        }
    }

    /// Creates a query error with context
    pub fn query_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Query {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a template error with context
    pub fn template(context: impl Into<String>, error: minijinja::Error) -> Self {
        Self::Template {
            context: context.into(),
            source: error,
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, error: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: error,
        }
    }
}
