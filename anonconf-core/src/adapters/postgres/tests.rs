//! Unit tests for the PostgreSQL adapter that need no running server.

use super::*;
use crate::AnonConfError;
use std::time::Duration;

#[test]
fn test_connect_options_carry_config() {
    let config =
        ConnectionConfig::new("db.example.com", "foreman", "anon", "secret").with_port(6543);
    let options = PostgresAdapter::connect_options(&config);

    assert_eq!(options.get_host(), "db.example.com");
    assert_eq!(options.get_port(), 6543);
    assert_eq!(options.get_database(), Some("foreman"));
    assert_eq!(options.get_username(), "anon");
    assert_eq!(options.get_application_name(), Some(APPLICATION_NAME));
}

#[test]
fn test_application_name_is_versioned() {
    assert!(APPLICATION_NAME.starts_with("anonconf-"));
    assert!(APPLICATION_NAME.ends_with(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_connect_rejects_invalid_config() {
    let config = ConnectionConfig::new("", "foreman", "foreman", "foreman");
    let result = PostgresAdapter::connect(config).await;

    assert!(matches!(result, Err(AnonConfError::Configuration { .. })));
}

#[tokio::test]
async fn test_connect_failure_is_connection_error_without_password() {
    // Nothing listens on port 1; the pool gives up after the connect timeout.
    let config = ConnectionConfig::new("127.0.0.1", "foreman", "foreman", "do-not-print")
        .with_port(1)
        .with_connect_timeout(Duration::from_secs(2));

    let error = PostgresAdapter::connect(config).await.unwrap_err();

    assert!(matches!(error, AnonConfError::Connection { .. }));
    let message = error.to_string();
    assert!(message.contains("127.0.0.1"));
    assert!(message.contains("port=1"));
    assert!(!message.contains("do-not-print"));
}
