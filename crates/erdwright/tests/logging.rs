//! Tests for logging functionality
//!
//! A global subscriber can only be installed once per process, so most of
//! these only check that initialization fails gracefully when repeated.

use erdwright::core::logging::{init_default_logging, init_logging, LogFormat, LogSettings};
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
    assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
    assert!(LogFormat::from_str("xml").is_err());
}

#[test]
fn test_log_format_variants() {
    let variants = LogFormat::variants();
    assert_eq!(variants, &["compact", "pretty", "json"]);
    for name in variants {
        assert!(LogFormat::from_str(name).is_ok());
    }
}

#[test]
fn test_environment_overrides_cli_flags() {
    let env = |key: &str| match key {
        "ERDWRIGHT_LOG_LEVEL" => Some("debug".to_string()),
        "RUST_LOG" => Some("error".to_string()),
        _ => None,
    };
    let settings = LogSettings::resolve(env, Some("warn"), Some("json")).unwrap();
    assert_eq!(
        settings,
        LogSettings {
            filter: "debug".to_string(),
            format: LogFormat::Json,
        }
    );
}

#[test]
fn test_init_logging_repeatedly() {
    let _ = init_logging(Some("debug"), Some("compact"));
    let _ = init_logging(Some("trace"), Some("json"));
    let _ = init_logging(Some("off"), Some("pretty"));
    let _ = init_default_logging();
}

#[test]
fn test_init_logging_invalid_format() {
    let result = init_logging(Some("info"), Some("invalid_format"));
    assert!(result.is_err());
}

#[test]
fn test_building_with_logging_enabled() {
    let _ = init_logging(Some("trace"), Some("compact"));

    let catalog = erdwright::ModelCatalog::from_json_str(include_str!("fixtures/game.json")).unwrap();
    let diagram = erdwright::create(
        &catalog,
        &erdwright::default_registry(),
        &["graph"],
        erdwright::DiagramOptions::default(),
    )
    .unwrap();
    assert_eq!(diagram.node_count(), 2);
}
