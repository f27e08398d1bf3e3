//! Integration tests for configuration validation

#![allow(clippy::expect_used, clippy::unwrap_used)]

use gate_protocol::config::{DeviceEntry, GateConfig, LoggingConfig, ServerConfig};
use gate_protocol::core::device_id::DeviceId;
use gate_protocol::protocol::KeyStore;
use std::time::Duration;
use tracing::Level;

const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

fn device(id: &str) -> DeviceEntry {
    DeviceEntry {
        id: id.to_string(),
        key: KEY_HEX.to_string(),
    }
}

#[test]
fn test_default_config_validates() {
    let config = GateConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_invalid_server_address() {
    let mut config = GateConfig::default();
    config.server.address = "invalid_address".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Invalid server address")));
}

#[test]
fn test_empty_server_address() {
    let mut config = GateConfig::default();
    config.server.address = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_invalid_client_address() {
    let mut config = GateConfig::default();
    config.client.address = "localhost".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Invalid client address")));
}

#[test]
fn test_short_response_timeout() {
    let mut config = GateConfig::default();
    config.client.response_timeout = Duration::from_millis(1);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Response timeout too short")));
}

#[test]
fn test_long_response_timeout() {
    let mut config = GateConfig::default();
    config.client.response_timeout = Duration::from_secs(120);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Response timeout too long")));
}

#[test]
fn test_replay_settings() {
    let mut config = GateConfig::default();
    config.server.replay_ttl = Duration::from_millis(10);
    config.server.replay_max_entries = 0;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Replay TTL too short")));
    assert!(errors
        .iter()
        .any(|e| e.contains("Replay cache size must be greater than 0")));

    // Not checked when replay protection is off
    config.server.replay_protection = false;
    assert!(config.validate().is_empty());
}

#[test]
fn test_empty_app_name() {
    let mut config = GateConfig::default();
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Application name cannot be empty")));
}

#[test]
fn test_device_entries() {
    let mut config = GateConfig::default();
    config.devices.push(device("aa:bb:cc:dd:ee:ff"));
    assert!(config.validate().is_empty());

    config.devices.push(device("AA-BB-CC-DD-EE-FF"));
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Duplicate device entry")));

    config.devices.pop();
    config.devices.push(DeviceEntry {
        id: "11:22:33:44:55:66".to_string(),
        key: "abcd".to_string(),
    });
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Invalid device entry")));
}

#[test]
fn test_key_store_from_devices() {
    let mut config = GateConfig::default();
    config.devices.push(device("aa:bb:cc:dd:ee:ff"));

    let store = config.key_store().unwrap();
    let id: DeviceId = "aa:bb:cc:dd:ee:ff".parse().unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.key_for(&id).unwrap().as_bytes()[31], 0x1f);
}

#[test]
fn test_validate_strict() {
    assert!(GateConfig::default().validate_strict().is_ok());

    let mut config = GateConfig::default();
    config.server.address = "nope".to_string();
    config.logging.app_name = String::new();

    let err = config.validate_strict().unwrap_err().to_string();
    assert!(err.contains("Configuration validation failed"));
    assert!(err.contains("Invalid server address"));
    assert!(err.contains("Application name cannot be empty"));
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config = GateConfig::from_toml(
        r#"
        [server]
        address = "0.0.0.0:5555"
        replay_ttl = 60000

        [logging]
        log_level = "debug"

        [[devices]]
        id = "aa:bb:cc:dd:ee:ff"
        key = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
        "#,
    )
    .expect("config should parse");

    assert_eq!(config.server.address, "0.0.0.0:5555");
    assert_eq!(config.server.replay_ttl, Duration::from_secs(60));
    assert_eq!(config.server.replay_max_entries, ServerConfig::default().replay_max_entries);
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert_eq!(config.logging.app_name, LoggingConfig::default().app_name);
    assert_eq!(config.devices, vec![device("aa:bb:cc:dd:ee:ff")]);
    assert!(config.validate().is_empty());
}

#[test]
fn test_invalid_toml() {
    assert!(GateConfig::from_toml("[server").is_err());
    assert!(GateConfig::from_toml("[logging]\nlog_level = \"loud\"").is_err());
}

#[test]
fn test_example_config_round_trips() {
    let example = GateConfig::example_config();
    let config = GateConfig::from_toml(&example).expect("example config should parse");
    assert_eq!(config.devices.len(), 1);
    assert!(config.validate().is_empty());
}
