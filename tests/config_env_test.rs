//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Note that Config::from_env() also loads
//! from .env file via dotenvy, so these tests focus on override behavior.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use firstp::config::{Config, LogFormat};
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn test_config_requires_api_key() {
    env::remove_var("ANTHROPIC_API_KEY");

    let result = Config::from_env();

    // Without a key (from env or .env), loading must fail with a clear
    // configuration error.
    if let Err(e) = result {
        assert!(e.to_string().contains("ANTHROPIC_API_KEY"));
    }

    env::set_var("ANTHROPIC_API_KEY", "test-key");
}

#[test]
#[serial]
fn test_config_custom_base_url() {
    env::set_var("ANTHROPIC_API_KEY", "test-key");
    env::set_var("ANTHROPIC_BASE_URL", "https://proxy.example.com");

    let config = Config::from_env().unwrap();
    assert_eq!(config.anthropic.base_url, "https://proxy.example.com");

    env::remove_var("ANTHROPIC_BASE_URL");
}

#[test]
#[serial]
fn test_config_defaults() {
    env::set_var("ANTHROPIC_API_KEY", "test-key");
    env::remove_var("ANTHROPIC_BASE_URL");
    env::remove_var("REQUEST_TIMEOUT_MS");
    env::remove_var("FIRSTP_MODEL");
    env::remove_var("FIRSTP_MAX_TOKENS");
    env::remove_var("LOG_LEVEL");
    env::remove_var("LOG_FORMAT");

    let config = Config::from_env().unwrap();

    assert_eq!(config.anthropic.base_url, "https://api.anthropic.com");
    assert_eq!(config.request.timeout_ms, 120_000);
    assert_eq!(config.generation.max_tokens, 4000);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
#[serial]
fn test_config_custom_generation() {
    env::set_var("ANTHROPIC_API_KEY", "test-key");
    env::set_var("FIRSTP_MODEL", "claude-test-model");
    env::set_var("FIRSTP_MAX_TOKENS", "8000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.generation.model, "claude-test-model");
    assert_eq!(config.generation.max_tokens, 8000);

    env::remove_var("FIRSTP_MODEL");
    env::remove_var("FIRSTP_MAX_TOKENS");
}

#[test]
#[serial]
fn test_config_json_log_format() {
    env::set_var("ANTHROPIC_API_KEY", "test-key");
    env::set_var("LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::remove_var("LOG_FORMAT");
}

#[test]
#[serial]
fn test_config_unparseable_numbers_fall_back_to_defaults() {
    env::set_var("ANTHROPIC_API_KEY", "test-key");
    env::set_var("REQUEST_TIMEOUT_MS", "not-a-number");
    env::set_var("FIRSTP_MAX_TOKENS", "many");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 120_000);
    assert_eq!(config.generation.max_tokens, 4000);

    env::remove_var("REQUEST_TIMEOUT_MS");
    env::remove_var("FIRSTP_MAX_TOKENS");
}
