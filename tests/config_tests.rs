// ABOUTME: Tests for configuration loading and validation
// ABOUTME: Verifies TOML file discovery, env var overrides, and required field validation

use quoordinates::config::Config;
use serial_test::serial;
use std::io::Write;
use tempfile::TempDir;

/// Helper to clear all config-related env vars
fn clear_config_env_vars() {
    for var in [
        "QUOORDINATES_CONFIG_PATH",
        "GATEWAY_HOST",
        "GATEWAY_PORT",
        "GATEWAY_API_KEY",
        "PLATFORM_API_BASE",
        "PLATFORM_APPLICATION_ID",
        "PLATFORM_BOT_TOKEN",
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "QUOTE_SEARCH_URL",
    ] {
        std::env::remove_var(var);
    }
}

const VALID: &str = r#"
[gateway]
port = 8080

[platform]
application_id = "1234"
bot_token = "bot-token"

[openai]
api_key = "sk-test"

[quotes]
search_url = "http://localhost:9000/search"

[books]
"Meditations" = "https://books.example/meditations"
"#;

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
#[serial]
fn test_config_loads_from_env_path() {
    clear_config_env_vars();
    let dir = TempDir::new().unwrap();
    std::env::set_var("QUOORDINATES_CONFIG_PATH", write_config(&dir, VALID));

    let config = Config::load().unwrap();

    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.platform.application_id, "1234");
    assert_eq!(config.quotes.search_url, "http://localhost:9000/search");
    assert_eq!(config.books.len(), 1);

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_env_vars_override_file() {
    clear_config_env_vars();
    let dir = TempDir::new().unwrap();
    std::env::set_var("QUOORDINATES_CONFIG_PATH", write_config(&dir, VALID));
    std::env::set_var("GATEWAY_PORT", "9999");
    std::env::set_var("GATEWAY_API_KEY", "relay-key");
    std::env::set_var("QUOTE_SEARCH_URL", "http://search.internal/q");
    std::env::set_var("OPENAI_BASE_URL", "http://llm.internal/v1");

    let config = Config::load().unwrap();

    assert_eq!(config.gateway.port, 9999);
    assert_eq!(config.gateway.api_key.as_deref(), Some("relay-key"));
    assert_eq!(config.quotes.search_url, "http://search.internal/q");
    assert_eq!(config.openai.base_url, "http://llm.internal/v1");

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_invalid_port_env_var_rejected() {
    clear_config_env_vars();
    let dir = TempDir::new().unwrap();
    std::env::set_var("QUOORDINATES_CONFIG_PATH", write_config(&dir, VALID));
    std::env::set_var("GATEWAY_PORT", "not-a-port");

    let err = Config::load().unwrap_err();
    assert!(err.to_string().contains("GATEWAY_PORT"));

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_missing_credentials_fail_validation() {
    clear_config_env_vars();
    let dir = TempDir::new().unwrap();
    std::env::set_var(
        "QUOORDINATES_CONFIG_PATH",
        write_config(&dir, "[gateway]\nport = 8080\n"),
    );

    let err = Config::load().unwrap_err();
    assert!(err.to_string().contains("platform.bot_token"));

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_env_vars_alone_satisfy_validation() {
    clear_config_env_vars();
    let dir = TempDir::new().unwrap();
    std::env::set_var("QUOORDINATES_CONFIG_PATH", write_config(&dir, ""));
    std::env::set_var("PLATFORM_APPLICATION_ID", "app");
    std::env::set_var("PLATFORM_BOT_TOKEN", "token");
    std::env::set_var("OPENAI_API_KEY", "sk");
    std::env::set_var("QUOTE_SEARCH_URL", "http://localhost:9000/search");

    let config = Config::load().unwrap();
    assert_eq!(config.platform.bot_token, "token");
    assert!(config.books.is_empty());

    clear_config_env_vars();
}
