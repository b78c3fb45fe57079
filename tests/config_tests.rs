//! Configuration parsing

use aveo::infrastructure::config::{get_database_path, parse_config, Config};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.api_base, "http://localhost:8000");
    assert_eq!(config.api_prefix, "");
    assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    assert_eq!(config.http.timeout_secs, None);
    assert!(config.logging.enable);
    assert_eq!(config.logging.level, "WARN");
}

#[test]
fn test_empty_file_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.cache_ttl_secs, 300);
    assert_eq!(config.theme, "leaf");
}

#[test]
fn test_config_toml_format() {
    let toml_content = r#"
api_base = "https://api.aveoearth.com/"
api_prefix = "/v1"
cache_ttl_secs = 60
theme = "earth"

[http]
timeout_secs = 15

[storage]
path = "/tmp/aveo-test.db"

[logging]
enable = true
path = "/tmp/aveo.log"
level = "DEBUG"
"#;

    let config = parse_config(toml_content).unwrap();
    assert_eq!(config.base_url(), "https://api.aveoearth.com/v1");
    assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    assert_eq!(config.http.timeout_secs, Some(15));
    assert!(config.http.user_agent.starts_with("aveo/"));
    assert_eq!(config.logging.level, "DEBUG");
    assert_eq!(
        get_database_path(&config),
        PathBuf::from("/tmp/aveo-test.db")
    );
}

#[test]
fn test_bad_toml_is_an_error() {
    assert!(parse_config("cache_ttl_secs = \"soon\"").is_err());
}

#[test]
fn test_default_database_path() {
    let path = get_database_path(&Config::default());
    assert!(path.ends_with("aveo/aveo.db"));
}

#[test]
fn test_api_base_override() {
    let config = Config::default().with_api_base(Some("https://staging.aveoearth.com"));
    assert_eq!(config.base_url(), "https://staging.aveoearth.com");

    let config = Config::default().with_api_base(Some("   "));
    assert_eq!(config.api_base, "http://localhost:8000");

    let config = Config::default().with_api_base(None);
    assert_eq!(config.api_base, "http://localhost:8000");
}
