use ferrous_q_domain::config::{CliOverrides, Config, ConfigError};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.query.port, 53);
    assert_eq!(config.query.timeout_ms, 5000);
    assert!(!config.query.fallback);
    assert!(!config.query.tcp);
    assert!(config.query.recursion_desired);
    assert_eq!(config.query.udp_payload_size, 4096);
    assert_eq!(config.query.resolv_conf, "/etc/resolv.conf");
    assert_eq!(config.logging.level, "warn");
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_timeout_disables_it() {
    let mut config = Config::default();
    assert_eq!(config.query.timeout(), Some(Duration::from_millis(5000)));

    config.query.timeout_ms = 0;
    assert_eq!(config.query.timeout(), None);
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = Config::from_toml(
        r#"
        [query]
        port = 5353
        fallback = true
        "#,
    )
    .unwrap();

    assert_eq!(config.query.port, 5353);
    assert!(config.query.fallback);
    assert_eq!(config.query.timeout_ms, 5000);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_invalid_toml_is_a_parse_error() {
    let result = Config::from_toml("[query\nport = ");

    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_from_explicit_path_with_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[query]\nport = 5300\ntimeout_ms = 100\n[logging]\nlevel = \"info\"").unwrap();

    let overrides = CliOverrides {
        port: Some(5301),
        tcp: true,
        recursion_desired: Some(false),
        ..Default::default()
    };
    let config = Config::load(file.path().to_str(), overrides).unwrap();

    assert_eq!(config.query.port, 5301);
    assert_eq!(config.query.timeout_ms, 100);
    assert!(config.query.tcp);
    assert!(!config.query.recursion_desired);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_missing_explicit_file_is_a_read_error() {
    let result = Config::load(Some("/nonexistent/q.toml"), CliOverrides::default());

    assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
}

#[test]
fn test_validate_rejects_port_zero() {
    let mut config = Config::default();
    config.query.port = 0;

    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_validate_rejects_small_payload() {
    let mut config = Config::default();
    config.query.udp_payload_size = 511;

    assert!(config.validate().is_err());
}
