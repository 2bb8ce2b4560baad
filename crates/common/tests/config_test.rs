use relaymq_common::config::SystemConfig;
use std::fs;
use tempfile::TempDir;

#[test]
fn loads_config_from_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("relaymq.toml");

    let config_content = r#"
[server]
host = "127.0.0.1"
port = 9001

[broker]
history_capacity = 50
dispatch_queue_depth = 256
"#;

    fs::write(&config_path, config_content).unwrap();

    let config = SystemConfig::load(config_path.to_str().unwrap()).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9001);
    assert_eq!(config.broker.history_capacity, 50);
    assert_eq!(config.broker.dispatch_queue_depth, 256);
}

#[test]
fn malformed_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("relaymq.toml");
    fs::write(&config_path, "[server\nport = {").unwrap();

    assert!(SystemConfig::load(config_path.to_str().unwrap()).is_err());
    assert!(SystemConfig::load_or_default(config_path.to_str().unwrap()).is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("does-not-exist.toml");

    let config = SystemConfig::load_or_default(config_path.to_str().unwrap()).unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.broker.history_capacity, 100);

    assert!(SystemConfig::load(config_path.to_str().unwrap()).is_err());
}
