use lb_core::config::{Config, ConfigError};
use lb_core::filter::LeadFilter;

#[test]
fn default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.backend.url, "http://127.0.0.1:8001");
    assert!(cfg.backend.request_timeout_secs.is_none());
    assert!(cfg.auth.username.is_none());
    assert_eq!(cfg.ui.tick_ms, 250);
    assert_eq!(cfg.ui.default_filter, "all");
    assert_eq!(cfg.logging.level, "info");
    assert!(!cfg.logging.json);
    assert_eq!(cfg.reports.dir(), std::path::PathBuf::from("."));
}

#[test]
fn config_roundtrip() {
    let mut cfg = Config::default();
    cfg.auth.username = Some("ana".into());
    cfg.backend.request_timeout_secs = Some(15);
    let toml_str = cfg.to_toml().expect("serialize to toml");
    assert!(toml_str.contains("127.0.0.1:8001"));
    assert!(!toml_str.contains("password"));

    let parsed: Config = toml::from_str(&toml_str).expect("parse toml back");
    assert_eq!(parsed, cfg);
    parsed.validate().expect("config validates");
}

#[test]
fn config_partial_toml() {
    let partial = r#"
[backend]
url = "https://crm.example.com"

[ui]
default_filter = "not_contacted"
"#;
    let cfg: Config = toml::from_str(partial).expect("parse partial");
    assert_eq!(cfg.backend.url, "https://crm.example.com");
    assert_eq!(cfg.ui.filter(), LeadFilter::NotContacted);
    // defaults should fill in the rest
    assert_eq!(cfg.ui.tick_ms, 250);
    assert_eq!(cfg.logging.level, "info");
    cfg.validate().expect("config validates");
}

#[test]
fn load_from_file_and_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.reports.output_dir = Some(dir.path().join("reports"));
    cfg.logging.json = true;
    cfg.save_to(&path).expect("save");

    let loaded = Config::load_from(&path).expect("load");
    assert_eq!(loaded, cfg);
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Config::load_from(dir.path().join("absent.toml")).expect_err("missing file");
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn load_from_rejects_garbage_and_invalid_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "[backend\nurl = ").unwrap();
    assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));

    std::fs::write(&path, "[ui]\ntick_ms = 0\n").unwrap();
    let err = Config::load_from(&path).expect_err("zero tick");
    assert!(err.to_string().contains("tick_ms"));
}
