//! Loading renderer configuration from disk.

use std::io::Write;

use bimview_core::{ConfigError, RendererConfig, ViewLevel};

#[test]
fn loads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
width = 132
height = 40
default_view = "detail"
color = true
refresh_interval_ms = 250
"#
    )
    .unwrap();

    let cfg = RendererConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(cfg.width, 132);
    assert_eq!(cfg.height, 40);
    assert_eq!(cfg.default_view, ViewLevel::Detail);
    assert!(cfg.color);
    assert_eq!(cfg.refresh_interval().as_millis(), 250);
    assert!(cfg.show_legend);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RendererConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn malformed_toml_is_parse_error() {
    let err = RendererConfig::from_toml_str("width = \"wide\"").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
    assert!(err.to_string().starts_with("config TOML error"));
}

#[test]
fn unknown_view_level_is_rejected() {
    let err = RendererConfig::from_json_str(r#"{"default_view": "isometric"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}
