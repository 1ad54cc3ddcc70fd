use salat_common::LogFormat;
use salat_config::{DEFAULT_SOURCE_URL, SalatConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
source:
  url: "${SALAT_TEST_MIRROR}"
  container_id: "prayer_time"
  timeout_secs: 7
logging:
  format: json
  level: debug
  dir: "/tmp/salat-logs"
  "#;
    let p = write_yaml(&tmp, "salat.yaml", file_yaml);

    temp_env::with_var(
        "SALAT_TEST_MIRROR",
        Some("https://mirror.example/english/"),
        || {
            let config = SalatConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load system config");

            assert_eq!(config.source.url, "https://mirror.example/english/");
            assert_eq!(config.source.timeout_secs, 7);
            assert_eq!(config.logging.format, LogFormat::Json);
            assert_eq!(config.logging.level, "debug");
            assert_eq!(
                config.logging.dir.as_deref(),
                Some(std::path::Path::new("/tmp/salat-logs"))
            );
        },
    );
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "salat.yaml",
        "source:\n  timeout_secs: 7\n  container_id: from_file\n",
    );

    temp_env::with_vars(
        [
            ("SALAT__SOURCE__TIMEOUT_SECS", Some("3")),
            ("SALAT__LOGGING__STDERR", Some("true")),
        ],
        || {
            let config = SalatConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.source.timeout_secs, 3);
            assert_eq!(config.source.container_id, "from_file");
            assert!(config.logging.stderr);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = SalatConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("optional file may be missing");

    assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
    assert_eq!(config.source.timeout_secs, 15);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = SalatConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn blank_container_id_is_rejected() {
    let err = SalatConfigLoader::new()
        .with_yaml_str("source:\n  container_id: \"  \"\n")
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("container_id"));
}
