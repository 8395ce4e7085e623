//! Configuration loading against the real process environment.

use serial_test::serial;
use splitforge::config::{load_config, StorageBackend};
use std::io::Write;

const KEYS: &[&str] = &[
    "HOST",
    "PORT",
    "STORAGE_BACKEND",
    "STORAGE_LOCAL_ROOT",
    "SUPABASE_URL",
    "SUPABASE_SERVICE_ROLE_KEY",
    "AUDIO_BUCKET",
    "CHUNK_SECONDS",
    "OUTPUT_PREFIX",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let file = write_config(
        r#"
[storage]
url = "https://from-file.supabase.co"
service_key = "file-key"

[split]
default_bucket = "file-bucket"
default_chunk_seconds = 120
"#,
    );

    std::env::set_var("AUDIO_BUCKET", "env-bucket");
    std::env::set_var("PORT", "9090");
    let config = load_config(Some(file.path())).unwrap();
    clear_env();

    assert_eq!(config.split.default_bucket, "env-bucket");
    assert_eq!(config.split.default_chunk_seconds, 120);
    assert_eq!(config.server.port, 9090);
    assert_eq!(
        config.storage.url.as_deref(),
        Some("https://from-file.supabase.co")
    );
}

#[test]
#[serial]
fn missing_supabase_credentials_fail_startup() {
    clear_env();
    let file = write_config("");

    let err = load_config(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("SUPABASE_URL"), "{err}");
}

#[test]
#[serial]
fn local_backend_from_env() {
    clear_env();
    let root = tempfile::tempdir().unwrap();
    let file = write_config("");

    std::env::set_var("STORAGE_BACKEND", "local");
    std::env::set_var("STORAGE_LOCAL_ROOT", root.path());
    std::env::set_var("CHUNK_SECONDS", "45");
    let config = load_config(Some(file.path())).unwrap();
    clear_env();

    assert_eq!(config.storage.backend, StorageBackend::Local);
    assert_eq!(config.storage.local_root.as_deref(), Some(root.path()));
    assert_eq!(config.split.default_chunk_seconds, 45);
}

#[test]
#[serial]
fn unparseable_env_value_names_key() {
    clear_env();
    let file = write_config("");

    std::env::set_var("CHUNK_SECONDS", "ten");
    let err = load_config(Some(file.path())).unwrap_err();
    clear_env();

    assert!(err.to_string().contains("CHUNK_SECONDS"), "{err}");
}
