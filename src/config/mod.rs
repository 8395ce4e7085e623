mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variables recognized as configuration overrides.
pub mod env {
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    pub const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
    pub const SUPABASE_URL: &str = "SUPABASE_URL";
    pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
    pub const STORAGE_LOCAL_ROOT: &str = "STORAGE_LOCAL_ROOT";
    pub const AUDIO_BUCKET: &str = "AUDIO_BUCKET";
    pub const CHUNK_SECONDS: &str = "CHUNK_SECONDS";
    pub const OUTPUT_PREFIX: &str = "OUTPUT_PREFIX";
    pub const AUDIO_CHANNELS: &str = "AUDIO_CHANNELS";
    pub const AUDIO_RATE: &str = "AUDIO_RATE";
    pub const AUDIO_CODEC: &str = "AUDIO_CODEC";
    pub const AUDIO_BITRATE: &str = "AUDIO_BITRATE";
    pub const DOWNLOAD_TIMEOUT_SECS: &str = "DOWNLOAD_TIMEOUT_SECS";
    pub const FFMPEG_PATH: &str = "FFMPEG_PATH";
    pub const FFMPEG_TIMEOUT_SECS: &str = "FFMPEG_TIMEOUT_SECS";
}

/// An environment variable held a value that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {key}: {value:?} ({reason})")]
pub struct EnvOverrideError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Read configuration from a TOML file without applying overrides.
pub fn read_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Find a config file in the default locations.
fn find_default_config() -> Option<PathBuf> {
    let default_paths = [
        "./splitforge.toml",
        "~/.config/splitforge/config.toml",
        "/etc/splitforge/config.toml",
    ];

    default_paths.iter().find_map(|path_str| {
        let path = PathBuf::from(shellexpand::tilde(path_str).as_ref());
        path.exists().then_some(path)
    })
}

/// Build the process configuration: defaults, then the TOML file (explicit
/// path or first default location found), then environment overrides.
/// The result is validated before it is returned.
pub fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let mut config = match custom_path.map(Path::to_path_buf).or_else(find_default_config) {
        Some(path) => {
            tracing::debug!("Loading config from {:?}", path);
            read_config_file(&path)?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;

    Ok(config)
}

fn parse_env<T>(key: &'static str, value: String) -> std::result::Result<T, EnvOverrideError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| EnvOverrideError {
        key,
        reason: e.to_string(),
        value,
    })
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(
    config: &mut Config,
    lookup: F,
) -> std::result::Result<(), EnvOverrideError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(env::HOST) {
        config.server.host = v;
    }
    if let Some(v) = get(env::PORT) {
        config.server.port = parse_env(env::PORT, v)?;
    }
    if let Some(v) = get(env::STORAGE_BACKEND) {
        config.storage.backend = parse_env(env::STORAGE_BACKEND, v)?;
    }
    if let Some(v) = get(env::SUPABASE_URL) {
        config.storage.url = Some(v);
    }
    if let Some(v) = get(env::SUPABASE_SERVICE_ROLE_KEY) {
        config.storage.service_key = Some(v);
    }
    if let Some(v) = get(env::STORAGE_LOCAL_ROOT) {
        config.storage.local_root = Some(PathBuf::from(v));
    }
    if let Some(v) = get(env::AUDIO_BUCKET) {
        config.split.default_bucket = v;
    }
    if let Some(v) = get(env::CHUNK_SECONDS) {
        config.split.default_chunk_seconds = parse_env(env::CHUNK_SECONDS, v)?;
    }
    if let Some(v) = get(env::OUTPUT_PREFIX) {
        config.split.default_output_prefix = v;
    }
    if let Some(v) = get(env::AUDIO_CHANNELS) {
        config.audio.channels = parse_env(env::AUDIO_CHANNELS, v)?;
    }
    if let Some(v) = get(env::AUDIO_RATE) {
        config.audio.sample_rate = parse_env(env::AUDIO_RATE, v)?;
    }
    if let Some(v) = get(env::AUDIO_CODEC) {
        config.audio.codec = v;
    }
    if let Some(v) = get(env::AUDIO_BITRATE) {
        config.audio.bitrate = v;
    }
    if let Some(v) = get(env::DOWNLOAD_TIMEOUT_SECS) {
        config.fetch.timeout_secs = parse_env(env::DOWNLOAD_TIMEOUT_SECS, v)?;
    }
    if let Some(v) = get(env::FFMPEG_PATH) {
        config.tools.ffmpeg_path = Some(PathBuf::from(shellexpand::tilde(&v).as_ref()));
    }
    if let Some(v) = get(env::FFMPEG_TIMEOUT_SECS) {
        config.tools.timeout_secs = parse_env(env::FFMPEG_TIMEOUT_SECS, v)?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    match config.storage.backend {
        StorageBackend::Supabase => {
            let has_url = config.storage.url.as_deref().is_some_and(|s| !s.is_empty());
            let has_key = config
                .storage
                .service_key
                .as_deref()
                .is_some_and(|s| !s.is_empty());
            if !has_url || !has_key {
                anyhow::bail!("Missing SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY");
            }
        }
        StorageBackend::Local => {
            if config.storage.local_root.is_none() {
                anyhow::bail!("Local storage backend requires storage.local_root (STORAGE_LOCAL_ROOT)");
            }
        }
    }

    if config.split.default_chunk_seconds == 0 {
        anyhow::bail!("Default chunk duration must be positive");
    }
    if config.split.default_bucket.trim().is_empty() {
        anyhow::bail!("Default bucket cannot be empty");
    }
    if config.split.default_output_prefix.trim().trim_matches('/').is_empty() {
        anyhow::bail!("Default output prefix cannot be empty");
    }

    if config.audio.channels == 0 || config.audio.sample_rate == 0 {
        anyhow::bail!("Audio channels and sample rate must be positive");
    }
    if config.audio.codec.trim().is_empty() || config.audio.bitrate.trim().is_empty() {
        anyhow::bail!("Audio codec and bitrate cannot be empty");
    }

    if config.tools.timeout_secs == 0 {
        anyhow::bail!("Tool timeout must be positive");
    }

    if let Some(ref path) = config.tools.ffmpeg_path {
        if !path.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", path);
        }
    }

    Ok(())
}
