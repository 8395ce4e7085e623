use serde::{Deserialize, Serialize};
use splitforge_av::EncodingParams;
use splitforge_common::SplitDefaults;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub split: SplitConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow any origin, method and header (default: true)
    #[serde(default = "default_true")]
    pub cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Supabase Storage REST API
    #[default]
    Supabase,
    /// Directory on the local filesystem (`<root>/<bucket>/<path>`)
    Local,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supabase" => Ok(Self::Supabase),
            "local" | "fs" | "filesystem" => Ok(Self::Local),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supabase => f.write_str("supabase"),
            Self::Local => f.write_str("local"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Supabase project URL, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: Option<String>,

    /// Service role key sent as both bearer token and `apikey` header
    #[serde(default)]
    pub service_key: Option<String>,

    /// Root directory for the local backend
    #[serde(default)]
    pub local_root: Option<PathBuf>,

    /// Per-request timeout for storage API calls in seconds (default: 300)
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

fn default_storage_timeout() -> u64 {
    300
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: None,
            service_key: None,
            local_root: None,
            timeout_secs: default_storage_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitConfig {
    #[serde(default = "default_bucket")]
    pub default_bucket: String,

    /// Segment duration used when a request omits `chunkSeconds` (default: 600)
    #[serde(default = "default_chunk_seconds")]
    pub default_chunk_seconds: u64,

    #[serde(default = "default_output_prefix")]
    pub default_output_prefix: String,

    /// Parent directory for per-request workspaces (default: system temp dir)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_bucket() -> String {
    "audio-files".to_string()
}
fn default_chunk_seconds() -> u64 {
    600
}
fn default_output_prefix() -> String {
    "audio-chunks".to_string()
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            default_bucket: default_bucket(),
            default_chunk_seconds: default_chunk_seconds(),
            default_output_prefix: default_output_prefix(),
            work_dir: None,
        }
    }
}

impl SplitConfig {
    pub fn defaults(&self) -> SplitDefaults {
        SplitDefaults {
            bucket: self.default_bucket.clone(),
            chunk_seconds: self.default_chunk_seconds,
            output_prefix: self.default_output_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    #[serde(default = "default_channels")]
    pub channels: u32,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_codec")]
    pub codec: String,

    #[serde(default = "default_bitrate")]
    pub bitrate: String,
}

fn default_channels() -> u32 {
    1
}
fn default_sample_rate() -> u32 {
    16_000
}
fn default_codec() -> String {
    "aac".to_string()
}
fn default_bitrate() -> String {
    "64k".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            sample_rate: default_sample_rate(),
            codec: default_codec(),
            bitrate: default_bitrate(),
        }
    }
}

impl AudioConfig {
    pub fn encoding(&self) -> EncodingParams {
        EncodingParams {
            channels: self.channels,
            sample_rate: self.sample_rate,
            codec: self.codec.clone(),
            bitrate: self.bitrate.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Timeout for direct URL downloads in seconds (default: 120)
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    120
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit ffmpeg executable; PATH and well-known locations are searched otherwise
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Wall-clock limit for one ffmpeg run in seconds (default: 600)
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_tool_timeout() -> u64 {
    600
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            timeout_secs: default_tool_timeout(),
        }
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
