use std::fmt;
use std::path::Path;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;

const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";
const LEGACY_API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub gemini: GeminiSettings,
    pub transcription: TranscriptionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Frontend bundle served for every path the API does not claim.
    pub static_dir: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub upload_dir: String,
    pub subtitle_dir: String,
    pub task_dir: String,
}

#[derive(Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub file_poll_interval_ms: u64,
    pub file_poll_max_attempts: u32,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("file_poll_interval_ms", &self.file_poll_interval_ms)
            .field("file_poll_max_attempts", &self.file_poll_max_attempts)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub source_language: String,
    pub target_language: String,
    pub max_concurrent_jobs: usize,
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json_format: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("gemini.api_key is required (set GEMINI_API_KEY or APP__GEMINI__API_KEY)")]
    MissingApiKey,
    #[error("{0} must be greater than zero")]
    ZeroBound(&'static str),
}

impl Settings {
    /// Loads settings from the working directory: defaults, then
    /// `appsettings.{env}.toml`, then `APP__*` environment variables.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        Self::load_from(environment, Path::new("."))
    }

    pub fn load_from(environment: Environment, config_dir: &Path) -> Result<Self, SettingsError> {
        let settings_file = config_dir.join(format!("appsettings.{}", environment.as_str()));
        let legacy_api_key = std::env::var(LEGACY_API_KEY_VAR).unwrap_or_default();

        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000_i64)?
            .set_default("server.static_dir", "../frontend")?
            .set_default("server.max_upload_bytes", 2_i64 * 1024 * 1024 * 1024)?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.subtitle_dir", "static")?
            .set_default("storage.task_dir", "tasks")?
            .set_default("gemini.api_key", legacy_api_key)?
            .set_default("gemini.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("gemini.model", "gemini-1.5-flash")?
            .set_default("gemini.file_poll_interval_ms", 2000_i64)?
            .set_default("gemini.file_poll_max_attempts", 90_i64)?
            .set_default("gemini.request_timeout_secs", 600_i64)?
            .set_default("transcription.source_language", "English")?
            .set_default("transcription.target_language", "Burmese")?
            .set_default("transcription.max_concurrent_jobs", 4_i64)?
            .set_default("transcription.queue_capacity", 64_i64)?
            .set_default("logging.json_format", false)?
            .add_source(File::with_name(&settings_file.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Fails fast on values that would otherwise only surface inside a job.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        if self.transcription.max_concurrent_jobs == 0 {
            return Err(SettingsError::ZeroBound("transcription.max_concurrent_jobs"));
        }
        if self.transcription.queue_capacity == 0 {
            return Err(SettingsError::ZeroBound("transcription.queue_capacity"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(SettingsError::ZeroBound("server.max_upload_bytes"));
        }
        if self.gemini.request_timeout_secs == 0 {
            return Err(SettingsError::ZeroBound("gemini.request_timeout_secs"));
        }
        Ok(())
    }
}
