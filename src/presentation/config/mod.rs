mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    GeminiSettings, LoggingSettings, ServerSettings, Settings, SettingsError, StorageSettings,
    TranscriptionSettings,
};
