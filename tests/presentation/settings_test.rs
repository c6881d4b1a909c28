use subweaver::presentation::Environment;
use subweaver::presentation::config::{Settings, SettingsError};

use crate::helpers::test_settings;

#[test]
fn given_settings_file_when_loading_then_file_overrides_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("appsettings.test.toml"),
        r#"
[server]
port = 9100

[gemini]
api_key = "file-key"

[transcription]
target_language = "Thai"
"#,
    )
    .unwrap();

    let settings = Settings::load_from(Environment::Test, dir.path()).unwrap();

    assert_eq!(settings.server.port, 9100);
    assert_eq!(settings.gemini.api_key, "file-key");
    assert_eq!(settings.transcription.target_language, "Thai");
    assert_eq!(settings.transcription.source_language, "English");
    assert_eq!(settings.gemini.model, "gemini-1.5-flash");
    assert_eq!(settings.storage.upload_dir, "uploads");
    assert_eq!(settings.storage.subtitle_dir, "static");
}

#[test]
fn given_blank_api_key_in_file_when_loading_then_fails_fast() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("appsettings.test.toml"),
        "[gemini]\napi_key = \"\"\n",
    )
    .unwrap();

    let result = Settings::load_from(Environment::Test, dir.path());

    assert!(matches!(result, Err(SettingsError::MissingApiKey)));
}

#[test]
fn given_zero_concurrency_when_validating_then_returns_zero_bound() {
    let mut settings = test_settings("static");
    settings.transcription.max_concurrent_jobs = 0;

    let result = settings.validate();

    assert!(matches!(
        result,
        Err(SettingsError::ZeroBound("transcription.max_concurrent_jobs"))
    ));
}

#[test]
fn given_zero_queue_capacity_when_validating_then_returns_zero_bound() {
    let mut settings = test_settings("static");
    settings.transcription.queue_capacity = 0;

    assert!(matches!(
        settings.validate(),
        Err(SettingsError::ZeroBound("transcription.queue_capacity"))
    ));
}

#[test]
fn given_gemini_settings_when_debug_formatted_then_api_key_is_hidden() {
    let settings = test_settings("static");

    let rendered = format!("{:?}", settings.gemini);

    assert!(!rendered.contains("test-key"));
    assert!(rendered.contains("[REDACTED]"));
}
