use draftmaster::Settings;
use log::LevelFilter;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.model, "gpt-4o-mini");
    assert_eq!(settings.embedding_model, "text-embedding-3-small");
    assert_eq!(settings.retrieval_k, 3);
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    assert_eq!(settings.retry_base_delay(), Duration::from_millis(500));
    assert_eq!(settings.fallback_game_version, "13.24.1");
    assert!(settings.condense_follow_ups);
    assert!(!settings.reuse_identical_requests);
    assert_eq!(settings.log_level(), LevelFilter::Info);
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = Settings::default();
    settings.model = "gpt-4o".to_string();
    settings.retrieval_k = 2;
    settings.debug_mode = true;
    settings.save_to_file(&path).unwrap();

    let loaded = Settings::load_settings_from_file(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.log_level(), LevelFilter::Debug);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"model": "gpt-4.1-mini", "max_retries": 0}"#).unwrap();

    let loaded = Settings::load_settings_from_file(&path).unwrap();
    assert_eq!(loaded.model, "gpt-4.1-mini");
    assert_eq!(loaded.max_retries, 0);
    assert_eq!(loaded.chat_temperature, Settings::default().chat_temperature);
    assert_eq!(loaded.data_dragon_url, "https://ddragon.leagueoflegends.com");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Settings::load_settings_from_file(&path).is_err());
    assert!(Settings::load_settings_from_file(dir.path().join("missing.json")).is_err());
}

#[test]
fn test_configured_key_is_trimmed() {
    let settings = Settings {
        openai_api_key: Some("  sk-test  ".to_string()),
        ..Settings::default()
    };
    assert_eq!(settings.resolved_openai_api_key().as_deref(), Some("sk-test"));
}
