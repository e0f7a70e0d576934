use async_openai::error::OpenAIError;
use async_openai::{Client, config::OpenAIConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

// Application settings, persisted as JSON. Missing fields take their default.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub openai_api_key: Option<String>, // Falls back to OPENAI_API_KEY when unset.
    pub openai_api_base: Option<String>, // OpenAI-compatible endpoint override.
    pub model: String,
    pub embedding_model: String,
    pub analysis_temperature: f32,
    pub chat_temperature: f32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retrieval_k: usize,
    pub condense_follow_ups: bool, // Rephrase follow-ups into standalone questions before retrieval.
    pub reuse_identical_requests: bool, // Skip regeneration when the draft has not changed.
    pub data_dragon_url: String,
    pub fallback_game_version: String,
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            openai_api_key: None,
            openai_api_base: None,
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            analysis_temperature: 0.7,
            chat_temperature: 0.0,
            request_timeout_secs: 30,
            max_retries: 2,
            retry_base_delay_ms: 500,
            retrieval_k: 3,
            condense_follow_ups: true,
            reuse_identical_requests: false,
            data_dragon_url: "https://ddragon.leagueoflegends.com".to_string(),
            fallback_game_version: "13.24.1".to_string(),
            debug_mode: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // Where settings and the log file live.
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join("draftmaster").join("data"))
            .unwrap_or_else(|| PathBuf::from("./data"))
    }

    // Load settings from the default location.
    pub fn load() -> io::Result<Self> {
        Self::load_settings_from_file(Self::data_dir().join(SETTINGS_FILE_NAME))
    }

    // Save settings to the default location.
    pub fn save(&self) -> io::Result<()> {
        self.save_to_file(Self::data_dir().join(SETTINGS_FILE_NAME))
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    // The configured key, or the environment one. Blank keys count as absent.
    pub fn resolved_openai_api_key(&self) -> Option<String> {
        self.openai_api_key
            .clone()
            .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug_mode {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    // Asks the backend for its model list; any error means the key is not usable right now.
    pub async fn validate_api_key(&self, api_key: &str) -> bool {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = &self.openai_api_base {
            config = config.with_api_base(base);
        }
        let client = Client::with_config(config);
        match tokio::time::timeout(self.request_timeout(), client.models().list()).await {
            Ok(Ok(_)) => true,
            Ok(Err(OpenAIError::Reqwest(e))) => {
                log::warn!("Could not reach the OpenAI API to validate the key: {}", e);
                false
            }
            Ok(Err(e)) => {
                log::warn!("OpenAI API key rejected: {}", e);
                false
            }
            Err(_) => {
                log::warn!("OpenAI API key validation timed out");
                false
            }
        }
    }
}
