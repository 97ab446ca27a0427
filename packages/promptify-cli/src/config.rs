use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use gemini_client::{GeminiClient, DEFAULT_MODEL};
use promptify::types::config::{DEFAULT_PACING_INTERVAL, DEFAULT_PROGRESS_RESET_DELAY};
use promptify::ControllerConfig;

/// CLI configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Shared default key; requests fall back to it when no personal key is set
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub pacing_interval: Duration,
    pub progress_reset_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY")
                .or_else(|_| env::var("GOOGLE_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            pacing_interval: millis_var("PROMPTIFY_PACING_MS", DEFAULT_PACING_INTERVAL)?,
            progress_reset_delay: millis_var(
                "PROMPTIFY_PROGRESS_RESET_MS",
                DEFAULT_PROGRESS_RESET_DELAY,
            )?,
        })
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::new()
            .with_pacing_interval(self.pacing_interval)
            .with_progress_reset_delay(self.progress_reset_delay)
    }

    pub fn gemini_client(&self) -> GeminiClient {
        let client = match &self.gemini_api_key {
            Some(key) => GeminiClient::new(key),
            None => GeminiClient::keyless(),
        };
        client.with_model(&self.gemini_model)
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Duration::from_millis)
            .with_context(|| format!("{} must be a whole number of milliseconds", name)),
        Err(_) => Ok(default),
    }
}
