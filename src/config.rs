use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap_serde_derive::ClapSerde;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

// 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(ClapSerde)]
pub struct Config {
    /// The address the listener binds to
    #[default("0.0.0.0".to_string())]
    #[arg(short, long, env)]
    pub address: String,

    /// The port the listener binds to
    #[default(3000)]
    #[arg(short, long, env)]
    pub port: u16,

    /// API key for the Gemini generative language API
    #[default(String::new())]
    #[arg(long, env, hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model used for both transcription and summarization
    #[default("gemini-1.5-flash".to_string())]
    #[arg(long, env)]
    pub gemini_model: String,

    /// Base URL of the Gemini REST API
    #[default(DEFAULT_GEMINI_API_BASE.to_string())]
    #[arg(long, env)]
    pub gemini_api_base: String,

    /// Timeout in seconds for a single model call, 0 waits indefinitely
    #[default(0)]
    #[arg(long, env)]
    pub model_timeout_secs: u64,

    /// Largest accepted upload in bytes
    #[default(DEFAULT_MAX_UPLOAD_BYTES)]
    #[arg(long, env)]
    pub max_upload_bytes: usize,

    /// Directory uploads are staged in, defaults to the system temp directory
    #[default(String::new())]
    #[arg(long, env)]
    pub upload_dir: String,

    /// OTLP collector endpoint, telemetry export is disabled when empty
    #[default(String::new())]
    #[arg(long, env)]
    pub otel_endpoint: String,
}

impl Config {
    pub fn from_toml(path: &str) -> Result<<Self as ClapSerde>::Opt> {
        let str = std::fs::read_to_string(path)?;
        let config = toml::from_str(&str)?;
        Ok(config)
    }

    pub fn upload_dir(&self) -> PathBuf {
        if self.upload_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.upload_dir)
        }
    }

    pub fn model_timeout(&self) -> Option<Duration> {
        (self.model_timeout_secs > 0).then(|| Duration::from_secs(self.model_timeout_secs))
    }

    pub fn otel_endpoint(&self) -> Option<String> {
        (!self.otel_endpoint.is_empty()).then(|| self.otel_endpoint.clone())
    }
}
