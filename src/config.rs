use std::time::Duration;

use crate::tts::openai;

pub const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";
pub const DEFAULT_BUCKET: &str = "audio";
const MAX_SIGNED_URL_EXPIRY_SECS: u64 = 60;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {var} '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Supabase { url: String, service_key: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_voice_id: String,
    pub signed_url_expiry: Duration,
    pub fork_buffer_chunks: usize,
    pub storage: StorageBackend,
    pub storage_bucket: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub tts_model: String,
    pub tts_instructions: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let or = |var: &str, default: &str| get(var).unwrap_or_else(|| default.to_string());

        let port = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: v.clone(),
                reason: "must be a number",
            })?,
            None => 3000,
        };

        let expiry_secs = match get("SIGNED_URL_EXPIRY_SECS") {
            Some(v) => match v.parse::<u64>() {
                Ok(secs) if (1..=MAX_SIGNED_URL_EXPIRY_SECS).contains(&secs) => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "SIGNED_URL_EXPIRY_SECS",
                        value: v,
                        reason: "must be between 1 and 60",
                    })
                }
            },
            None => MAX_SIGNED_URL_EXPIRY_SECS,
        };

        let fork_buffer_chunks = match get("FORK_BUFFER_CHUNKS") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "FORK_BUFFER_CHUNKS",
                        value: v,
                        reason: "must be a positive number",
                    })
                }
            },
            None => 32,
        };

        let storage = match get("STORAGE_URL") {
            Some(url) => StorageBackend::Supabase {
                url,
                service_key: get("STORAGE_SERVICE_KEY")
                    .ok_or(ConfigError::Missing("STORAGE_SERVICE_KEY"))?,
            },
            None => StorageBackend::Memory,
        };

        Ok(Self {
            host: or("HOST", "0.0.0.0"),
            port,
            default_voice_id: or("DEFAULT_VOICE_ID", DEFAULT_VOICE_ID),
            signed_url_expiry: Duration::from_secs(expiry_secs),
            fork_buffer_chunks,
            storage,
            storage_bucket: or("STORAGE_BUCKET", DEFAULT_BUCKET),
            openai_api_key: get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?,
            openai_base_url: or("OPENAI_BASE_URL", openai::DEFAULT_BASE_URL),
            tts_model: or("TTS_MODEL", openai::DEFAULT_MODEL),
            tts_instructions: or("TTS_INSTRUCTIONS", openai::DEFAULT_INSTRUCTIONS),
        })
    }
}
