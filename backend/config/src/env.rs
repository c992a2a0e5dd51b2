//! Environment loading.
//!
//! Credentials are required; every other knob falls back to a default.
//! All missing variables are reported together so a deploy can be fixed in
//! one pass.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::schema::{
    CompletionConfig, Config, OcrConfig, ServerConfig, StorageConfig, TelegramConfig,
    DEFAULT_COMPLETION_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_OCR_URL,
    DEFAULT_STORAGE_REGION, DEFAULT_TELEGRAM_API_URL,
};

pub const TG_BOT_KEY: &str = "TG_BOT_KEY";
pub const VISION_API_KEY: &str = "VISION_API_KEY";
pub const YAGPT_API_KEY: &str = "YAGPT_API_KEY";
pub const FOLDER_ID: &str = "FOLDER_ID";
pub const S3_ACCESS_KEY: &str = "S3_ACCESS_KEY";
pub const S3_SECRET_KEY: &str = "S3_SECRET_KEY";
pub const YAGPT_INSTRUCTION_PATH: &str = "YAGPT_INSTRUCTION_PATH";

const REQUIRED: &[&str] = &[
    TG_BOT_KEY,
    VISION_API_KEY,
    YAGPT_API_KEY,
    FOLDER_ID,
    S3_ACCESS_KEY,
    S3_SECRET_KEY,
    YAGPT_INSTRUCTION_PATH,
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env vars: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_map(&std::env::vars().collect())
    }

    /// Load configuration from a provided map (useful for testing).
    pub fn from_map(env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|name| lookup(env, name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |name: &str| lookup(env, name).unwrap_or_default();
        let or_default = |name: &str, default: &str| {
            lookup(env, name).unwrap_or_else(|| default.to_string())
        };

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            bind_address: or_default("EXAMBOT_BIND", &defaults.bind_address),
            port: parse_or(env, "EXAMBOT_PORT", defaults.port)?,
            webhook_path: webhook_path(env, &defaults.webhook_path)?,
            log_level: or_default("RUST_LOG", &defaults.log_level),
            log_dir: lookup(env, "EXAMBOT_LOG_DIR").map(PathBuf::from),
        };

        Ok(Self {
            server,
            telegram: TelegramConfig {
                bot_token: required(TG_BOT_KEY),
                api_url: or_default("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
            },
            ocr: OcrConfig {
                api_key: required(VISION_API_KEY),
                endpoint: or_default("VISION_OCR_URL", DEFAULT_OCR_URL),
            },
            completion: CompletionConfig {
                api_key: required(YAGPT_API_KEY),
                folder_id: required(FOLDER_ID),
                model: or_default("YAGPT_MODEL", DEFAULT_MODEL),
                max_tokens: parse_or(env, "YAGPT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
                endpoint: or_default("YAGPT_COMPLETION_URL", DEFAULT_COMPLETION_URL),
            },
            storage: StorageConfig {
                access_key: required(S3_ACCESS_KEY),
                secret_key: required(S3_SECRET_KEY),
                instruction_url: required(YAGPT_INSTRUCTION_PATH),
                region: or_default("STORAGE_REGION", DEFAULT_STORAGE_REGION),
            },
        })
    }
}

/// Empty values count as unset.
fn lookup(env: &HashMap<String, String>, name: &str) -> Option<String> {
    env.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Routes must be absolute; the router refuses anything else.
fn webhook_path(env: &HashMap<String, String>, default: &str) -> Result<String, ConfigError> {
    let name = "EXAMBOT_WEBHOOK_PATH";
    match lookup(env, name) {
        None => Ok(default.to_string()),
        Some(path) if path.starts_with('/') => Ok(path),
        Some(path) => Err(ConfigError::Invalid {
            var: name.to_string(),
            value: path,
            reason: "must start with '/'".to_string(),
        }),
    }
}

fn parse_or<T>(env: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(env, name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
