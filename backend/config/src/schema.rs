//! Typed configuration schema.

use std::fmt;
use std::path::PathBuf;

use crate::redact::mask;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_OCR_URL: &str = "https://ocr.api.cloud.yandex.net/ocr/v1/recognizeText";
pub const DEFAULT_COMPLETION_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";
pub const DEFAULT_MODEL: &str = "yandexgpt";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_STORAGE_REGION: &str = "ru-central1";

/// exambot runtime configuration, built once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub telegram: TelegramConfig,
    pub ocr: OcrConfig,
    pub completion: CompletionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Route the chat platform posts updates to
    pub webhook_path: String,
    /// Log level, overridden by `RUST_LOG`
    pub log_level: String,
    /// Directory for rotated JSON logs; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            webhook_path: "/".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: String,
}

#[derive(Clone)]
pub struct OcrConfig {
    pub api_key: String,
    pub endpoint: String,
}

#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub folder_id: String,
    pub model: String,
    pub max_tokens: u32,
    pub endpoint: String,
}

impl CompletionConfig {
    /// `gpt://<folder>/<model>`
    pub fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.folder_id, self.model)
    }
}

#[derive(Clone)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    /// Full URL of the instruction document: `https://<host>/<bucket>/<key>`
    pub instruction_url: String,
    pub region: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &mask(&self.bot_token))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &mask(&self.api_key))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &mask(&self.api_key))
            .field("folder_id", &self.folder_id)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key", &mask(&self.access_key))
            .field("secret_key", &mask(&self.secret_key))
            .field("instruction_url", &self.instruction_url)
            .field("region", &self.region)
            .finish()
    }
}
