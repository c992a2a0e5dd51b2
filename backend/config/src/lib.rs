//! `exambot-config`: process configuration for the exambot webhook.
//!
//! Provides:
//! - Typed config schema (Telegram, OCR, completion, object storage, server)
//! - Environment loading with defaults for the optional knobs
//! - Redacted `Debug` output for safe logging
//! - Validation warnings for values that only fail at request time

pub mod env;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::ConfigError;
pub use schema::{CompletionConfig, Config, OcrConfig, ServerConfig, StorageConfig, TelegramConfig};
pub use validation::{validate, ConfigWarning, ValidationReport};
