//! Structured logging for exambot.
//!
//! Subscriber setup (console plus optional rolling JSON file) and redaction
//! of credentials that leak into error text, e.g. the bot token embedded in
//! Telegram URLs.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
