//! Log Redaction Layer
//!
//! Scrubs bot tokens, API keys, and storage credentials from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

// Telegram embeds the bot token in every request path: `/bot<id>:<secret>/...`.
static BOT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bot\d+:[A-Za-z0-9_-]+").unwrap());
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Api-Key|Bearer)\s+[A-Za-z0-9\-\._~+/]+=*").unwrap());
static CREDENTIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Credential=[^/,\s]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BOT_TOKEN_RE.replace_all(input, "bot[REDACTED_TOKEN]");
    let redacted = API_KEY_RE.replace_all(&redacted, "$1 [REDACTED_TOKEN]");
    CREDENTIAL_RE
        .replace_all(&redacted, "Credential=[REDACTED_KEY]")
        .into_owned()
}
