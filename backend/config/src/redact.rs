//! Secret masking for config snapshots.

/// Mask a secret, keeping a short prefix as a hint for which key is loaded.
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    // Preserve length hint: show first 4 chars + ***
    match secret.char_indices().nth(4) {
        Some((idx, _)) if secret.chars().count() > 8 => format!("{}***", &secret[..idx]),
        _ => "***".to_string(),
    }
}
