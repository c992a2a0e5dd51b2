//! Update classification.

use exambot_core::replies::HELP_COMMANDS;
use exambot_core::Update;

/// Where an update goes. First match wins, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Help,
    Question(&'a str),
    /// File id of the highest-resolution photo variant.
    Photo(&'a str),
    Unsupported,
}

pub fn classify(update: &Update) -> Route<'_> {
    let text = update.message.text.as_str();
    if HELP_COMMANDS.contains(&text) {
        return Route::Help;
    }
    if !text.is_empty() {
        return Route::Question(text);
    }
    match update.largest_photo() {
        Some(photo) => Route::Photo(&photo.file_id),
        None => Route::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_help_commands_win_over_photos() {
        for command in ["/start", "/help"] {
            let u = update(json!({"message": {
                "text": command, "photo": [{"file_id": "p"}], "chat": {"id": 1}
            }}));
            assert_eq!(classify(&u), Route::Help);
        }
    }

    #[test]
    fn test_other_commands_are_questions() {
        let u = update(json!({"message": {"text": "/helpme", "chat": {"id": 1}}}));
        assert_eq!(classify(&u), Route::Question("/helpme"));
    }

    #[test]
    fn test_text_wins_over_photo() {
        let u = update(json!({"message": {
            "text": "What is paging?", "photo": [{"file_id": "p"}], "chat": {"id": 1}
        }}));
        assert_eq!(classify(&u), Route::Question("What is paging?"));
    }

    #[test]
    fn test_photo_uses_last_variant() {
        let u = update(json!({"message": {
            "photo": [{"file_id": "s"}, {"file_id": "m"}, {"file_id": "xl"}], "chat": {"id": 1}
        }}));
        assert_eq!(classify(&u), Route::Photo("xl"));
    }

    #[test]
    fn test_nothing_usable_is_unsupported() {
        assert_eq!(classify(&update(json!({"message": {"chat": {"id": 1}}}))), Route::Unsupported);
        assert_eq!(
            classify(&update(json!({"message": {"text": "", "photo": [], "chat": {"id": 1}}}))),
            Route::Unsupported
        );
    }
}
