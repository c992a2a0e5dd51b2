//! Static user-facing replies.
//!
//! Every outcome of an update ends in either a model answer or one of these.

/// Commands that yield [`HELP`].
pub const HELP_COMMANDS: &[&str] = &["/start", "/help"];

pub const HELP: &str = "Я помогу подготовить ответ на экзаменационный вопрос по дисциплине Операционные системы.\n\
Пришлите мне фотографию с вопросом или наберите его текстом.";

pub const CANNOT_ANSWER: &str = "Я не смог подготовить ответ на экзаменационный вопрос.";

pub const CANNOT_PROCESS_PHOTO: &str = "Я не могу обработать эту фотографию.";

pub const UNSUPPORTED_INPUT: &str =
    "Я могу обработать только текстовое сообщение или фотографию.";
