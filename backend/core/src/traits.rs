use async_trait::async_trait;

use crate::error::Result;

/// Outbound side of the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Platform name for logging (e.g., "telegram").
    fn name(&self) -> &str;

    /// Deliver a text reply to a conversation.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Resolve an opaque file identifier to a downloadable file path.
    async fn get_file_path(&self, file_id: &str) -> Result<String>;

    /// Download the raw bytes behind a resolved file path.
    async fn download_file(&self, file_path: &str) -> Result<Vec<u8>>;
}

/// Optical character recognition over a base64-encoded image.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &str;

    /// Returns every recognized line, each terminated by `\n`.
    /// Fails with [`ExamBotError::NoTextFound`](crate::ExamBotError::NoTextFound)
    /// when the service reports zero text blocks.
    async fn recognize(&self, image_base64: &str) -> Result<String>;
}

/// Source of the system prompt used for every completion.
#[async_trait]
pub trait InstructionSource: Send + Sync {
    /// Fetch the current instruction document. Never cached.
    async fn fetch(&self) -> Result<String>;
}

/// Trait for LLM completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "yandexgpt").
    fn name(&self) -> &str;

    /// Answer `question` under `system_prompt`; the text of the first alternative.
    async fn complete(&self, system_prompt: &str, question: &str) -> Result<String>;
}
