//! Dispatcher for inbound updates.
//!
//! Classifies an update, runs the text or photo path, and guarantees that
//! exactly one reply is sent per update. Every downstream failure is logged
//! with the chat id and failing stage, then collapsed into a static reply.

use std::sync::Arc;

use exambot_core::replies;
use exambot_core::{
    CompletionProvider, ExamBotError, InstructionSource, Messenger, Stage, TextRecognizer, Update,
};
use exambot_logging::redact_sensitive_data;
use exambot_understanding::encode_image;
use tracing::{debug, error, info, instrument, warn};

use crate::route::{classify, Route};

/// An error tagged with the pipeline stage it came from.
#[derive(Debug, thiserror::Error)]
#[error("{stage}: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: ExamBotError,
}

impl StageError {
    fn at(stage: Stage) -> impl FnOnce(ExamBotError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Which reply an update ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Help,
    Answered,
    CannotAnswer,
    CannotProcessPhoto,
    Unsupported,
}

pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
    recognizer: Arc<dyn TextRecognizer>,
    instructions: Arc<dyn InstructionSource>,
    completion: Arc<dyn CompletionProvider>,
}

impl Dispatcher {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        recognizer: Arc<dyn TextRecognizer>,
        instructions: Arc<dyn InstructionSource>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            messenger,
            recognizer,
            instructions,
            completion,
        }
    }

    /// Handle one update end to end. Never fails; the outcome is informational.
    #[instrument(skip_all, fields(chat_id = update.chat_id(), update_id = ?update.update_id))]
    pub async fn handle(&self, update: &Update) -> Outcome {
        let chat_id = update.chat_id();
        let route = classify(update);
        debug!(?route, "Classified update");

        match route {
            Route::Help => {
                self.reply(chat_id, replies::HELP).await;
                Outcome::Help
            }
            Route::Question(question) => self.answer_text(chat_id, question).await,
            Route::Photo(file_id) => self.answer_photo(chat_id, file_id).await,
            Route::Unsupported => {
                self.reply(chat_id, replies::UNSUPPORTED_INPUT).await;
                Outcome::Unsupported
            }
        }
    }

    async fn answer_text(&self, chat_id: i64, question: &str) -> Outcome {
        match self.prepare_answer(question).await {
            Ok(answer) => {
                info!(chat_id, answer_len = answer.len(), "Answer prepared");
                self.reply(chat_id, &answer).await;
                Outcome::Answered
            }
            Err(e) => {
                log_failure(chat_id, &e, "Failed to prepare answer");
                self.reply(chat_id, replies::CANNOT_ANSWER).await;
                Outcome::CannotAnswer
            }
        }
    }

    async fn answer_photo(&self, chat_id: i64, file_id: &str) -> Outcome {
        match self.recognize_photo(file_id).await {
            Ok(text) => {
                info!(chat_id, file_id, text_len = text.len(), "Recognized question from photo");
                self.answer_text(chat_id, &text).await
            }
            Err(e) => {
                log_failure(chat_id, &e, "Failed to process photo");
                self.reply(chat_id, replies::CANNOT_PROCESS_PHOTO).await;
                Outcome::CannotProcessPhoto
            }
        }
    }

    /// Instruction first; completion is only attempted with a fresh instruction.
    async fn prepare_answer(&self, question: &str) -> Result<String, StageError> {
        let instruction = self
            .instructions
            .fetch()
            .await
            .map_err(StageError::at(Stage::FetchInstruction))?;

        self.completion
            .complete(&instruction, question)
            .await
            .map_err(StageError::at(Stage::Complete))
    }

    async fn recognize_photo(&self, file_id: &str) -> Result<String, StageError> {
        let file_path = self
            .messenger
            .get_file_path(file_id)
            .await
            .map_err(StageError::at(Stage::ResolveFile))?;

        let bytes = self
            .messenger
            .download_file(&file_path)
            .await
            .map_err(StageError::at(Stage::Download))?;

        let text = self
            .recognizer
            .recognize(&encode_image(&bytes))
            .await
            .map_err(StageError::at(Stage::Recognize))?;

        // Blocks with only blank lines carry no question either.
        if text.trim().is_empty() {
            return Err(StageError {
                stage: Stage::Recognize,
                source: ExamBotError::NoTextFound,
            });
        }
        Ok(text)
    }

    /// Best effort: a failed reply is logged, never retried.
    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.messenger.send_message(chat_id, text).await {
            warn!(
                chat_id,
                stage = %Stage::Reply,
                messenger = self.messenger.name(),
                error = %redact_sensitive_data(&e.to_string()),
                "Failed to send reply"
            );
        }
    }
}

fn log_failure(chat_id: i64, e: &StageError, message: &str) {
    error!(
        chat_id,
        stage = %e.stage,
        semantic_empty = e.source.is_semantic_empty(),
        error = %redact_sensitive_data(&e.source.to_string()),
        "{message}"
    );
}
