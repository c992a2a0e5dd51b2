//! Builds the production dispatcher from configuration.

use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use exambot_agent::Dispatcher;
use exambot_channels::TelegramClient;
use exambot_config::Config;
use exambot_core::{CompletionProvider, InstructionSource, Messenger, TextRecognizer};
use exambot_llm::YandexGptProvider;
use exambot_storage::StorageInstructionSource;
use exambot_understanding::YandexVisionRecognizer;

/// One HTTP client is shared by every outbound integration.
pub fn build_dispatcher(config: &Config) -> Arc<Dispatcher> {
    let client = Client::new();

    let messenger: Arc<dyn Messenger> = Arc::new(
        TelegramClient::new(client.clone(), &config.telegram.bot_token)
            .with_api_url(&config.telegram.api_url),
    );

    let recognizer: Arc<dyn TextRecognizer> = Arc::new(
        YandexVisionRecognizer::new(client.clone(), &config.ocr.api_key)
            .with_endpoint(&config.ocr.endpoint),
    );

    let instructions: Arc<dyn InstructionSource> = Arc::new(
        StorageInstructionSource::new(
            client.clone(),
            &config.storage.instruction_url,
            &config.storage.access_key,
            &config.storage.secret_key,
        )
        .with_region(&config.storage.region),
    );

    let completion: Arc<dyn CompletionProvider> = Arc::new(
        YandexGptProvider::new(
            client,
            &config.completion.api_key,
            &config.completion.folder_id,
            config.completion.model_uri(),
        )
        .with_endpoint(&config.completion.endpoint)
        .with_max_tokens(config.completion.max_tokens),
    );

    info!(
        messenger = messenger.name(),
        recognizer = recognizer.name(),
        completion = completion.name(),
        "Pipeline wired"
    );

    Arc::new(Dispatcher::new(messenger, recognizer, instructions, completion))
}
