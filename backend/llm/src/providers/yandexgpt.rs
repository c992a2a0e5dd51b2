use std::time::Instant;

use async_trait::async_trait;
use exambot_core::{CompletionProvider, ExamBotError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "completion";

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

/// YandexGPT foundation-models completion provider.
pub struct YandexGptProvider {
    client: Client,
    api_key: String,
    folder_id: String,
    model_uri: String,
    endpoint: String,
    options: CompletionOptions,
}

impl YandexGptProvider {
    /// `model_uri` has the form `gpt://<folder>/<model>`.
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        folder_id: impl Into<String>,
        model_uri: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            folder_id: folder_id.into(),
            model_uri: model_uri.into(),
            endpoint: "https://llm.api.cloud.yandex.net/foundationModels/v1/completion".to_string(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = max_tokens;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    model_uri: &'a str,
    completion_options: RequestOptions,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestOptions {
    stream: bool,
    temperature: f32,
    // int64 fields travel as strings in the API's JSON mapping.
    max_tokens: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    result: CompletionResult,
}

#[derive(Default, Deserialize)]
struct CompletionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Deserialize)]
struct AlternativeMessage {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl CompletionProvider for YandexGptProvider {
    fn name(&self) -> &str {
        "yandexgpt"
    }

    async fn complete(&self, system_prompt: &str, question: &str) -> Result<String> {
        let start = Instant::now();

        let body = CompletionRequest {
            model_uri: &self.model_uri,
            completion_options: RequestOptions {
                stream: false,
                temperature: self.options.temperature,
                max_tokens: self.options.max_tokens.to_string(),
            },
            messages: [
                ChatMessage {
                    role: "system",
                    text: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    text: question,
                },
            ],
        };

        debug!(model_uri = %self.model_uri, "Sending request to YandexGPT");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .header("x-folder-id", &self.folder_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExamBotError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExamBotError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ExamBotError::decode(SERVICE, e))?;

        let answer = parsed
            .result
            .alternatives
            .into_iter()
            .next()
            .map(|a| a.message.text)
            .ok_or(ExamBotError::NoAlternatives)?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            answer_len = answer.len(),
            "YandexGPT answered"
        );
        Ok(answer)
    }
}
