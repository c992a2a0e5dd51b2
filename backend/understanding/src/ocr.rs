//! Optical Character Recognition (OCR)
//!
//! Sends photographed exam questions to Yandex Vision `recognizeText` and
//! flattens the returned block/line layout into plain text.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use exambot_core::{ExamBotError, Result, TextRecognizer};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "ocr";

/// Base64 (standard alphabet, padded) as the recognition API expects.
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    language_codes: [&'a str; 1],
    model: &'a str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub result: RecognizeResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeResult {
    #[serde(default)]
    pub text_annotation: TextAnnotation,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextAnnotation {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Line {
    #[serde(default)]
    pub text: String,
}

/// Every line of every block, each followed by `\n`, in service order.
pub fn recognized_text(response: &RecognizeResponse) -> Result<String> {
    let blocks = &response.result.text_annotation.blocks;
    if blocks.is_empty() {
        return Err(ExamBotError::NoTextFound);
    }

    let mut text = String::new();
    for line in blocks.iter().flat_map(|b| &b.lines) {
        text.push_str(&line.text);
        text.push('\n');
    }
    Ok(text)
}

/// Yandex Vision OCR client.
pub struct YandexVisionRecognizer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl YandexVisionRecognizer {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: "https://ocr.api.cloud.yandex.net/ocr/v1/recognizeText".to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TextRecognizer for YandexVisionRecognizer {
    fn name(&self) -> &str {
        "yandex-vision"
    }

    async fn recognize(&self, image_base64: &str) -> Result<String> {
        let body = RecognizeRequest {
            language_codes: ["*"],
            model: "page",
            content: image_base64,
        };

        debug!(content_len = image_base64.len(), "Sending image to OCR");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Api-Key {}", self.api_key))
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

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| ExamBotError::decode(SERVICE, e))?;

        recognized_text(&parsed)
    }
}
