//! Telegram Bot API client.
//!
//! Inbound updates arrive through the gateway webhook; this covers the
//! outbound calls: replying, resolving a photo's `file_id`, and downloading it.

use async_trait::async_trait;
use exambot_core::{ExamBotError, Messenger, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SERVICE: &str = "telegram";

pub struct TelegramClient {
    client: Client,
    token: String,
    api_url: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Envelope every Bot API method answers with.
#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct File {
    #[serde(default)]
    file_path: Option<String>,
}

impl TelegramClient {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
            api_url: "https://api.telegram.org".to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_url, self.token, file_path)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessage { chat_id, text })
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
        info!(chat_id, "[Telegram] Sent message");
        Ok(())
    }

    async fn get_file_path(&self, file_id: &str) -> Result<String> {
        let response = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
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

        let parsed: ApiResponse<File> = response
            .json()
            .await
            .map_err(|e| ExamBotError::decode(SERVICE, e))?;
        if !parsed.ok {
            return Err(ExamBotError::decode(
                SERVICE,
                parsed.description.unwrap_or_else(|| "getFile returned ok=false".to_string()),
            ));
        }

        parsed
            .result
            .and_then(|f| f.file_path)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ExamBotError::decode(SERVICE, "getFile result has no file_path"))
    }

    async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.file_url(file_path))
            .send()
            .await
            .map_err(|e| ExamBotError::transport(SERVICE, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExamBotError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExamBotError::transport(SERVICE, e))?;
        debug!(file_path, size = bytes.len(), "[Telegram] Downloaded file");
        Ok(bytes.to_vec())
    }
}
