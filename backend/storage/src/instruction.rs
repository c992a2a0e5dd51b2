use async_trait::async_trait;
use exambot_core::{ExamBotError, InstructionSource, Result};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::signer::{sign_get, SigningContext, SigningTime};

const SERVICE: &str = "object storage";
const SIGNING_SERVICE: &str = "s3";

/// Fetches the system prompt from S3-compatible object storage with a
/// signed GET. Every call re-downloads the document.
pub struct StorageInstructionSource {
    client: Client,
    instruction_url: String,
    access_key: String,
    secret_key: String,
    region: String,
}

impl StorageInstructionSource {
    pub fn new(
        client: Client,
        instruction_url: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            instruction_url: instruction_url.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: "ru-central1".to_string(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Fetch with an explicit signing time.
    pub async fn fetch_at(&self, time: &SigningTime) -> Result<String> {
        let url = Url::parse(&self.instruction_url)
            .map_err(|e| ExamBotError::InvalidInstructionPath(format!("invalid URL: {e}")))?;

        let context = SigningContext::new(&self.secret_key, time, &self.region, SIGNING_SERVICE);
        let signed = sign_get(&url, &self.access_key, &context)?;

        debug!(path = %url.path(), amz_date = %signed.amz_date, "Fetching instruction document");

        let response = self
            .client
            .get(url)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header("Authorization", &signed.authorization)
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

        response
            .text()
            .await
            .map_err(|e| ExamBotError::decode(SERVICE, e))
    }
}

#[async_trait]
impl InstructionSource for StorageInstructionSource {
    async fn fetch(&self) -> Result<String> {
        self.fetch_at(&SigningTime::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{canonical_request, string_to_sign};
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer, object_path: &str) -> StorageInstructionSource {
        StorageInstructionSource::new(
            Client::new(),
            format!("{}{}", server.uri(), object_path),
            "AKID",
            "secret",
        )
    }

    fn fixed_time() -> SigningTime {
        SigningTime::from_datetime(Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_returns_body_verbatim() {
        let server = MockServer::start().await;
        let prompt = "  Ты преподаватель.\nОтвечай кратко.\n";
        Mock::given(method("GET"))
            .and(path("/bucket/prompts/os.txt"))
            .and(header("x-amz-content-sha256", "UNSIGNED-PAYLOAD"))
            .and(header("x-amz-date", "20240901T120000Z"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_string(prompt))
            .expect(1)
            .mount(&server)
            .await;

        let text = source(&server, "/bucket/prompts/os.txt")
            .fetch_at(&fixed_time())
            .await
            .unwrap();
        assert_eq!(text, prompt);
    }

    #[tokio::test]
    async fn test_authorization_signs_the_wire_host() {
        let server = MockServer::start().await;
        let time = fixed_time();
        let host = server.uri().trim_start_matches("http://").to_string();
        let context = SigningContext::new("secret", &time, "ru-central1", "s3");
        let canonical = canonical_request("bucket", "prompt.txt", &host, &time.amz_date);
        let signature = context.sign(&string_to_sign(&time.amz_date, &context.scope(), &canonical));
        let expected = format!(
            "AWS4-HMAC-SHA256 Credential=AKID/20240901/ru-central1/s3/aws4_request, \
             SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature={signature}"
        );

        Mock::given(method("GET"))
            .and(path("/bucket/prompt.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("prompt"))
            .expect(1)
            .mount(&server)
            .await;

        let text = source(&server, "/bucket/prompt.txt").fetch_at(&time).await.unwrap();
        assert_eq!(text, "prompt");

        let requests = server.received_requests().await.unwrap();
        let sent = &requests[0].headers;
        assert_eq!(sent.get("host").unwrap().to_str().unwrap(), host);
        assert_eq!(sent.get("authorization").unwrap().to_str().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_trailing_slash_is_signed_as_sent() {
        let server = MockServer::start().await;
        let time = fixed_time();
        let host = server.uri().trim_start_matches("http://").to_string();
        let context = SigningContext::new("secret", &time, "ru-central1", "s3");
        let canonical = canonical_request("bucket", "prompt.txt/", &host, &time.amz_date);
        let signature = context.sign(&string_to_sign(&time.amz_date, &context.scope(), &canonical));

        Mock::given(method("GET"))
            .and(path("/bucket/prompt.txt/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("prompt"))
            .expect(1)
            .mount(&server)
            .await;

        source(&server, "/bucket/prompt.txt/").fetch_at(&time).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let authorization = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
        assert!(authorization.ends_with(&format!("Signature={signature}")));
    }

    #[tokio::test]
    async fn test_non_200_is_an_error_not_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("<Error>AccessDenied</Error>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = source(&server, "/bucket/prompt.txt").fetch().await.unwrap_err();
        assert!(matches!(err, ExamBotError::UnexpectedStatus { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_malformed_path_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for object_path in ["/bucket-only", "/bucket/prompt.txt?versionId=3"] {
            let err = source(&server, object_path).fetch().await.unwrap_err();
            assert!(matches!(err, ExamBotError::InvalidInstructionPath(_)), "{object_path}");
        }
    }

    #[tokio::test]
    async fn test_unreachable_storage_is_transport_error() {
        let source = StorageInstructionSource::new(
            Client::new(),
            "http://127.0.0.1:1/bucket/prompt.txt",
            "AKID",
            "secret",
        );
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, ExamBotError::Transport { .. }));
    }
}
