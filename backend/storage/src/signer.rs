//! Request signing for S3-compatible object storage (`AWS4-HMAC-SHA256`).
//!
//! Only the subset needed for an unsigned-payload GET of one object is
//! implemented: a fixed set of three signed headers and no query string.
//!
//! ```text
//! kDate    = HMAC("AWS4" + secret, date)
//! kRegion  = HMAC(kDate, region)
//! kService = HMAC(kRegion, service)
//! kSigning = HMAC(kService, "aws4_request")
//! ```

use chrono::{DateTime, Utc};
use exambot_core::{ExamBotError, Result};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
pub const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";
const TERMINATOR: &str = "aws4_request";

/// One captured UTC instant, rendered in both formats the scheme needs.
///
/// Capture once per request; the canonical request and the credential scope
/// must agree on the same second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningTime {
    /// `YYYYMMDD`
    pub date: String,
    /// `YYYYMMDDTHHMMSSZ`
    pub amz_date: String,
}

impl SigningTime {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            date: at.format("%Y%m%d").to_string(),
            amz_date: at.format("%Y%m%dT%H%M%SZ").to_string(),
        }
    }
}

/// Everything that determines a derived signing key. Pure value.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningContext {
    pub secret_key: String,
    pub date: String,
    pub region: String,
    pub service: String,
    pub amz_date: String,
}

impl std::fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningContext")
            .field("secret_key", &"***")
            .field("date", &self.date)
            .field("region", &self.region)
            .field("service", &self.service)
            .field("amz_date", &self.amz_date)
            .finish()
    }
}

impl SigningContext {
    pub fn new(
        secret_key: impl Into<String>,
        time: &SigningTime,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            date: time.date.clone(),
            region: region.into(),
            service: service.into(),
            amz_date: time.amz_date.clone(),
        }
    }

    /// `{date}/{region}/{service}/aws4_request`
    pub fn scope(&self) -> String {
        format!("{}/{}/{}/{}", self.date, self.region, self.service, TERMINATOR)
    }

    pub fn signing_key(&self) -> Vec<u8> {
        derive_signing_key(&self.secret_key, &self.date, &self.region, &self.service)
    }

    /// Hex signature over `string_to_sign` with this context's derived key.
    pub fn sign(&self, string_to_sign: &str) -> String {
        compute_signature(&self.signing_key(), string_to_sign)
    }
}

fn hmac_sha256(key: &[u8], message: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Four-stage HMAC chain producing the scoped signing key.
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date);
    let k_region = hmac_sha256(&k_date, region);
    let k_service = hmac_sha256(&k_region, service);
    hmac_sha256(&k_service, TERMINATOR)
}

/// Lowercase hex HMAC-SHA256 of `string_to_sign`.
pub fn compute_signature(signing_key: &[u8], string_to_sign: &str) -> String {
    hex::encode(hmac_sha256(signing_key, string_to_sign))
}

pub fn canonical_request(bucket: &str, object_key: &str, host: &str, amz_date: &str) -> String {
    let canonical_headers = format!(
        "host:{host}\nx-amz-content-sha256:{UNSIGNED_PAYLOAD}\nx-amz-date:{amz_date}\n"
    );
    format!("GET\n/{bucket}/{object_key}\n\n{canonical_headers}\n{SIGNED_HEADERS}\n{UNSIGNED_PAYLOAD}")
}

pub fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    let hashed = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    format!("{ALGORITHM}\n{amz_date}\n{scope}\n{hashed}")
}

pub fn authorization_header(access_key: &str, scope: &str, signature: &str) -> String {
    format!(
        "{ALGORITHM} Credential={access_key}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}"
    )
}

/// Split an object URL into `(bucket, object_key)`.
///
/// The first path segment is the bucket and the remainder, exactly as it
/// goes on the wire (trailing `/` included), is the key. Query strings are
/// refused because only the path is signed.
pub fn extract_bucket_and_key(raw_url: &str) -> Result<(String, String)> {
    let url = Url::parse(raw_url)
        .map_err(|e| ExamBotError::InvalidInstructionPath(format!("invalid URL: {e}")))?;
    bucket_and_key(&url)
}

fn bucket_and_key(url: &Url) -> Result<(String, String)> {
    if url.query().is_some() {
        return Err(ExamBotError::InvalidInstructionPath(
            "URL must not carry a query string".to_string(),
        ));
    }
    let path = url.path().strip_prefix('/').unwrap_or(url.path());
    match path.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.trim_matches('/').is_empty() => {
            Ok((bucket.to_string(), key.to_string()))
        }
        _ => Err(ExamBotError::InvalidInstructionPath(
            "URL does not contain both bucket name and object key".to_string(),
        )),
    }
}

/// `host[:port]` exactly as the HTTP client will send it.
fn host_header(url: &Url) -> Result<String> {
    let host = url.host_str().ok_or_else(|| {
        ExamBotError::InvalidInstructionPath("URL has no host".to_string())
    })?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Headers to attach to a signed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub host: String,
    pub amz_date: String,
    pub content_sha256: &'static str,
    pub authorization: String,
}

/// Sign a GET of the object at `url`.
pub fn sign_get(
    url: &Url,
    access_key: &str,
    context: &SigningContext,
) -> Result<SignedHeaders> {
    let (bucket, object_key) = bucket_and_key(url)?;
    let host = host_header(url)?;

    let canonical = canonical_request(&bucket, &object_key, &host, &context.amz_date);
    let scope = context.scope();
    let to_sign = string_to_sign(&context.amz_date, &scope, &canonical);
    let signature = context.sign(&to_sign);

    Ok(SignedHeaders {
        host,
        amz_date: context.amz_date.clone(),
        content_sha256: UNSIGNED_PAYLOAD,
        authorization: authorization_header(access_key, &scope, &signature),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> SigningTime {
        SigningTime::from_datetime(Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap())
    }

    fn context() -> SigningContext {
        SigningContext::new("secret", &fixed_time(), "ru-central1", "s3")
    }

    #[test]
    fn test_signing_time_formats() {
        let time = fixed_time();
        assert_eq!(time.date, "20240309");
        assert_eq!(time.amz_date, "20240309T070501Z");
    }

    #[test]
    fn test_derived_key_matches_published_vector() {
        let key = derive_signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_canonical_request_layout() {
        let canonical = canonical_request("bucket", "a/b.txt", "storage.yandexcloud.net", "20240309T070501Z");
        assert_eq!(
            canonical,
            "GET\n/bucket/a/b.txt\n\n\
             host:storage.yandexcloud.net\n\
             x-amz-content-sha256:UNSIGNED-PAYLOAD\n\
             x-amz-date:20240309T070501Z\n\n\
             host;x-amz-content-sha256;x-amz-date\n\
             UNSIGNED-PAYLOAD"
        );
    }

    #[test]
    fn test_string_to_sign_layout() {
        let to_sign = string_to_sign("20240309T070501Z", "20240309/ru-central1/s3/aws4_request", "");
        assert_eq!(
            to_sign,
            "AWS4-HMAC-SHA256\n20240309T070501Z\n20240309/ru-central1/s3/aws4_request\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let first = context().sign("payload");
        let second = context().sign("payload");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_any_input_change_changes_signature() {
        let base = context().sign("payload");
        let time = fixed_time();
        let variants = [
            SigningContext::new("secret2", &time, "ru-central1", "s3").sign("payload"),
            SigningContext::new("secret", &time, "us-east-1", "s3").sign("payload"),
            SigningContext::new("secret", &time, "ru-central1", "iam").sign("payload"),
            SigningContext {
                date: "20240310".into(),
                ..context()
            }
            .sign("payload"),
            context().sign("payload2"),
        ];
        for variant in variants {
            assert_ne!(variant, base);
        }
    }

    #[test]
    fn test_authorization_header_format() {
        let header = authorization_header("AKID", "20240309/ru-central1/s3/aws4_request", "abc123");
        assert_eq!(
            header,
            "AWS4-HMAC-SHA256 Credential=AKID/20240309/ru-central1/s3/aws4_request, \
             SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature=abc123"
        );
    }

    #[test]
    fn test_extract_bucket_and_key() {
        let (bucket, key) = extract_bucket_and_key("https://host/bucket/a/b/c").unwrap();
        assert_eq!(bucket, "bucket");
        assert_eq!(key, "a/b/c");

        let (bucket, key) = extract_bucket_and_key("https://host/bucket/prompt.txt/").unwrap();
        assert_eq!((bucket.as_str(), key.as_str()), ("bucket", "prompt.txt/"));
    }

    #[test]
    fn test_canonical_uri_matches_request_path() {
        for raw in [
            "https://host/bucket/a/b.txt",
            "https://host/bucket/prompt.txt/",
            "https://host/bucket/%D0%B2%D0%BE%D0%BF%D1%80%D0%BE%D1%81.txt",
        ] {
            let url = Url::parse(raw).unwrap();
            let (bucket, key) = extract_bucket_and_key(raw).unwrap();
            let canonical = canonical_request(&bucket, &key, "host", "20240309T070501Z");
            let uri = canonical.lines().nth(1).unwrap();
            assert_eq!(uri, url.path(), "{raw}");
        }
    }

    #[test]
    fn test_extract_rejects_single_segment() {
        for raw in [
            "https://host/bucket",
            "https://host/bucket/",
            "https://host/",
            "https://host",
            "https://host/bucket/prompt.txt?versionId=3",
            "not a url",
        ] {
            let err = extract_bucket_and_key(raw).unwrap_err();
            assert!(matches!(err, ExamBotError::InvalidInstructionPath(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn test_sign_get_uses_one_timestamp_and_url_host() {
        let url = Url::parse("http://127.0.0.1:9000/bucket/prompt.txt").unwrap();
        let ctx = context();
        let headers = sign_get(&url, "AKID", &ctx).unwrap();
        assert_eq!(headers.host, "127.0.0.1:9000");
        assert_eq!(headers.amz_date, "20240309T070501Z");
        assert_eq!(headers.content_sha256, "UNSIGNED-PAYLOAD");

        let canonical = canonical_request("bucket", "prompt.txt", "127.0.0.1:9000", &ctx.amz_date);
        let expected = ctx.sign(&string_to_sign(&ctx.amz_date, &ctx.scope(), &canonical));
        assert!(headers
            .authorization
            .starts_with("AWS4-HMAC-SHA256 Credential=AKID/20240309/ru-central1/s3/aws4_request, "));
        assert!(headers.authorization.ends_with(&format!("Signature={expected}")));

        let default_port = Url::parse("https://storage.yandexcloud.net/bucket/prompt.txt").unwrap();
        assert_eq!(sign_get(&default_port, "AKID", &ctx).unwrap().host, "storage.yandexcloud.net");
    }
}
