//! Config validation: checks for values that would only fail once a request
//! arrives. Problems are warnings; the process still starts and the affected
//! path answers with its fallback reply.

use url::Url;

use crate::schema::Config;

/// A config finding with the offending field and a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Config warning at '{path}': {message}")]
pub struct ConfigWarning {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub warnings: Vec<ConfigWarning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Emit every warning through `tracing`.
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
    }
}

pub fn validate(config: &Config) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_endpoints(config, &mut report);
    validate_instruction_url(config, &mut report);
    if config.completion.max_tokens == 0 {
        report.warn("completion.max_tokens", "zero token budget; every answer will be empty");
    }
    report
}

fn validate_server(config: &Config, report: &mut ValidationReport) {
    if config.server.webhook_path == "/healthz" {
        report.warn("server.webhook_path", "shadows the /healthz liveness probe");
    }
}

fn validate_endpoints(config: &Config, report: &mut ValidationReport) {
    let endpoints = [
        ("telegram.api_url", &config.telegram.api_url),
        ("ocr.endpoint", &config.ocr.endpoint),
        ("completion.endpoint", &config.completion.endpoint),
    ];
    for (path, raw) in endpoints {
        match Url::parse(raw) {
            Ok(url) if url.scheme() == "https" => {}
            Ok(url) => report.warn(
                path,
                format!("uses plain {}; credentials travel unencrypted", url.scheme()),
            ),
            Err(e) => report.warn(path, format!("not a valid URL: {e}")),
        }
    }
}

fn validate_instruction_url(config: &Config, report: &mut ValidationReport) {
    let path = "storage.instruction_url";
    let url = match Url::parse(&config.storage.instruction_url) {
        Ok(url) => url,
        Err(e) => {
            report.warn(path, format!("not a valid URL: {e}"));
            return;
        }
    };
    if url.path().trim_matches('/').split('/').count() < 2 {
        report.warn(path, "URL does not contain both bucket name and object key");
    }
    if url.query().is_some() {
        report.warn(path, "query strings are not signed; every fetch will be refused");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(overrides: &[(&str, &str)]) -> Config {
        let mut env: HashMap<String, String> = [
            ("TG_BOT_KEY", "1:token"),
            ("VISION_API_KEY", "vision"),
            ("YAGPT_API_KEY", "gpt"),
            ("FOLDER_ID", "folder"),
            ("S3_ACCESS_KEY", "ak"),
            ("S3_SECRET_KEY", "sk"),
            ("YAGPT_INSTRUCTION_PATH", "https://storage.yandexcloud.net/bucket/a/b.txt"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in overrides {
            env.insert(k.to_string(), v.to_string());
        }
        Config::from_map(&env).unwrap()
    }

    #[test]
    fn default_config_is_clean() {
        assert!(validate(&config_with(&[])).is_clean());
    }

    #[test]
    fn flags_instruction_url_without_key() {
        let report = validate(&config_with(&[(
            "YAGPT_INSTRUCTION_PATH",
            "https://storage.yandexcloud.net/bucket",
        )]));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "storage.instruction_url");
    }

    #[test]
    fn flags_plain_http_endpoint() {
        let report = validate(&config_with(&[("VISION_OCR_URL", "http://localhost:9999/ocr")]));
        let paths: Vec<_> = report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["ocr.endpoint"]);
    }

    #[test]
    fn flags_webhook_on_probe_path() {
        let report = validate(&config_with(&[("EXAMBOT_WEBHOOK_PATH", "/healthz")]));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("liveness"));
    }

    #[test]
    fn flags_instruction_url_with_query() {
        let report = validate(&config_with(&[(
            "YAGPT_INSTRUCTION_PATH",
            "https://storage.yandexcloud.net/bucket/prompt.txt?versionId=3",
        )]));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("query"));
    }
}
