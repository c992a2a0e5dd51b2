use std::sync::Mutex;

use async_trait::async_trait;
use exambot_core::{CompletionProvider, ExamBotError, Result};

/// A mock completion provider that returns canned responses and records
/// every `(system_prompt, question)` pair it receives.
pub struct MockProvider {
    name: String,
    fixed_response: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    /// Without a canned response this behaves like a service that returned
    /// zero alternatives.
    async fn complete(&self, system_prompt: &str, question: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((system_prompt.to_string(), question.to_string()));
        }
        self.fixed_response.clone().ok_or(ExamBotError::NoAlternatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let provider = MockProvider::new("mock").with_response("answer");
        assert_eq!(provider.complete("sys", "q1").await.unwrap(), "answer");
        assert_eq!(provider.calls(), vec![("sys".to_string(), "q1".to_string())]);
    }

    #[tokio::test]
    async fn test_without_response_has_no_alternatives() {
        let provider = MockProvider::new("mock");
        assert!(matches!(
            provider.complete("sys", "q").await,
            Err(ExamBotError::NoAlternatives)
        ));
    }
}
