use thiserror::Error;

/// Top-level error type for the exambot pipeline.
#[derive(Debug, Error)]
pub enum ExamBotError {
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned unexpected status {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    #[error("failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("no text found")]
    NoTextFound,

    #[error("completion returned no alternatives")]
    NoAlternatives,

    #[error("invalid instruction path: {0}")]
    InvalidInstructionPath(String),
}

impl ExamBotError {
    pub fn transport(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            service,
            message: err.to_string(),
        }
    }

    pub fn decode(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            service,
            message: err.to_string(),
        }
    }

    /// True for the "service answered, but with nothing usable" family.
    pub fn is_semantic_empty(&self) -> bool {
        matches!(self, Self::NoTextFound | Self::NoAlternatives)
    }
}

pub type Result<T, E = ExamBotError> = std::result::Result<T, E>;
