pub mod error;
pub mod replies;
pub mod traits;
pub mod types;

pub use error::{ExamBotError, Result};
pub use traits::{CompletionProvider, InstructionSource, Messenger, TextRecognizer};
pub use types::{Chat, IncomingMessage, PhotoSize, Stage, Update};
