pub mod providers;

pub use providers::mock::MockProvider;
pub use providers::yandexgpt::{CompletionOptions, YandexGptProvider};
