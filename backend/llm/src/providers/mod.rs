pub mod mock;
pub mod yandexgpt;
