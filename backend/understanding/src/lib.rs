pub mod ocr;

pub use ocr::{encode_image, recognized_text, YandexVisionRecognizer};
