use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One inbound chat-platform event.
///
/// Every field is optional on the wire; absent or `null` fields decode to
/// their zero value so classification never has to deal with a partial shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: IncomingMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Photo variants, lowest resolution first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub photo: Vec<PhotoSize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat: Chat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl Update {
    pub fn chat_id(&self) -> i64 {
        self.message.chat.id
    }

    /// The highest-resolution photo variant, if any.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.message.photo.last()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pipeline stage an error originated from; logged alongside the chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResolveFile,
    Download,
    Recognize,
    FetchInstruction,
    Complete,
    Reply,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ResolveFile => "resolve_file",
            Self::Download => "download",
            Self::Recognize => "recognize",
            Self::FetchInstruction => "fetch_instruction",
            Self::Complete => "complete",
            Self::Reply => "reply",
        };
        f.write_str(s)
    }
}
