//! Conversation message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::core::ids::MessageId;

/// Author of a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The shopper typing into the widget.
    User,
    /// The backend assistant.
    #[serde(alias = "assistant")]
    Bot,
}

impl Sender {
    /// Stable string form for logs and the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "bot" | "assistant" => Ok(Self::Bot),
            _ => Err(value.to_string()),
        }
    }
}

/// One conversation turn.
///
/// Messages are never edited after they enter the timeline; the store only
/// hands out clones.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier (local for optimistic entries, server-assigned for history).
    pub id: MessageId,
    /// Author of the message.
    pub sender: Sender,
    /// Raw text; bot content may carry link markup.
    pub content: String,
    /// Creation or reception time.
    #[serde(alias = "created_at")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message authored by the user, stamped now.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::local(Sender::User, content)
    }

    /// Build a message authored by the bot, stamped now.
    #[must_use]
    pub fn bot(content: impl Into<String>) -> Self {
        Self::local(Sender::Bot, content)
    }

    fn local(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::local(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether the bot authored this message.
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_sender() {
        let user = Message::user("hello");
        let bot = Message::bot("hi there");
        assert_eq!(user.sender, Sender::User);
        assert!(bot.is_bot());
        assert_ne!(user.id, bot.id);
    }

    #[test]
    fn test_history_payload_deserializes() {
        let raw = r#"[
            {"id": 12, "sender": "user", "content": "giày size 42?", "created_at": "2024-05-01T10:00:00Z"},
            {"id": "13", "sender": "assistant", "content": "Có ạ", "timestamp": "2024-05-01T10:00:02Z"}
        ]"#;
        let messages: Vec<Message> = serde_json::from_str(raw).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id.as_str(), "12");
        assert_eq!(messages[1].sender, Sender::Bot);
        assert!(messages[0].timestamp < messages[1].timestamp);
    }

    #[test]
    fn test_sender_from_str() {
        assert_eq!("bot".parse::<Sender>(), Ok(Sender::Bot));
        assert_eq!("assistant".parse::<Sender>(), Ok(Sender::Bot));
        assert!("system".parse::<Sender>().is_err());
    }
}
