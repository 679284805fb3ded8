//! Core chat types: configuration, errors, identifiers and messages.

pub mod config;
pub mod errors;
pub mod ids;
pub mod message;

pub use config::{ApiConfig, ChatConfig, WidgetConfig};
pub use errors::{ChatError, ChatResult};
pub use ids::{ExchangeId, IdParseError, MessageId};
pub use message::{Message, Sender};
