//! Storefront chat widget.
//!
//! - [`core`]: configuration, errors, identifiers and messages
//! - [`markup`]: product-link parsing of assistant replies
//! - [`store`]: observable conversation state
//! - [`session`]: hydration, sending and guest gating
//! - [`presentation`]: view model, unread reset and deferred scrolling
//! - [`transport`]: HTTP client for the assistant backend
//! - [`widget`]: mount and teardown of a whole widget
//! - [`adapters`]: terminal front-end and tracing setup

pub mod adapters;
pub mod core;
pub mod markup;
pub mod presentation;
pub mod session;
pub mod store;
pub mod transport;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use self::core::{ChatConfig, ChatError, ChatResult, Message, MessageId, Sender};
pub use markup::{LinkParser, Segment};
pub use session::{ChatController, SessionCollaborators, SubmitOutcome};
pub use store::{ConversationState, ConversationStore};
pub use widget::ChatWidget;
