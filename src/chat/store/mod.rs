//! Conversation store and its snapshot types.

pub mod conversation_store;
pub mod state;

pub use conversation_store::ConversationStore;
pub use state::{ConversationState, HydrationStatus, SessionPhase};
