//! Chat session orchestration and the collaborators it consumes.

pub mod capabilities;
pub mod controller;

pub use capabilities::{
    AssistantClient, ClientFuture, FixedAnswer, IdentityProvider, LoginPrompt, Navigator,
    StaticIdentity, UserIdentity,
};
pub use controller::{
    ChatController, ExchangeOutcome, HydrationOutcome, IgnoreReason, PendingReply,
    SessionCollaborators, SubmitOutcome, WelcomeReason,
};
