//! Collaborators the session controller depends on.
//!
//! The controller never owns global state: identity, transport and navigation
//! are injected as trait objects at construction.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::chat::core::errors::ChatResult;
use crate::chat::core::message::Message;

/// Boxed future type for assistant client operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Request client for the backend assistant.
pub trait AssistantClient: Send + Sync {
    /// Load the persisted conversation of the current user.
    ///
    /// # Errors
    /// Returns an error if the request fails or the payload is invalid.
    fn fetch_history(&self) -> ClientFuture<'_, ChatResult<Vec<Message>>>;

    /// Ask the assistant a question and return its raw reply text.
    ///
    /// # Errors
    /// Returns an error if the request fails or the reply is unusable.
    fn send_question(&self, text: &str) -> ClientFuture<'_, ChatResult<String>>;
}

/// An identified storefront user.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Account identifier.
    pub id: String,
    /// Bearer token for authenticated requests.
    pub token: Option<String>,
}

impl UserIdentity {
    /// Identity with only an account id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: None,
        }
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Source of the currently signed-in user. Queried, never owned.
pub trait IdentityProvider: Send + Sync {
    /// The identified user, or `None` for guests.
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Fixed identity, useful for command-line front-ends.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentity(Option<UserIdentity>);

impl StaticIdentity {
    /// Provider that always reports `user`.
    #[must_use]
    pub const fn user(user: UserIdentity) -> Self {
        Self(Some(user))
    }

    /// Provider that always reports a guest.
    #[must_use]
    pub const fn guest() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}

/// Host routing. The controller requests navigation, the host performs it.
pub trait Navigator: Send + Sync {
    /// Navigate to an application path such as `/login` or `/product/42`.
    fn navigate_to(&self, path: &str);
}

/// Confirmation dialog shown before sending a guest to the login page.
pub trait LoginPrompt: Send + Sync {
    /// Ask the user; `true` means go to the login page.
    fn confirm_login(&self, message: &str) -> bool;
}

/// Prompt with a predetermined answer.
#[derive(Clone, Copy, Debug)]
pub struct FixedAnswer(pub bool);

impl LoginPrompt for FixedAnswer {
    fn confirm_login(&self, _message: &str) -> bool {
        self.0
    }
}
