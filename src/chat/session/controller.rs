//! Chat session controller.
//!
//! Drives the conversation state machine:
//! `Uninitialized → Hydrating → Idle ⇄ Sending`.
//! Every collaborator failure is absorbed here and turned into a timeline
//! entry, so nothing escapes to the host page.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chat::core::config::WidgetConfig;
use crate::chat::core::errors::ChatResult;
use crate::chat::core::ids::ExchangeId;
use crate::chat::core::message::Message;
use crate::chat::markup::link_parser::{LinkParser, Segment};
use crate::chat::session::capabilities::{
    AssistantClient, IdentityProvider, LoginPrompt, Navigator,
};
use crate::chat::store::{ConversationStore, SessionPhase};

/// External dependencies of a chat session.
pub struct SessionCollaborators {
    /// Backend request client.
    pub client: Arc<dyn AssistantClient>,
    /// Current user lookup.
    pub identity: Arc<dyn IdentityProvider>,
    /// Host routing.
    pub navigator: Arc<dyn Navigator>,
    /// Login confirmation dialog.
    pub login_prompt: Arc<dyn LoginPrompt>,
}

/// Why the welcome message was used instead of history.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WelcomeReason {
    /// No identified user.
    Guest,
    /// History loaded but empty.
    EmptyHistory,
    /// History request failed.
    FetchFailed,
}

/// Result of [`ChatController::initialize`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HydrationOutcome {
    /// Timeline restored with this many messages.
    Restored(usize),
    /// Timeline seeded with the welcome message.
    Welcomed(WelcomeReason),
    /// Initialization already ran for this mount.
    AlreadyStarted,
}

/// Why a submission did nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IgnoreReason {
    /// Draft empty or whitespace only.
    Blank,
    /// History not loaded yet.
    NotReady,
    /// Another send is outstanding.
    Busy,
}

/// How a send round-trip ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExchangeOutcome {
    /// Reply appended.
    Answered,
    /// Error message appended.
    Failed,
    /// Widget torn down before the reply arrived; nothing written.
    Discarded,
    /// Task was cancelled or panicked.
    Aborted,
}

/// Handle on an outstanding send round-trip.
#[derive(Debug)]
pub struct PendingReply {
    exchange_id: ExchangeId,
    handle: JoinHandle<ExchangeOutcome>,
}

impl PendingReply {
    /// Correlation id of this exchange.
    #[must_use]
    pub const fn exchange_id(&self) -> ExchangeId {
        self.exchange_id
    }

    /// Wait for the round-trip to settle.
    pub async fn settled(self) -> ExchangeOutcome {
        self.handle.await.unwrap_or(ExchangeOutcome::Aborted)
    }
}

/// Result of [`ChatController::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing happened.
    Ignored(IgnoreReason),
    /// Guest user: the login prompt was shown instead of sending.
    LoginRequested {
        /// Whether the user accepted and navigation to the login page was requested.
        navigated: bool,
    },
    /// User message appended and the request dispatched.
    Dispatched(PendingReply),
}

/// Orchestrates hydration, sending, error fallback and guest gating.
#[derive(Clone)]
pub struct ChatController {
    store: Arc<ConversationStore>,
    client: Arc<dyn AssistantClient>,
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    login_prompt: Arc<dyn LoginPrompt>,
    parser: LinkParser,
    texts: Arc<WidgetConfig>,
}

impl ChatController {
    /// Create a controller over an existing store.
    ///
    /// # Errors
    /// Returns an error if the link parser cannot be built.
    pub fn new(
        store: Arc<ConversationStore>,
        collaborators: SessionCollaborators,
        texts: WidgetConfig,
    ) -> ChatResult<Self> {
        Ok(Self {
            store,
            client: collaborators.client,
            identity: collaborators.identity,
            navigator: collaborators.navigator,
            login_prompt: collaborators.login_prompt,
            parser: LinkParser::new()?,
            texts: Arc::new(texts),
        })
    }

    /// The store this controller writes to.
    #[must_use]
    pub const fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Load history once and hydrate the timeline.
    ///
    /// Guests, empty history and fetch failures all fall back to a single
    /// welcome message so the widget is never empty.
    pub async fn initialize(&self) -> HydrationOutcome {
        if !self.store.begin_hydration() {
            return HydrationOutcome::AlreadyStarted;
        }

        let reason = match self.identity.current_user() {
            None => {
                debug!("No identified user, seeding welcome message");
                WelcomeReason::Guest
            }
            Some(user) => match self.client.fetch_history().await {
                Ok(history) if !history.is_empty() => {
                    let count = history.len();
                    self.store.hydrate(history);
                    info!("Restored {} chat messages for user {}", count, user.id);
                    return HydrationOutcome::Restored(count);
                }
                Ok(_) => {
                    debug!("Empty chat history for user {}", user.id);
                    WelcomeReason::EmptyHistory
                }
                Err(err) => {
                    warn!("Failed to load chat history for user {}: {err}", user.id);
                    WelcomeReason::FetchFailed
                }
            },
        };

        self.store
            .hydrate(vec![Message::bot(self.texts.welcome_message.clone())]);
        HydrationOutcome::Welcomed(reason)
    }

    /// Replace the draft text.
    pub fn set_draft(&self, text: impl Into<String>) {
        self.store.set_draft(text);
    }

    /// Show or hide the widget.
    pub fn set_open(&self, open: bool) {
        self.store.set_open(open);
    }

    /// Submit the current draft.
    ///
    /// The user message is appended before the request leaves, and the
    /// round-trip runs on a spawned task. Must be called within a Tokio runtime.
    pub fn submit(&self) -> SubmitOutcome {
        let snapshot = self.store.snapshot();
        let text = snapshot.draft().trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::Blank);
        }

        match snapshot.phase() {
            SessionPhase::Uninitialized | SessionPhase::Hydrating => {
                return SubmitOutcome::Ignored(IgnoreReason::NotReady);
            }
            SessionPhase::Sending => return SubmitOutcome::Ignored(IgnoreReason::Busy),
            SessionPhase::Idle => {}
        }

        if self.identity.current_user().is_none() {
            let navigated = self.login_prompt.confirm_login(&self.texts.login_prompt);
            if navigated {
                self.navigator.navigate_to(&self.texts.login_path);
            }
            debug!("Guest submission gated, navigated to login: {navigated}");
            return SubmitOutcome::LoginRequested { navigated };
        }

        let question = text.to_string();
        if !self.store.begin_exchange(Message::user(question.clone())) {
            return SubmitOutcome::Ignored(IgnoreReason::Busy);
        }

        let exchange_id = ExchangeId::new();
        debug!("Dispatching chat exchange {exchange_id}");
        let controller = self.clone();
        let handle =
            tokio::spawn(async move { controller.run_exchange(exchange_id, question).await });

        SubmitOutcome::Dispatched(PendingReply {
            exchange_id,
            handle,
        })
    }

    /// Set the draft and submit it.
    pub fn ask(&self, text: impl Into<String>) -> SubmitOutcome {
        self.set_draft(text);
        self.submit()
    }

    async fn run_exchange(&self, exchange_id: ExchangeId, question: String) -> ExchangeOutcome {
        match self.client.send_question(&question).await {
            Ok(reply) => match self.store.finish_exchange(Message::bot(reply), true) {
                Some(counted_unread) => {
                    debug!("Exchange {exchange_id} answered (unread: {counted_unread})");
                    ExchangeOutcome::Answered
                }
                None => {
                    debug!("Exchange {exchange_id} answered after teardown, discarding");
                    ExchangeOutcome::Discarded
                }
            },
            Err(err) => {
                if err.is_transient() {
                    warn!("Exchange {exchange_id} failed, a manual retry may succeed: {err}");
                } else {
                    warn!("Exchange {exchange_id} failed: {err}");
                }
                let fallback = Message::bot(self.texts.error_message.clone());
                match self.store.finish_exchange(fallback, false) {
                    Some(_) => ExchangeOutcome::Failed,
                    None => ExchangeOutcome::Discarded,
                }
            }
        }
    }

    /// Segments to display for a message.
    #[must_use]
    pub fn render(&self, message: &Message) -> Vec<Segment> {
        self.parser.render(message)
    }

    /// Request navigation for a link segment. Text segments are ignored.
    ///
    /// Returns whether navigation was requested.
    pub fn follow_link(&self, segment: &Segment) -> bool {
        match segment.target() {
            Some(target) => {
                self.navigator.navigate_to(target);
                true
            }
            None => false,
        }
    }
}
