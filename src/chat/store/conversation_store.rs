//! Conversation store: the single owner of the timeline.
//!
//! State lives behind a `tokio::sync::watch` channel. Every transition is one
//! `send_if_modified` call, so readers only ever see whole snapshots and
//! subscribers are woken once per effective change. The disposed flag lives
//! in the state too, so a write either lands before teardown or not at all.

use tokio::sync::watch;
use tracing::debug;

use crate::chat::core::message::Message;
use crate::chat::store::state::{ConversationState, HydrationStatus};

/// Append-only timeline plus widget session flags.
pub struct ConversationStore {
    state: watch::Sender<ConversationState>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConversationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(start_open: bool) -> Self {
        let initial = ConversationState {
            is_open: start_open,
            ..ConversationState::default()
        };
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    /// Clone the current state.
    #[must_use]
    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    /// Receive a notification after every effective transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    /// Insert a message at the tail.
    pub fn append_message(&self, message: Message) {
        self.apply("append_message", |state| {
            state.push(message);
            true
        });
    }

    /// Replace the timeline wholesale and mark hydration complete.
    pub fn hydrate(&self, messages: Vec<Message>) {
        self.apply("hydrate", |state| {
            state.messages = messages;
            state.timeline_revision = state.timeline_revision.wrapping_add(1);
            state.hydration = HydrationStatus::Done;
            true
        });
    }

    /// Set the outstanding-send flag.
    pub fn set_sending(&self, sending: bool) {
        self.apply("set_sending", |state| {
            replace_if_changed(&mut state.is_sending, sending)
        });
    }

    /// Set widget visibility. Opening clears the unread counter in the same
    /// transition.
    pub fn set_open(&self, open: bool) {
        self.apply("set_open", |state| {
            if !replace_if_changed(&mut state.is_open, open) {
                return false;
            }
            if open {
                state.unread_count = 0;
            }
            true
        });
    }

    /// Replace the draft text.
    pub fn set_draft(&self, draft: impl Into<String>) {
        let draft = draft.into();
        self.apply("set_draft", |state| {
            if state.draft == draft {
                return false;
            }
            state.draft = draft;
            true
        });
    }

    /// Count one more unread reply.
    pub fn increment_unread(&self) {
        self.apply("increment_unread", |state| {
            state.unread_count = state.unread_count.saturating_add(1);
            true
        });
    }

    /// Clear the unread counter.
    pub fn reset_unread(&self) {
        self.apply("reset_unread", |state| {
            replace_if_changed(&mut state.unread_count, 0)
        });
    }

    /// Move hydration from pending to in-flight.
    ///
    /// Returns `false` if hydration was already started.
    pub fn begin_hydration(&self) -> bool {
        self.apply("begin_hydration", |state| {
            if state.hydration != HydrationStatus::Pending {
                return false;
            }
            state.hydration = HydrationStatus::InFlight;
            true
        })
    }

    /// Start a send round-trip: append the user message, clear the draft and
    /// raise the sending flag, all in one transition.
    ///
    /// Returns `false` (and changes nothing) when a send is already
    /// outstanding or the timeline is not hydrated yet.
    pub fn begin_exchange(&self, user_message: Message) -> bool {
        self.apply("begin_exchange", |state| {
            if state.is_sending || state.hydration != HydrationStatus::Done {
                return false;
            }
            state.push(user_message);
            state.draft.clear();
            state.is_sending = true;
            true
        })
    }

    /// Settle a send round-trip: append the bot message and drop the sending
    /// flag. When `counts_as_unread` is set and the widget is hidden, the
    /// unread counter is incremented in the same transition.
    ///
    /// Returns `None` if the store was disposed, otherwise whether the reply
    /// was counted as unread.
    pub fn finish_exchange(&self, bot_message: Message, counts_as_unread: bool) -> Option<bool> {
        let mut counted = None;
        self.apply("finish_exchange", |state| {
            state.push(bot_message);
            state.is_sending = false;
            let unread = counts_as_unread && !state.is_open;
            if unread {
                state.unread_count = state.unread_count.saturating_add(1);
            }
            counted = Some(unread);
            true
        });
        counted
    }

    /// Stop accepting writes. Subscribers are woken one last time.
    pub fn dispose(&self) {
        if self.apply("dispose", |state| {
            state.disposed = true;
            true
        }) {
            debug!("Conversation store disposed");
        }
    }

    /// Whether [`Self::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Run `mutate` under the channel's write lock unless the store is disposed.
    fn apply(&self, op: &'static str, mutate: impl FnOnce(&mut ConversationState) -> bool) -> bool {
        self.state.send_if_modified(|state| {
            if state.disposed {
                debug!("Ignoring {op} on disposed conversation store");
                return false;
            }
            mutate(state)
        })
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
