//! Snapshot of the conversation and the widget session around it.

use crate::chat::core::ids::MessageId;
use crate::chat::core::message::Message;

/// Progress of the one-time history load.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HydrationStatus {
    /// Nothing requested yet.
    #[default]
    Pending,
    /// History request outstanding.
    InFlight,
    /// Timeline hydrated (from history or the welcome fallback).
    Done,
}

/// Controller state derived from a snapshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionPhase {
    /// Mounted, history not requested.
    Uninitialized,
    /// History request outstanding.
    Hydrating,
    /// Ready to accept a submission.
    Idle,
    /// One send round-trip outstanding.
    Sending,
}

/// Consistent view of the timeline and session flags.
///
/// Obtained from [`super::ConversationStore::snapshot`]; mutating a snapshot
/// never affects the store.
#[derive(Clone, Debug, Default)]
pub struct ConversationState {
    pub(super) messages: Vec<Message>,
    pub(super) timeline_revision: u64,
    pub(super) hydration: HydrationStatus,
    pub(super) is_open: bool,
    pub(super) is_sending: bool,
    pub(super) unread_count: u32,
    pub(super) draft: String,
    pub(super) disposed: bool,
}

impl ConversationState {
    /// Timeline in display order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent message, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Identifier of the most recent message.
    #[must_use]
    pub fn latest_id(&self) -> Option<&MessageId> {
        self.latest().map(|message| &message.id)
    }

    /// Counter bumped on every append or hydration.
    #[must_use]
    pub const fn timeline_revision(&self) -> u64 {
        self.timeline_revision
    }

    /// History load progress.
    #[must_use]
    pub const fn hydration(&self) -> HydrationStatus {
        self.hydration
    }

    /// Whether the widget is visible.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether a send round-trip is outstanding.
    #[must_use]
    pub const fn is_sending(&self) -> bool {
        self.is_sending
    }

    /// Bot replies received while hidden.
    #[must_use]
    pub const fn unread_count(&self) -> u32 {
        self.unread_count
    }

    /// Uncommitted input text.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether the owning widget was torn down.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Controller phase implied by this snapshot.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        match self.hydration {
            HydrationStatus::Pending => SessionPhase::Uninitialized,
            HydrationStatus::InFlight => SessionPhase::Hydrating,
            HydrationStatus::Done if self.is_sending => SessionPhase::Sending,
            HydrationStatus::Done => SessionPhase::Idle,
        }
    }

    pub(super) fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.timeline_revision = self.timeline_revision.wrapping_add(1);
    }
}
