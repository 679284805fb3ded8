//! Widget view model and the viewport it is drawn on.

use crate::chat::core::ids::MessageId;
use crate::chat::store::{ConversationState, SessionPhase};

/// How a scroll should move.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScrollBehavior {
    /// Animated scroll.
    Smooth,
    /// Jump without animation.
    Instant,
}

/// What the widget should currently look like.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WidgetView {
    /// Chat panel shown (otherwise only the launcher button).
    pub visible: bool,
    /// Unread badge on the launcher, shown only while hidden.
    pub badge: Option<u32>,
    /// Whether the input and send button accept submissions.
    pub input_enabled: bool,
    /// Typing indicator while a reply is outstanding.
    pub awaiting_reply: bool,
    /// Number of messages in the timeline.
    pub message_count: usize,
    /// Most recent message.
    pub latest: Option<MessageId>,
}

impl WidgetView {
    /// Derive the view from a store snapshot.
    #[must_use]
    pub fn from_state(state: &ConversationState) -> Self {
        let unread = state.unread_count();
        Self {
            visible: state.is_open(),
            badge: (!state.is_open() && unread > 0).then_some(unread),
            input_enabled: state.phase() == SessionPhase::Idle,
            awaiting_reply: state.is_sending(),
            message_count: state.messages().len(),
            latest: state.latest_id().cloned(),
        }
    }
}

/// Host surface the widget is drawn on.
pub trait Viewport: Send + Sync {
    /// Redraw chrome (visibility, badge, input state).
    fn render(&self, view: &WidgetView);

    /// Bring a message into view.
    fn scroll_to(&self, target: &MessageId, behavior: ScrollBehavior);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::core::message::Message;
    use crate::chat::store::ConversationStore;

    #[test]
    fn test_badge_only_when_hidden() {
        let store = ConversationStore::default();
        store.hydrate(vec![Message::bot("hi")]);
        store.increment_unread();

        let hidden = WidgetView::from_state(&store.snapshot());
        assert!(!hidden.visible);
        assert_eq!(hidden.badge, Some(1));
        assert_eq!(hidden.message_count, 1);

        store.set_open(true);
        let shown = WidgetView::from_state(&store.snapshot());
        assert!(shown.visible);
        assert_eq!(shown.badge, None);
    }

    #[test]
    fn test_input_disabled_while_sending_or_loading() {
        let store = ConversationStore::default();
        assert!(!WidgetView::from_state(&store.snapshot()).input_enabled);

        store.hydrate(Vec::new());
        assert!(WidgetView::from_state(&store.snapshot()).input_enabled);

        assert!(store.begin_exchange(Message::user("q")));
        let view = WidgetView::from_state(&store.snapshot());
        assert!(!view.input_enabled);
        assert!(view.awaiting_reply);
    }
}
