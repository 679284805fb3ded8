//! Presentation adapter.
//!
//! Watches the conversation store and turns state transitions into widget
//! effects: redraws and deferred scroll-to-latest. The unread reset on open
//! belongs to the store transition itself, so it cannot be lost when the
//! channel coalesces an open/close pair.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::chat::presentation::view::{ScrollBehavior, Viewport, WidgetView};
use crate::chat::store::{ConversationState, ConversationStore};

/// Side effect triggered by a state transition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UiEffect {
    /// Scroll to the final message once layout settles.
    ScrollToLatest,
}

/// Effects for the transition `previous → next`, in execution order.
///
/// - widget opened with a non-empty timeline: scroll
/// - timeline appended or hydrated: scroll
/// - send settled (`is_sending` true → false): scroll
#[must_use]
pub fn plan_effects(previous: &ConversationState, next: &ConversationState) -> Vec<UiEffect> {
    let opened = !previous.is_open() && next.is_open();
    let timeline_changed = previous.timeline_revision() != next.timeline_revision();
    let send_settled = previous.is_sending() && !next.is_sending();
    if (opened || timeline_changed || send_settled) && !next.messages().is_empty() {
        vec![UiEffect::ScrollToLatest]
    } else {
        Vec::new()
    }
}

/// Maps store state onto a [`Viewport`].
pub struct PresentationAdapter {
    store: Arc<ConversationStore>,
    viewport: Arc<dyn Viewport>,
    settle: Duration,
    scroll_generation: Arc<AtomicU64>,
}

impl PresentationAdapter {
    /// Create an adapter. `settle` is the delay before each scroll.
    #[must_use]
    pub fn new(store: Arc<ConversationStore>, viewport: Arc<dyn Viewport>, settle: Duration) -> Self {
        Self {
            store,
            viewport,
            settle,
            scroll_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run the adapter on its own task.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process transitions until the store is disposed.
    pub async fn run(self) {
        let mut rx = self.store.subscribe();
        let mut previous = rx.borrow_and_update().clone();
        self.viewport.render(&WidgetView::from_state(&previous));
        if previous.is_open() && !previous.messages().is_empty() {
            self.schedule_scroll(ScrollBehavior::Instant);
        }

        while rx.changed().await.is_ok() {
            let current = rx.borrow_and_update().clone();
            if current.is_disposed() {
                break;
            }

            self.viewport.render(&WidgetView::from_state(&current));
            for effect in plan_effects(&previous, &current) {
                match effect {
                    UiEffect::ScrollToLatest => self.schedule_scroll(ScrollBehavior::Smooth),
                }
            }
            previous = current;
        }

        debug!("Presentation adapter stopped");
    }

    /// Scroll after the settle delay. A newer request supersedes an older
    /// one still waiting, and the target is read when the timer fires.
    ///
    /// The first paint of an already open widget jumps; later scrolls animate.
    fn schedule_scroll(&self, behavior: ScrollBehavior) {
        let generation = self.scroll_generation.fetch_add(1, Ordering::AcqRel) + 1;
        let latest_generation = Arc::clone(&self.scroll_generation);
        let store = Arc::clone(&self.store);
        let viewport = Arc::clone(&self.viewport);
        let settle = self.settle;

        tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            if latest_generation.load(Ordering::Acquire) != generation || store.is_disposed() {
                return;
            }
            let snapshot = store.snapshot();
            if let Some(target) = snapshot.latest_id() {
                viewport.scroll_to(target, behavior);
            }
        });
    }
}
