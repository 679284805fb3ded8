//! Mounted chat widget: store, controller and presentation adapter wired together.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::chat::core::config::ChatConfig;
use crate::chat::core::errors::ChatResult;
use crate::chat::presentation::{PresentationAdapter, Viewport, WidgetView};
use crate::chat::session::controller::{
    ChatController, HydrationOutcome, SessionCollaborators, SubmitOutcome,
};
use crate::chat::store::{ConversationState, ConversationStore, HydrationStatus};

/// A chat widget bound to one page lifetime.
///
/// Dropping the widget (or calling [`ChatWidget::teardown`]) disposes the
/// store: replies still in flight are discarded when they arrive.
pub struct ChatWidget {
    controller: ChatController,
    adapter: Option<JoinHandle<()>>,
    hydration: Option<JoinHandle<HydrationOutcome>>,
}

impl ChatWidget {
    /// Mount a widget with a fresh store. Must be called within a Tokio runtime.
    ///
    /// The identity is read once while hydrating. A host whose user signs in
    /// later tears the widget down and mounts a new one to load the history.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn mount(
        config: &ChatConfig,
        collaborators: SessionCollaborators,
        viewport: Arc<dyn Viewport>,
    ) -> ChatResult<Self> {
        let store = Arc::new(ConversationStore::new(config.widget.start_open));
        Self::mount_with_store(store, config, collaborators, viewport)
    }

    /// Mount a widget over a store created by the caller, for viewports that
    /// read the timeline themselves.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn mount_with_store(
        store: Arc<ConversationStore>,
        config: &ChatConfig,
        collaborators: SessionCollaborators,
        viewport: Arc<dyn Viewport>,
    ) -> ChatResult<Self> {
        config.validate()?;
        let controller =
            ChatController::new(Arc::clone(&store), collaborators, config.widget.clone())?;

        let adapter =
            PresentationAdapter::new(store, viewport, config.widget.scroll_settle()).spawn();

        let initializer = controller.clone();
        let hydration = tokio::spawn(async move { initializer.initialize().await });

        info!("Chat widget mounted");
        Ok(Self {
            controller,
            adapter: Some(adapter),
            hydration: Some(hydration),
        })
    }

    /// The session controller.
    #[must_use]
    pub const fn controller(&self) -> &ChatController {
        &self.controller
    }

    /// Current store snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ConversationState {
        self.controller.store().snapshot()
    }

    /// Current view model.
    #[must_use]
    pub fn view(&self) -> WidgetView {
        WidgetView::from_state(&self.snapshot())
    }

    /// Wait until the initial history load finished.
    ///
    /// Returns `None` if it was already awaited or the task was lost.
    pub async fn ready(&mut self) -> Option<HydrationOutcome> {
        let handle = self.hydration.take()?;
        handle.await.ok()
    }

    /// Whether the timeline has been hydrated.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.snapshot().hydration() == HydrationStatus::Done
    }

    /// Show the chat panel.
    pub fn open(&self) {
        self.controller.set_open(true);
    }

    /// Hide the chat panel.
    pub fn close(&self) {
        self.controller.set_open(false);
    }

    /// Flip visibility.
    pub fn toggle(&self) {
        let open = self.snapshot().is_open();
        self.controller.set_open(!open);
    }

    /// Submit `text` as if typed and sent by the user.
    pub fn ask(&self, text: impl Into<String>) -> SubmitOutcome {
        self.controller.ask(text)
    }

    /// Dispose the store and wait for the presentation adapter to stop.
    pub async fn teardown(mut self) {
        self.controller.store().dispose();
        if let Some(adapter) = self.adapter.take() {
            let _ = adapter.await;
        }
        info!("Chat widget torn down");
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        self.controller.store().dispose();
    }
}
