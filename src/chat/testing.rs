//! Scripted collaborators shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::ids::MessageId;
use crate::chat::core::message::Message;
use crate::chat::presentation::view::{ScrollBehavior, Viewport, WidgetView};
use crate::chat::session::capabilities::{
    AssistantClient, ClientFuture, FixedAnswer, Navigator, StaticIdentity, UserIdentity,
};
use crate::chat::session::controller::SessionCollaborators;

pub(crate) struct ScriptedClient {
    history: Option<Vec<Message>>,
    replies: Mutex<VecDeque<Result<String, ()>>>,
    gate: Option<Semaphore>,
    history_calls: AtomicUsize,
    send_calls: AtomicUsize,
    questions: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn build(history: Option<Vec<Message>>, gated: bool) -> Self {
        Self {
            history,
            replies: Mutex::new(VecDeque::new()),
            gate: gated.then(|| Semaphore::new(0)),
            history_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_history(history: Vec<Message>) -> Self {
        Self::build(Some(history), false)
    }

    pub(crate) fn failing_history() -> Self {
        Self::build(None, false)
    }

    /// Sends block until [`Self::release`] is called.
    pub(crate) fn gated(history: Vec<Message>) -> Self {
        Self::build(Some(history), true)
    }

    /// Queue a reply; `Err(())` simulates a transport failure. Unscripted sends answer "ok".
    pub(crate) fn push_reply(&self, reply: Result<String, ()>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub(crate) fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl AssistantClient for ScriptedClient {
    fn fetch_history(&self) -> ClientFuture<'_, ChatResult<Vec<Message>>> {
        Box::pin(async move {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.history.clone().ok_or_else(|| {
                ChatError::Io(std::io::Error::other("connection refused"))
            })
        })
    }

    fn send_question(&self, text: &str) -> ClientFuture<'_, ChatResult<String>> {
        let text = text.to_string();
        Box::pin(async move {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            self.questions.lock().unwrap().push(text);
            if let Some(gate) = &self.gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            let scripted = self.replies.lock().unwrap().pop_front();
            match scripted {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(())) => Err(ChatError::Io(std::io::Error::other("connection reset"))),
                None => Ok("ok".to_string()),
            }
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

pub(crate) fn collaborators(
    client: &Arc<ScriptedClient>,
    navigator: &Arc<RecordingNavigator>,
    signed_in: bool,
    confirm_login: bool,
) -> SessionCollaborators {
    let identity = if signed_in {
        StaticIdentity::user(UserIdentity::new("u-1").with_token("t0k3n"))
    } else {
        StaticIdentity::guest()
    };
    SessionCollaborators {
        client: client.clone(),
        identity: Arc::new(identity),
        navigator: navigator.clone(),
        login_prompt: Arc::new(FixedAnswer(confirm_login)),
    }
}

#[derive(Default)]
pub(crate) struct RecordingViewport {
    views: Mutex<Vec<WidgetView>>,
    scrolls: Mutex<Vec<(MessageId, ScrollBehavior)>>,
}

impl RecordingViewport {
    /// Scroll targets in request order, whatever the behavior.
    pub(crate) fn scrolls(&self) -> Vec<MessageId> {
        self.scrolls.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    pub(crate) fn scroll_behaviors(&self) -> Vec<ScrollBehavior> {
        self.scrolls.lock().unwrap().iter().map(|(_, behavior)| *behavior).collect()
    }

    pub(crate) fn last_view(&self) -> Option<WidgetView> {
        self.views.lock().unwrap().last().cloned()
    }
}

impl Viewport for RecordingViewport {
    fn render(&self, view: &WidgetView) {
        self.views.lock().unwrap().push(view.clone());
    }

    fn scroll_to(&self, target: &MessageId, behavior: ScrollBehavior) {
        self.scrolls.lock().unwrap().push((target.clone(), behavior));
    }
}
