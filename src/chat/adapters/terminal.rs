//! Line-oriented terminal front-end.
//!
//! The viewport prints the timeline incrementally: a scroll request flushes
//! every message not printed yet, as long as the panel is visible. Links are
//! numbered so the user can follow them with `/link <n>`.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::chat::core::errors::ChatResult;
use crate::chat::core::ids::MessageId;
use crate::chat::core::message::{Message, Sender};
use crate::chat::markup::{self, LinkParser, Segment};
use crate::chat::presentation::{ScrollBehavior, Viewport, WidgetView};
use crate::chat::session::Navigator;
use crate::chat::store::ConversationStore;

#[derive(Default)]
struct Cursor {
    printed: usize,
    links: Vec<Segment>,
    last_view: Option<WidgetView>,
}

/// [`Viewport`] writing to any byte sink.
pub struct TerminalViewport<W> {
    store: Arc<ConversationStore>,
    parser: LinkParser,
    out: Mutex<W>,
    cursor: Mutex<Cursor>,
}

impl<W: Write + Send> TerminalViewport<W> {
    /// Create a viewport over `store`, writing to `out`.
    ///
    /// # Errors
    /// Returns an error if the link parser cannot be built.
    pub fn new(store: Arc<ConversationStore>, out: W) -> ChatResult<Self> {
        Ok(Self {
            store,
            parser: LinkParser::new()?,
            out: Mutex::new(out),
            cursor: Mutex::new(Cursor::default()),
        })
    }

    /// Link printed as `[n]`, counting from 1.
    #[must_use]
    pub fn link_target(&self, number: usize) -> Option<Segment> {
        let cursor = self.cursor.lock().ok()?;
        number
            .checked_sub(1)
            .and_then(|index| cursor.links.get(index))
            .cloned()
    }

    fn emit(&self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        for line in lines {
            if let Err(err) = writeln!(out, "{line}") {
                warn!("Failed to write to terminal: {err}");
                return;
            }
        }
        let _ = out.flush();
    }

    fn format_message(&self, message: &Message, links: &mut Vec<Segment>) -> String {
        let mut line = format!(
            "[{}] {}> ",
            message.timestamp.format("%H:%M"),
            match message.sender {
                Sender::User => "you",
                Sender::Bot => "bot",
            }
        );
        let segments = self.parser.render(message);
        let mut number = links.len();
        links.extend(markup::links(&segments).cloned());
        for segment in &segments {
            match segment {
                Segment::Text { value } => line.push_str(value),
                Segment::Link { label, .. } => {
                    number += 1;
                    let _ = write!(line, "{label} [{number}]");
                }
            }
        }
        line
    }
}

impl<W: Write + Send> Viewport for TerminalViewport<W> {
    fn render(&self, view: &WidgetView) {
        let Ok(mut cursor) = self.cursor.lock() else {
            return;
        };
        let previous = cursor.last_view.replace(view.clone());
        let mut lines = Vec::new();

        let was_visible = previous.as_ref().is_some_and(|prev| prev.visible);
        if previous.is_some() && was_visible != view.visible {
            lines.push(if view.visible {
                "-- chat opened --".to_string()
            } else {
                "-- chat closed --".to_string()
            });
        }

        let previous_badge = previous.as_ref().and_then(|prev| prev.badge);
        if let Some(unread) = view.badge.filter(|unread| Some(*unread) != previous_badge) {
            lines.push(format!("-- {unread} unread (type /open) --"));
        }

        let was_waiting = previous.as_ref().is_some_and(|prev| prev.awaiting_reply);
        if view.visible && view.awaiting_reply && !was_waiting {
            lines.push("bot is typing...".to_string());
        }
        drop(cursor);
        self.emit(&lines);
    }

    fn scroll_to(&self, _target: &MessageId, _behavior: ScrollBehavior) {
        let Ok(mut cursor) = self.cursor.lock() else {
            return;
        };
        if !cursor.last_view.as_ref().is_some_and(|view| view.visible) {
            return;
        }

        let snapshot = self.store.snapshot();
        let pending = snapshot.messages().get(cursor.printed..).unwrap_or_default();
        let mut links = std::mem::take(&mut cursor.links);
        let lines: Vec<String> = pending
            .iter()
            .map(|message| self.format_message(message, &mut links))
            .collect();
        cursor.links = links;
        cursor.printed = snapshot.messages().len();
        drop(cursor);
        self.emit(&lines);
    }
}

/// [`Navigator`] that announces the target path instead of routing.
pub struct TerminalNavigator<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalNavigator<W> {
    /// Create a navigator writing to `out`.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> Navigator for TerminalNavigator<W> {
    fn navigate_to(&self, path: &str) {
        if let Ok(mut out) = self.out.lock() {
            if let Err(err) = writeln!(out, "-> {path}") {
                warn!("Failed to write to terminal: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn viewport(store: &Arc<ConversationStore>) -> (TerminalViewport<SharedBuffer>, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (
            TerminalViewport::new(Arc::clone(store), buffer.clone()).unwrap(),
            buffer,
        )
    }

    fn scroll(viewport: &TerminalViewport<SharedBuffer>, store: &ConversationStore) {
        let snapshot = store.snapshot();
        viewport.render(&WidgetView::from_state(&snapshot));
        if let Some(id) = snapshot.latest_id() {
            viewport.scroll_to(id, ScrollBehavior::Smooth);
        }
    }

    #[test]
    fn test_prints_only_new_messages_with_numbered_links() {
        let store = Arc::new(ConversationStore::new(true));
        store.hydrate(vec![Message::user("any shoes?")]);
        let (viewport, buffer) = viewport(&store);

        scroll(&viewport, &store);
        store.append_message(Message::bot(
            "Try [Runner](/product/1) or [Trail](/product/2).",
        ));
        scroll(&viewport, &store);

        let output = buffer.contents();
        assert_eq!(output.matches("any shoes?").count(), 1);
        assert!(output.contains("bot> Try Runner [1] or Trail [2]."));
        assert_eq!(
            viewport.link_target(2).as_ref().and_then(Segment::target),
            Some("/product/2")
        );
        assert!(viewport.link_target(0).is_none());
        assert!(viewport.link_target(3).is_none());
    }

    #[test]
    fn test_user_text_is_not_linkified() {
        let store = Arc::new(ConversationStore::new(true));
        store.hydrate(vec![Message::user("[x](/product/1)")]);
        let (viewport, buffer) = viewport(&store);
        scroll(&viewport, &store);

        assert!(buffer.contents().contains("you> [x](/product/1)"));
        assert!(viewport.link_target(1).is_none());
    }

    #[test]
    fn test_hidden_panel_defers_printing_and_shows_badge() {
        let store = Arc::new(ConversationStore::default());
        store.hydrate(vec![Message::bot("hello")]);
        let (viewport, buffer) = viewport(&store);
        scroll(&viewport, &store);
        assert!(!buffer.contents().contains("hello"));

        store.increment_unread();
        scroll(&viewport, &store);
        assert!(buffer.contents().contains("-- 1 unread (type /open) --"));

        store.set_open(true);
        scroll(&viewport, &store);
        let output = buffer.contents();
        assert!(output.contains("-- chat opened --"));
        assert!(output.contains("bot> hello"));
    }

    #[test]
    fn test_navigator_announces_path() {
        let buffer = SharedBuffer::default();
        let navigator = TerminalNavigator::new(buffer.clone());
        navigator.navigate_to("/product/9");
        assert_eq!(buffer.contents(), "-> /product/9\n");
    }
}
