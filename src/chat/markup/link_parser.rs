//! Parser for product links embedded in assistant replies.
//!
//! The assistant writes links as `[label](/product/<id>)`. Everything else,
//! including partial or malformed markup, is kept as plain text.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chat::core::message::Message;

/// Pattern for a complete product link: label without `]`, id without `)`.
const PRODUCT_LINK_PATTERN: &str = r"\[([^\]]+)\]\((/product/[^\)]+)\)";

/// A renderable piece of a message.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Verbatim text.
    Text {
        /// The text, whitespace and emoji included.
        value: String,
    },
    /// Navigable link to a product page.
    Link {
        /// Visible label.
        label: String,
        /// Route path, always of the form `/product/<id>`.
        target: String,
    },
}

impl Segment {
    /// Build a text segment.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Build a link segment.
    #[must_use]
    pub fn link(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Link {
            label: label.into(),
            target: target.into(),
        }
    }

    /// Navigation target, if this is a link.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Link { target, .. } => Some(target),
            Self::Text { .. } => None,
        }
    }

    /// Text shown to the user for this segment.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            Self::Text { value } => value,
            Self::Link { label, .. } => label,
        }
    }
}

/// Compiled link parser. Cheap to share, immutable after construction.
#[derive(Clone, Debug)]
pub struct LinkParser {
    pattern: Regex,
}

impl LinkParser {
    /// Compile the product link pattern.
    ///
    /// # Errors
    /// Returns an error if the pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(PRODUCT_LINK_PATTERN)?,
        })
    }

    /// Split raw content into text and link segments, left to right.
    ///
    /// Empty input yields no segments. Input without any link yields exactly
    /// one text segment holding the whole input. Adjacent links never produce
    /// an empty text segment between them.
    #[must_use]
    pub fn parse(&self, content: &str) -> Vec<Segment> {
        if content.is_empty() {
            return Vec::new();
        }

        let mut segments = Vec::new();
        let mut cursor = 0;

        for caps in self.pattern.captures_iter(content) {
            let (Some(whole), Some(label), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };

            if whole.start() > cursor {
                segments.push(Segment::text(&content[cursor..whole.start()]));
            }
            segments.push(Segment::link(label.as_str(), target.as_str()));
            cursor = whole.end();
        }

        if cursor < content.len() {
            segments.push(Segment::text(&content[cursor..]));
        }

        segments
    }

    /// Segments for a timeline message.
    ///
    /// Only bot messages carry link markup; user text is shown verbatim.
    #[must_use]
    pub fn render(&self, message: &Message) -> Vec<Segment> {
        if message.is_bot() {
            self.parse(&message.content)
        } else if message.content.is_empty() {
            Vec::new()
        } else {
            vec![Segment::text(message.content.clone())]
        }
    }
}

/// Link segments only, in order.
pub fn links(segments: &[Segment]) -> impl Iterator<Item = &Segment> {
    segments.iter().filter(|segment| segment.target().is_some())
}
