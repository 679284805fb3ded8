//! Reply markup handling.

pub mod link_parser;

pub use link_parser::{LinkParser, Segment, links};
