//! Widget lifecycle.

pub mod chat_widget;

pub use chat_widget::ChatWidget;
