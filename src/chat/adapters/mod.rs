//! Front-end adapters: terminal viewport and tracing setup.

pub mod logging;
pub mod terminal;

pub use logging::init_tracing;
pub use terminal::{TerminalNavigator, TerminalViewport};
