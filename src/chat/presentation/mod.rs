//! Presentation: view model, viewport trait and the store-driven adapter.

pub mod adapter;
pub mod view;

pub use adapter::{PresentationAdapter, UiEffect, plan_effects};
pub use view::{ScrollBehavior, Viewport, WidgetView};
