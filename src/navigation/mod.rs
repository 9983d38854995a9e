//! # Navigation and view lifecycle.
//!
//! - [`NavigationStack`] / [`NavigationEntry`] - bounded history of visited views
//! - [`View`] - lifecycle contract implemented by screens
//! - [`NavigationManager`] - registry, transitions, tabs and saved snapshots
//! - [`Tab`], [`ViewSize`], [`KeyBinding`] - supporting value types

mod manager;
mod stack;
mod tabs;
mod view;

pub use manager::{NavigationManager, NAVIGATION_CHANGED};
pub use stack::{NavigationEntry, NavigationStack, ViewState};
pub use tabs::Tab;
pub use view::{KeyBinding, View, ViewSize};
