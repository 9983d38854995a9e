//! # View lifecycle contract.
//!
//! A [`View`] is a screen owned by the [`NavigationManager`](crate::NavigationManager)
//! from registration until unregistration. The manager drives its hooks:
//!
//! ```text
//! navigate away:  save_state ──► unmount
//! navigate to:    mount(params) ──► resize ──► restore_state (if a snapshot exists)
//! ```
//!
//! Hooks are awaited one at a time; a view never sees `mount` while another view is
//! still mounted.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ViewError;
use crate::navigation::ViewState;

/// Terminal area available to a view, in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewSize {
    pub width: u16,
    pub height: u16,
}

impl ViewSize {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Key binding advertised by a view (for help bars and dispatch).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: String,
    pub description: String,
    /// Message kind the host publishes when the key is pressed.
    pub action: String,
}

impl KeyBinding {
    pub fn new(
        key: impl Into<String>,
        description: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            action: action.into(),
        }
    }
}

/// A navigable screen.
#[async_trait]
pub trait View: Send + Sync + 'static {
    /// Registry key; must be stable for the lifetime of the view.
    fn id(&self) -> &str;

    /// Called when the view becomes active.
    async fn mount(&mut self, params: &Value) -> Result<(), ViewError>;

    /// Called when the view stops being active.
    async fn unmount(&mut self) -> Result<(), ViewError> {
        Ok(())
    }

    fn resize(&mut self, _size: ViewSize) {}

    /// Snapshot taken before unmount. `None` keeps any previous snapshot.
    async fn save_state(&mut self) -> Result<Option<ViewState>, ViewError> {
        Ok(None)
    }

    /// Applies a snapshot after mount.
    async fn restore_state(&mut self, _state: ViewState) -> Result<(), ViewError> {
        Ok(())
    }

    /// Produces the lines to draw; terminal output is the host's job.
    fn render(&self, _size: ViewSize) -> Vec<String> {
        Vec::new()
    }

    fn key_bindings(&self) -> Vec<KeyBinding> {
        Vec::new()
    }
}
