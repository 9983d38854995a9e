//! # View orchestration on top of the navigation stack.
//!
//! [`NavigationManager`] owns the view registry, the [`NavigationStack`], saved view
//! snapshots and the tab list, and drives the [`View`] hooks during transitions.
//!
//! ## Transition sequence
//! ```text
//! navigate_to(target)
//!   ├─ lock transitions (held until the end)
//!   ├─ target registered?            no → ViewNotRegistered (nothing touched)
//!   ├─ active.save_state()           err → Hook(SaveState), previous view stays active
//!   ├─ active.unmount()              err → Hook(Unmount),   previous view stays active
//!   ├─ store snapshot, push entry
//!   ├─ target.mount(params)          err → Hook(Mount),  entry stays pushed, no active view
//!   ├─ target.resize(size)
//!   ├─ target.restore_state(saved)   err → Hook(RestoreState), target unmounted, no active view
//!   └─ publish "navigation.changed" on the bus (after the lock is released)
//! ```
//!
//! ## Rules
//! - Only one transition is in flight at a time; two views are never active together.
//! - Saved snapshots live in the manager keyed by view id, independently of the stack;
//!   they take precedence over the snapshot stored on a stack entry.
//! - `unregister_view` never calls hooks, even on the active view.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::bus::{EventBus, PublishOptions};
use crate::config::NavigationConfig;
use crate::error::{Hook, NavigationError};
use crate::navigation::tabs::TabSet;
use crate::navigation::{
    KeyBinding, NavigationEntry, NavigationStack, Tab, View, ViewSize, ViewState,
};

/// Message kind published on every completed transition.
pub const NAVIGATION_CHANGED: &str = "navigation.changed";

struct NavState {
    stack: NavigationStack,
    views: HashMap<String, Box<dyn View>>,
    saved: HashMap<String, ViewState>,
    tabs: TabSet,
    active: Option<String>,
    size: ViewSize,
}

/// Navigation history plus view lifecycle driver.
pub struct NavigationManager {
    state: Mutex<NavState>,
    bus: Option<Arc<EventBus>>,
}

impl NavigationManager {
    /// Creates a manager without an attached event bus.
    pub fn new(cfg: NavigationConfig) -> Self {
        Self::build(cfg, None, HashMap::new())
    }

    /// Creates a manager that reports transitions on `bus`.
    pub fn with_bus(cfg: NavigationConfig, bus: Arc<EventBus>) -> Self {
        Self::build(cfg, Some(bus), HashMap::new())
    }

    /// Creates a manager with views pre-registered (no hooks are called).
    pub fn with_views(
        cfg: NavigationConfig,
        bus: Option<Arc<EventBus>>,
        views: Vec<Box<dyn View>>,
    ) -> Result<Self, NavigationError> {
        let mut map: HashMap<String, Box<dyn View>> = HashMap::with_capacity(views.len());
        for view in views {
            let id = view.id().to_string();
            if map.contains_key(&id) {
                return Err(NavigationError::ViewAlreadyRegistered { view: id });
            }
            map.insert(id, view);
        }
        Ok(Self::build(cfg, bus, map))
    }

    fn build(
        cfg: NavigationConfig,
        bus: Option<Arc<EventBus>>,
        views: HashMap<String, Box<dyn View>>,
    ) -> Self {
        Self {
            state: Mutex::new(NavState {
                stack: NavigationStack::new(cfg.stack_capacity()),
                views,
                saved: HashMap::new(),
                tabs: TabSet::default(),
                active: None,
                size: ViewSize::default(),
            }),
            bus,
        }
    }

    // === Registry ===

    pub async fn register_view(&self, view: Box<dyn View>) -> Result<(), NavigationError> {
        let id = view.id().to_string();
        let mut st = self.state.lock().await;
        if st.views.contains_key(&id) {
            return Err(NavigationError::ViewAlreadyRegistered { view: id });
        }
        debug!(view = %id, "view registered");
        st.views.insert(id, view);
        Ok(())
    }

    /// Removes a view and its saved snapshot; returns whether it was registered.
    ///
    /// No hook is called. If the view is active, the manager simply forgets it, so
    /// callers navigate away first when an orderly unmount matters.
    pub async fn unregister_view(&self, view_id: &str) -> bool {
        let mut st = self.state.lock().await;
        if st.views.remove(view_id).is_none() {
            return false;
        }
        st.saved.remove(view_id);
        st.tabs.remove_view(view_id);
        if st.active.as_deref() == Some(view_id) {
            warn!(view = view_id, "active view unregistered without unmount");
            st.active = None;
        }
        debug!(view = view_id, "view unregistered");
        true
    }

    pub async fn is_registered(&self, view_id: &str) -> bool {
        self.state.lock().await.views.contains_key(view_id)
    }

    // === Transitions ===

    /// Deactivates the current view, pushes `view_id` and activates it.
    pub async fn navigate_to(
        &self,
        view_id: &str,
        params: Option<Value>,
    ) -> Result<(), NavigationError> {
        let from = {
            let mut st = self.state.lock().await;
            ensure_registered(&st, view_id)?;

            let from = deactivate(&mut st).await?;
            let params = params.unwrap_or(Value::Null);
            let evicted = st.stack.push(view_id, Some(params.clone()), None);
            if evicted > 0 {
                debug!(evicted, "navigation history trimmed");
            }
            activate(&mut st, view_id, &params, None).await?;
            from
        };
        debug!(from = ?from, to = view_id, "navigated");
        self.announce(from.as_deref(), Some(view_id), "navigate");
        Ok(())
    }

    /// Pops the current entry and re-activates the one below it.
    ///
    /// Returns `Ok(false)` when there is nothing to go back to.
    pub async fn go_back(&self) -> Result<bool, NavigationError> {
        let (from, to) = {
            let mut st = self.state.lock().await;
            let Some(prev) = st.stack.previous().cloned() else {
                return Ok(false);
            };
            ensure_registered(&st, &prev.view_id)?;

            let from = deactivate(&mut st).await?;
            st.stack.pop();
            activate(&mut st, &prev.view_id, &prev.params, prev.state.clone()).await?;
            (from, prev.view_id)
        };
        debug!(from = ?from, to = %to, "navigated back");
        self.announce(from.as_deref(), Some(&to), "back");
        Ok(true)
    }

    /// Saves and unmounts the active view without touching the stack.
    ///
    /// Returns whether a view was active.
    pub async fn unmount_active(&self) -> Result<bool, NavigationError> {
        let from = {
            let mut st = self.state.lock().await;
            deactivate(&mut st).await?
        };
        if from.is_some() {
            self.announce(from.as_deref(), None, "unmount");
        }
        Ok(from.is_some())
    }

    // === Tabs ===

    /// Adds a tab for a registered view; returns `false` if the tab id is taken.
    ///
    /// The first tab added while no view is active is switched to immediately.
    pub async fn add_tab(
        &self,
        tab_id: &str,
        view_id: &str,
        title: &str,
    ) -> Result<bool, NavigationError> {
        let activate_now = {
            let mut st = self.state.lock().await;
            ensure_registered(&st, view_id)?;
            let added = st.tabs.add(Tab {
                id: tab_id.to_string(),
                view_id: view_id.to_string(),
                title: title.to_string(),
            });
            if !added {
                return Ok(false);
            }
            st.active.is_none() && st.tabs.active().is_none()
        };
        if activate_now {
            self.switch_to_tab(tab_id).await?;
        }
        Ok(true)
    }

    /// Deactivates the current view and activates the tab's view.
    ///
    /// Tabs do not touch the navigation stack.
    pub async fn switch_to_tab(&self, tab_id: &str) -> Result<(), NavigationError> {
        let (from, to) = {
            let mut st = self.state.lock().await;
            let tab = st
                .tabs
                .get(tab_id)
                .cloned()
                .ok_or_else(|| NavigationError::TabNotFound {
                    tab: tab_id.to_string(),
                })?;
            ensure_registered(&st, &tab.view_id)?;

            let from = deactivate(&mut st).await?;
            st.tabs.activate(tab_id);
            activate(&mut st, &tab.view_id, &Value::Null, None).await?;
            (from, tab.view_id)
        };
        debug!(tab = tab_id, view = %to, "switched tab");
        self.announce(from.as_deref(), Some(&to), "tab");
        Ok(())
    }

    /// Removes a tab; deactivates its view first if the tab was active.
    pub async fn close_tab(&self, tab_id: &str) -> Result<bool, NavigationError> {
        let mut st = self.state.lock().await;
        let Some(tab) = st.tabs.get(tab_id).cloned() else {
            return Ok(false);
        };
        let was_active = st.tabs.active().is_some_and(|t| t.id == tab_id);
        if was_active && st.active.as_deref() == Some(tab.view_id.as_str()) {
            deactivate(&mut st).await?;
        }
        st.tabs.remove(tab_id);
        Ok(true)
    }

    pub async fn tabs(&self) -> Vec<Tab> {
        self.state.lock().await.tabs.list()
    }

    pub async fn active_tab(&self) -> Option<Tab> {
        self.state.lock().await.tabs.active().cloned()
    }

    // === Explicit state checkpoints ===

    /// Runs the view's `save_state` hook and stores the snapshot.
    ///
    /// Returns whether a snapshot was produced.
    pub async fn save_view_state(&self, view_id: &str) -> Result<bool, NavigationError> {
        let mut st = self.state.lock().await;
        let view = st
            .views
            .get_mut(view_id)
            .ok_or_else(|| not_registered(view_id))?;
        let snapshot = view
            .save_state()
            .await
            .map_err(|e| NavigationError::hook(view_id, Hook::SaveState, e))?;
        match snapshot {
            Some(state) => {
                store_snapshot(&mut st, view_id, state);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Applies the stored snapshot through the view's `restore_state` hook.
    ///
    /// Returns `Ok(false)` when no snapshot exists for the view.
    pub async fn restore_view_state(&self, view_id: &str) -> Result<bool, NavigationError> {
        let mut st = self.state.lock().await;
        let Some(state) = st.saved.get(view_id).cloned() else {
            ensure_registered(&st, view_id)?;
            return Ok(false);
        };
        let view = st
            .views
            .get_mut(view_id)
            .ok_or_else(|| not_registered(view_id))?;
        view.restore_state(state)
            .await
            .map_err(|e| NavigationError::hook(view_id, Hook::RestoreState, e))?;
        Ok(true)
    }

    pub async fn saved_state(&self, view_id: &str) -> Option<ViewState> {
        self.state.lock().await.saved.get(view_id).cloned()
    }

    // === Active view pass-throughs ===

    /// Records the terminal size and forwards it to the active view.
    pub async fn resize(&self, size: ViewSize) {
        let mut st = self.state.lock().await;
        st.size = size;
        if let Some(id) = st.active.clone() {
            if let Some(view) = st.views.get_mut(&id) {
                view.resize(size);
            }
        }
    }

    /// Lines produced by the active view at the last known size.
    pub async fn render_active(&self) -> Option<Vec<String>> {
        let st = self.state.lock().await;
        let id = st.active.as_ref()?;
        st.views.get(id).map(|v| v.render(st.size))
    }

    pub async fn active_key_bindings(&self) -> Vec<KeyBinding> {
        let st = self.state.lock().await;
        st.active
            .as_ref()
            .and_then(|id| st.views.get(id))
            .map(|v| v.key_bindings())
            .unwrap_or_default()
    }

    pub async fn active_view(&self) -> Option<String> {
        self.state.lock().await.active.clone()
    }

    // === Raw stack access (no hooks) ===

    pub async fn push(&self, view_id: &str, params: Option<Value>, state: Option<ViewState>) -> usize {
        self.state.lock().await.stack.push(view_id, params, state)
    }

    pub async fn pop(&self) -> Option<NavigationEntry> {
        self.state.lock().await.stack.pop()
    }

    pub async fn peek(&self) -> Option<NavigationEntry> {
        self.state.lock().await.stack.peek().cloned()
    }

    pub async fn replace(
        &self,
        view_id: &str,
        params: Option<Value>,
        state: Option<ViewState>,
    ) -> Option<NavigationEntry> {
        self.state.lock().await.stack.replace(view_id, params, state)
    }

    pub async fn find_entry(&self, view_id: &str) -> Option<NavigationEntry> {
        self.state.lock().await.stack.find_entry(view_id).cloned()
    }

    pub async fn remove_view(&self, view_id: &str) -> usize {
        self.state.lock().await.stack.remove_view(view_id)
    }

    pub async fn clear_history(&self) {
        self.state.lock().await.stack.clear();
    }

    pub async fn history(&self) -> Vec<NavigationEntry> {
        self.state.lock().await.stack.history()
    }

    pub async fn can_go_back(&self) -> bool {
        self.state.lock().await.stack.can_go_back()
    }

    fn announce(&self, from: Option<&str>, to: Option<&str>, action: &str) {
        if let Some(bus) = &self.bus {
            bus.publish(
                NAVIGATION_CHANGED,
                json!({ "from": from, "to": to, "action": action }),
                "navigation",
                PublishOptions::default(),
            );
        }
    }
}

fn not_registered(view_id: &str) -> NavigationError {
    NavigationError::ViewNotRegistered {
        view: view_id.to_string(),
    }
}

fn ensure_registered(st: &NavState, view_id: &str) -> Result<(), NavigationError> {
    if st.views.contains_key(view_id) {
        Ok(())
    } else {
        Err(not_registered(view_id))
    }
}

fn store_snapshot(st: &mut NavState, view_id: &str, state: ViewState) {
    if st.stack.peek().is_some_and(|top| top.view_id == view_id) {
        st.stack.set_top_state(Some(state.clone()));
    }
    st.saved.insert(view_id.to_string(), state);
}

/// Saves and unmounts the active view. Returns its id, if one was active.
///
/// On hook failure the view stays active and nothing is stored.
async fn deactivate(st: &mut NavState) -> Result<Option<String>, NavigationError> {
    let Some(id) = st.active.clone() else {
        return Ok(None);
    };
    let Some(view) = st.views.get_mut(&id) else {
        st.active = None;
        st.tabs.clear_active();
        return Ok(Some(id));
    };

    let snapshot = match view.save_state().await {
        Ok(s) => s,
        Err(e) => {
            warn!(view = %id, err = %e, "save_state failed");
            return Err(NavigationError::hook(&id, Hook::SaveState, e));
        }
    };
    if let Err(e) = view.unmount().await {
        warn!(view = %id, err = %e, "unmount failed");
        return Err(NavigationError::hook(&id, Hook::Unmount, e));
    }

    if let Some(state) = snapshot {
        store_snapshot(st, &id, state);
    }
    // The tab, if any, no longer owns the screen.
    st.active = None;
    st.tabs.clear_active();
    Ok(Some(id))
}

/// Mounts `view_id`, applies the size and restores any saved snapshot.
async fn activate(
    st: &mut NavState,
    view_id: &str,
    params: &Value,
    entry_state: Option<ViewState>,
) -> Result<(), NavigationError> {
    let saved = st.saved.get(view_id).cloned().or(entry_state);
    let size = st.size;
    let view = st
        .views
        .get_mut(view_id)
        .ok_or_else(|| not_registered(view_id))?;

    if let Err(e) = view.mount(params).await {
        warn!(view = view_id, err = %e, "mount failed");
        return Err(NavigationError::hook(view_id, Hook::Mount, e));
    }
    view.resize(size);

    if let Some(state) = saved {
        if let Err(e) = view.restore_state(state).await {
            warn!(view = view_id, err = %e, "restore_state failed");
            if let Err(unmount_err) = view.unmount().await {
                warn!(view = view_id, err = %unmount_err, "unmount after failed restore failed");
            }
            return Err(NavigationError::hook(view_id, Hook::RestoreState, e));
        }
    }

    st.active = Some(view_id.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex as SyncMutex;

    use super::*;
    use crate::bus::{Message, MessageFilter};
    use crate::error::{HandlerError, ViewError};
    use crate::events::Notifier;
    use crate::subscribers::HandlerFn;
    use crate::config::BusConfig;

    type CallLog = Arc<SyncMutex<Vec<String>>>;

    #[derive(Default, Clone)]
    struct Faults {
        mount: bool,
        unmount: bool,
        save: bool,
        restore: bool,
    }

    /// View recording every hook call as `"<id>:<hook>"`.
    struct TestView {
        id: String,
        log: CallLog,
        faults: Arc<SyncMutex<Faults>>,
        counter: i64,
        mount_delay: Option<Duration>,
    }

    impl TestView {
        fn new(id: &str, log: &CallLog) -> Self {
            Self {
                id: id.to_string(),
                log: Arc::clone(log),
                faults: Arc::default(),
                counter: 0,
                mount_delay: None,
            }
        }

        fn faults(&self) -> Arc<SyncMutex<Faults>> {
            Arc::clone(&self.faults)
        }

        fn boxed(self) -> Box<dyn View> {
            Box::new(self)
        }

        fn record(&self, hook: &str) {
            self.log.lock().push(format!("{}:{hook}", self.id));
        }
    }

    #[async_trait]
    impl View for TestView {
        fn id(&self) -> &str {
            &self.id
        }

        async fn mount(&mut self, params: &Value) -> Result<(), ViewError> {
            if let Some(d) = self.mount_delay {
                tokio::time::sleep(d).await;
            }
            self.record("mount");
            if self.faults.lock().mount {
                return Err(ViewError::from("mount refused"));
            }
            if let Some(n) = params.get("counter").and_then(Value::as_i64) {
                self.counter = n;
            }
            Ok(())
        }

        async fn unmount(&mut self) -> Result<(), ViewError> {
            self.record("unmount");
            if self.faults.lock().unmount {
                return Err(ViewError::from("unmount refused"));
            }
            Ok(())
        }

        async fn save_state(&mut self) -> Result<Option<ViewState>, ViewError> {
            self.record("save");
            if self.faults.lock().save {
                return Err(ViewError::from("save refused"));
            }
            Ok(Some(json!({ "counter": self.counter })))
        }

        async fn restore_state(&mut self, state: ViewState) -> Result<(), ViewError> {
            self.record("restore");
            if self.faults.lock().restore {
                return Err(ViewError::from("restore refused"));
            }
            self.counter = state["counter"].as_i64().unwrap_or_default();
            Ok(())
        }

        fn render(&self, size: ViewSize) -> Vec<String> {
            vec![format!("{} {}x{} #{}", self.id, size.width, size.height, self.counter)]
        }

        fn key_bindings(&self) -> Vec<KeyBinding> {
            vec![KeyBinding::new("q", "quit", format!("{}.quit", self.id))]
        }
    }

    async fn manager_with(ids: &[&str]) -> (NavigationManager, CallLog) {
        let log: CallLog = Arc::default();
        let nav = NavigationManager::new(NavigationConfig::default());
        for id in ids {
            nav.register_view(TestView::new(id, &log).boxed())
                .await
                .expect("register");
        }
        (nav, log)
    }

    fn calls(log: &CallLog) -> Vec<String> {
        std::mem::take(&mut *log.lock())
    }

    #[tokio::test]
    async fn navigate_runs_hooks_in_order() {
        let (nav, log) = manager_with(&["home", "settings"]).await;

        nav.navigate_to("home", None).await.expect("home");
        nav.navigate_to("settings", None).await.expect("settings");

        assert_eq!(
            calls(&log),
            vec!["home:mount", "home:save", "home:unmount", "settings:mount"]
        );
        assert_eq!(nav.active_view().await.as_deref(), Some("settings"));
        assert!(nav.can_go_back().await);
        assert_eq!(
            nav.history().await[0].state,
            Some(json!({ "counter": 0 }))
        );
    }

    #[tokio::test]
    async fn unknown_view_is_rejected_without_hooks() {
        let (nav, log) = manager_with(&["home"]).await;
        nav.navigate_to("home", None).await.expect("home");
        calls(&log);

        let err = nav.navigate_to("nowhere", None).await.unwrap_err();
        assert_eq!(err.as_label(), "nav_view_not_registered");
        assert!(calls(&log).is_empty());
        assert_eq!(nav.active_view().await.as_deref(), Some("home"));
    }

    #[tokio::test]
    async fn go_back_restores_saved_state() {
        let (nav, log) = manager_with(&["list", "detail"]).await;

        nav.navigate_to("list", Some(json!({ "counter": 7 })))
            .await
            .expect("list");
        nav.navigate_to("detail", None).await.expect("detail");
        calls(&log);

        assert!(nav.go_back().await.expect("back"));
        assert_eq!(
            calls(&log),
            vec!["detail:save", "detail:unmount", "list:mount", "list:restore"]
        );
        assert_eq!(nav.render_active().await, Some(vec!["list 0x0 #7".to_string()]));
        assert_eq!(nav.history().await.len(), 1);

        assert!(!nav.go_back().await.expect("no more history"));
    }

    #[tokio::test]
    async fn unmount_failure_leaves_stack_and_active_view() {
        let log: CallLog = Arc::default();
        let home = TestView::new("home", &log);
        let faults = home.faults();
        let nav = NavigationManager::with_views(
            NavigationConfig::default(),
            None,
            vec![home.boxed(), TestView::new("next", &log).boxed()],
        )
        .expect("views");

        nav.navigate_to("home", None).await.expect("home");
        faults.lock().unmount = true;

        let err = nav.navigate_to("next", None).await.unwrap_err();
        assert!(matches!(err, NavigationError::Hook { hook: Hook::Unmount, .. }));
        assert_eq!(nav.history().await.len(), 1);
        assert_eq!(nav.active_view().await.as_deref(), Some("home"));
        assert!(nav.saved_state("home").await.is_none());
    }

    #[tokio::test]
    async fn mount_failure_keeps_entry_without_active_view() {
        let log: CallLog = Arc::default();
        let broken = TestView::new("broken", &log);
        broken.faults().lock().mount = true;
        let nav = NavigationManager::new(NavigationConfig::default());
        nav.register_view(TestView::new("home", &log).boxed())
            .await
            .expect("home");
        nav.register_view(broken.boxed()).await.expect("broken");

        nav.navigate_to("home", None).await.expect("home");
        let err = nav.navigate_to("broken", None).await.unwrap_err();

        assert!(matches!(err, NavigationError::Hook { hook: Hook::Mount, .. }));
        assert_eq!(nav.peek().await.map(|e| e.view_id), Some("broken".to_string()));
        assert!(nav.active_view().await.is_none());
    }

    #[tokio::test]
    async fn restore_failure_unmounts_target() {
        let (nav, log) = manager_with(&["a", "b"]).await;
        let picky = TestView::new("picky", &log);
        let faults = picky.faults();
        nav.register_view(picky.boxed()).await.expect("picky");

        nav.navigate_to("picky", None).await.expect("picky");
        nav.navigate_to("a", None).await.expect("a");
        faults.lock().restore = true;
        calls(&log);

        let err = nav.navigate_to("picky", None).await.unwrap_err();
        assert!(matches!(err, NavigationError::Hook { hook: Hook::RestoreState, .. }));
        assert_eq!(
            calls(&log),
            vec!["a:save", "a:unmount", "picky:mount", "picky:restore", "picky:unmount"]
        );
        assert!(nav.active_view().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_navigations_are_serialized() {
        let log: CallLog = Arc::default();
        let mut slow_a = TestView::new("a", &log);
        slow_a.mount_delay = Some(Duration::from_millis(30));
        let mut slow_b = TestView::new("b", &log);
        slow_b.mount_delay = Some(Duration::from_millis(10));
        let nav = NavigationManager::with_views(
            NavigationConfig::default(),
            None,
            vec![slow_a.boxed(), slow_b.boxed()],
        )
        .expect("views");

        let (ra, rb) = tokio::join!(nav.navigate_to("a", None), nav.navigate_to("b", None));
        ra.expect("a");
        rb.expect("b");

        let mut mounted = 0i32;
        for call in calls(&log) {
            if call.ends_with(":mount") {
                mounted += 1;
            } else if call.ends_with(":unmount") {
                mounted -= 1;
            }
            assert!(mounted <= 1, "two views mounted at once");
        }
        assert_eq!(nav.active_view().await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn explicit_checkpoints() {
        let (nav, log) = manager_with(&["editor"]).await;
        nav.navigate_to("editor", Some(json!({ "counter": 3 })))
            .await
            .expect("editor");

        assert!(!nav.restore_view_state("editor").await.expect("nothing saved"));
        assert!(nav.save_view_state("editor").await.expect("save"));
        assert_eq!(nav.saved_state("editor").await, Some(json!({ "counter": 3 })));
        assert!(nav.restore_view_state("editor").await.expect("restore"));
        assert_eq!(
            calls(&log),
            vec!["editor:mount", "editor:save", "editor:restore"]
        );

        let err = nav.save_view_state("ghost").await.unwrap_err();
        assert_eq!(err.as_label(), "nav_view_not_registered");
    }

    #[tokio::test]
    async fn unregister_skips_hooks_and_drops_state() {
        let (nav, log) = manager_with(&["a", "b"]).await;
        nav.navigate_to("a", None).await.expect("a");
        nav.navigate_to("b", None).await.expect("b");
        assert!(nav.saved_state("a").await.is_some());
        calls(&log);

        assert!(nav.unregister_view("b").await);
        assert!(nav.unregister_view("a").await);
        assert!(!nav.unregister_view("a").await);
        assert!(calls(&log).is_empty());
        assert!(nav.active_view().await.is_none());
        assert!(nav.saved_state("a").await.is_none());
    }

    #[tokio::test]
    async fn tabs_switch_without_touching_stack() {
        let (nav, log) = manager_with(&["inbox", "outbox"]).await;

        assert!(nav.add_tab("t1", "inbox", "Inbox").await.expect("t1"));
        assert!(nav.add_tab("t2", "outbox", "Outbox").await.expect("t2"));
        assert!(!nav.add_tab("t1", "outbox", "Dup").await.expect("dup"));
        assert_eq!(nav.active_tab().await.map(|t| t.id), Some("t1".to_string()));
        assert_eq!(nav.active_view().await.as_deref(), Some("inbox"));

        nav.switch_to_tab("t2").await.expect("switch");
        assert_eq!(nav.active_view().await.as_deref(), Some("outbox"));
        assert!(nav.history().await.is_empty());

        let err = nav.switch_to_tab("t9").await.unwrap_err();
        assert_eq!(err, NavigationError::TabNotFound { tab: "t9".into() });

        calls(&log);
        assert!(nav.close_tab("t2").await.expect("close"));
        assert_eq!(calls(&log), vec!["outbox:save", "outbox:unmount"]);
        assert!(nav.active_view().await.is_none());
        assert_eq!(nav.tabs().await.len(), 1);
        assert!(!nav.close_tab("t2").await.expect("gone"));
    }

    #[tokio::test]
    async fn stack_navigation_leaves_the_active_tab() {
        let (nav, log) = manager_with(&["inbox", "detail"]).await;
        assert!(nav.add_tab("t1", "inbox", "Inbox").await.expect("t1"));
        assert_eq!(nav.active_tab().await.map(|t| t.id), Some("t1".to_string()));

        nav.navigate_to("detail", None).await.expect("detail");
        assert!(nav.active_tab().await.is_none());
        assert_eq!(nav.active_view().await.as_deref(), Some("detail"));

        calls(&log);
        assert!(nav.close_tab("t1").await.expect("close"));
        assert!(calls(&log).is_empty());
        assert_eq!(nav.active_view().await.as_deref(), Some("detail"));

        assert!(nav.add_tab("t2", "inbox", "Inbox").await.expect("t2"));
        nav.switch_to_tab("t2").await.expect("switch");
        nav.navigate_to("detail", None).await.expect("detail again");
        assert!(nav.go_back().await.expect("back"));
        assert!(nav.active_tab().await.is_none());
    }

    #[tokio::test]
    async fn unmount_active_and_pass_throughs() {
        let (nav, log) = manager_with(&["main"]).await;
        assert!(!nav.unmount_active().await.expect("nothing active"));

        nav.navigate_to("main", None).await.expect("main");
        nav.resize(ViewSize::new(80, 24)).await;
        assert_eq!(nav.render_active().await, Some(vec!["main 80x24 #0".to_string()]));
        assert_eq!(nav.active_key_bindings().await[0].action, "main.quit");

        calls(&log);
        assert!(nav.unmount_active().await.expect("unmount"));
        assert_eq!(calls(&log), vec!["main:save", "main:unmount"]);
        assert!(nav.render_active().await.is_none());
        assert_eq!(nav.history().await.len(), 1);
    }

    #[tokio::test]
    async fn transitions_are_announced_on_the_bus() {
        let bus = EventBus::new(BusConfig::default(), Notifier::new(16));
        let seen = Arc::new(SyncMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(
            "nav-watch",
            HandlerFn::arc(move |msg: Arc<Message>| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().push(msg.data.clone());
                    Ok::<_, HandlerError>(())
                }
            }),
            Some(MessageFilter::new().kind(NAVIGATION_CHANGED)),
        );

        let log: CallLog = Arc::default();
        let nav = NavigationManager::with_bus(NavigationConfig::default(), Arc::clone(&bus));
        nav.register_view(TestView::new("a", &log).boxed()).await.expect("a");
        nav.register_view(TestView::new("b", &log).boxed()).await.expect("b");

        nav.navigate_to("a", None).await.expect("a");
        nav.navigate_to("b", None).await.expect("b");
        nav.go_back().await.expect("back");
        bus.flush().await;

        assert_eq!(
            *seen.lock(),
            vec![
                json!({ "from": null, "to": "a", "action": "navigate" }),
                json!({ "from": "a", "to": "b", "action": "navigate" }),
                json!({ "from": "b", "to": "a", "action": "back" }),
            ]
        );
    }
}
