//! Tab bookkeeping for the navigation manager.

/// A named shortcut to a registered view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    pub id: String,
    pub view_id: String,
    pub title: String,
}

/// Ordered tab list with an optional active index.
#[derive(Clone, Debug, Default)]
pub(crate) struct TabSet {
    tabs: Vec<Tab>,
    active: Option<usize>,
}

impl TabSet {
    /// Adds a tab; returns `false` if the id is taken.
    pub(crate) fn add(&mut self, tab: Tab) -> bool {
        if self.get(&tab.id).is_some() {
            return false;
        }
        self.tabs.push(tab);
        true
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub(crate) fn activate(&mut self, id: &str) -> Option<&Tab> {
        let idx = self.tabs.iter().position(|t| t.id == id)?;
        self.active = Some(idx);
        self.tabs.get(idx)
    }

    /// Removes a tab, keeping the active index pointing at the same tab when possible.
    pub(crate) fn remove(&mut self, id: &str) -> Option<Tab> {
        let idx = self.tabs.iter().position(|t| t.id == id)?;
        let tab = self.tabs.remove(idx);
        self.active = match self.active {
            Some(a) if a == idx => None,
            Some(a) if a > idx => Some(a - 1),
            other => other,
        };
        Some(tab)
    }

    /// Drops every tab pointing at `view_id`.
    pub(crate) fn remove_view(&mut self, view_id: &str) {
        let ids: Vec<String> = self
            .tabs
            .iter()
            .filter(|t| t.view_id == view_id)
            .map(|t| t.id.clone())
            .collect();
        for id in ids {
            self.remove(&id);
        }
    }

    /// Leaves every tab in place with none active.
    pub(crate) fn clear_active(&mut self) {
        self.active = None;
    }

    pub(crate) fn active(&self) -> Option<&Tab> {
        self.active.and_then(|i| self.tabs.get(i))
    }

    pub(crate) fn list(&self) -> Vec<Tab> {
        self.tabs.clone()
    }
}
