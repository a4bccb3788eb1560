//! Tab selection state.
//!
//! The controller keeps the ordered tab list and the current index. It knows
//! each tab's page root and, when a navigation bar exists, the tile that
//! represents the tab in it.

use crate::dom::NodeId;

use super::NavigationError;

/// One entry of the tab list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// Display name, also used for selection by name.
    pub name: String,
    /// Root element of the tab's page.
    pub page: NodeId,
    /// Navigation tile, if the bar is shown.
    pub tile: Option<NodeId>,
}

/// A selection that changed the current tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabChange {
    pub previous: usize,
    pub current: usize,
}

/// Maintains the ordered tab list and the current tab.
#[derive(Debug, Clone)]
pub struct TabController {
    tabs: Vec<Tab>,
    current: usize,
}

impl TabController {
    /// Create a controller with the first tab current.
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self { tabs, current: 0 }
    }

    /// Make tab `index` current.
    ///
    /// Returns `Ok(None)` when it already is.
    pub fn select(&mut self, index: usize) -> Result<Option<TabChange>, NavigationError> {
        if index >= self.tabs.len() {
            return Err(NavigationError::InvalidTabIndex {
                index,
                count: self.tabs.len(),
            });
        }
        if index == self.current {
            return Ok(None);
        }
        let previous = std::mem::replace(&mut self.current, index);
        Ok(Some(TabChange {
            previous,
            current: index,
        }))
    }

    /// Make the tab called `name` current.
    pub fn select_by_name(&mut self, name: &str) -> Result<Option<TabChange>, NavigationError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| NavigationError::UnknownTab { name: name.to_string() })?;
        self.select(index)
    }

    /// Index of the tab after the current one. Wraps around.
    pub fn next_index(&self) -> usize {
        if self.tabs.is_empty() {
            return 0;
        }
        (self.current + 1) % self.tabs.len()
    }

    /// Index of the tab before the current one. Wraps around.
    pub fn previous_index(&self) -> usize {
        match self.current {
            0 => self.tabs.len().saturating_sub(1),
            index => index - 1,
        }
    }

    /// Index of the tab called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.name == name)
    }

    /// Current tab index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Current tab.
    pub fn current_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.current)
    }

    /// Tab at `index`.
    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    /// All tabs in order.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Number of tabs.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
