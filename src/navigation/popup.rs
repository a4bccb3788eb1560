//! Popup overlay state: at most one popup is active at a time.

use std::time::Duration;

use crate::dom::NodeId;

use super::NavigationError;

/// How a popup may be dismissed besides an explicit close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DismissPolicy {
    /// A tap outside the popup closes it.
    pub close_on_background: bool,
    /// The popup closes itself after this long.
    pub auto_close: Option<Duration>,
}

/// What asked the active popup to go away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    /// A tap landed outside the popup box.
    Background,
    /// The auto-close timer fired.
    Timeout,
    /// A close button or the application.
    Explicit,
}

#[derive(Debug, Clone)]
struct PopupEntry {
    id: String,
    node: NodeId,
    policy: DismissPolicy,
}

/// Tracks the registered popups and which one is active.
#[derive(Debug, Clone, Default)]
pub struct PopupManager {
    popups: Vec<PopupEntry>,
    /// Index into `popups` of the active popup.
    active: Option<usize>,
}

impl PopupManager {
    /// Create a manager with no popups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a popup root. Registering an id twice replaces the entry.
    pub fn register(&mut self, id: impl Into<String>, node: NodeId, policy: DismissPolicy) {
        let id = id.into();
        match self.popups.iter_mut().find(|p| p.id == id) {
            Some(entry) => {
                entry.node = node;
                entry.policy = policy;
            }
            None => self.popups.push(PopupEntry { id, node, policy }),
        }
    }

    /// Activate popup `id`.
    ///
    /// Returns `Ok(None)` if it is already active, `Ok(Some(node))` with the
    /// popup root when it was opened.
    pub fn open(&mut self, id: &str) -> Result<Option<NodeId>, NavigationError> {
        let index = self
            .popups
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| NavigationError::UnknownPopup { id: id.to_string() })?;
        match self.active {
            Some(current) if current == index => Ok(None),
            Some(current) => Err(NavigationError::PopupConflict {
                active: self.popups[current].id.clone(),
                requested: id.to_string(),
            }),
            None => {
                self.active = Some(index);
                Ok(Some(self.popups[index].node))
            }
        }
    }

    /// Deactivate the active popup, returning its root. No-op when none is
    /// active.
    pub fn close(&mut self) -> Option<NodeId> {
        self.active.take().map(|index| self.popups[index].node)
    }

    /// Close the active popup if its policy allows `trigger`.
    pub fn dismiss(&mut self, trigger: DismissTrigger) -> Option<NodeId> {
        let policy = self.active_policy()?;
        let allowed = match trigger {
            DismissTrigger::Background => policy.close_on_background,
            DismissTrigger::Timeout => policy.auto_close.is_some(),
            DismissTrigger::Explicit => true,
        };
        if allowed {
            self.close()
        } else {
            None
        }
    }

    /// Identifier of the active popup.
    pub fn active(&self) -> Option<&str> {
        self.active.map(|index| self.popups[index].id.as_str())
    }

    /// Root node of the active popup.
    pub fn active_node(&self) -> Option<NodeId> {
        self.active.map(|index| self.popups[index].node)
    }

    /// Dismiss policy of the active popup.
    pub fn active_policy(&self) -> Option<DismissPolicy> {
        self.active.map(|index| self.popups[index].policy)
    }

    /// Root node of popup `id`.
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.popups.iter().find(|p| p.id == id).map(|p| p.node)
    }

    /// Registered popup ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.popups.iter().map(|p| p.id.as_str())
    }

    /// Number of registered popups.
    pub fn len(&self) -> usize {
        self.popups.len()
    }

    /// Whether no popup is registered.
    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementData, ElementKind, ElementTree};

    fn manager() -> (PopupManager, NodeId, NodeId) {
        let mut tree = ElementTree::new();
        let a = tree.insert_root(ElementData::new(ElementKind::Button));
        let b = tree.insert_root(ElementData::new(ElementKind::Button));
        let mut popups = PopupManager::new();
        popups.register(
            "settings",
            a,
            DismissPolicy {
                close_on_background: true,
                auto_close: None,
            },
        );
        popups.register(
            "alert",
            b,
            DismissPolicy {
                close_on_background: false,
                auto_close: Some(Duration::from_secs(5)),
            },
        );
        (popups, a, b)
    }

    #[test]
    fn open_and_close() {
        let (mut popups, a, _) = manager();
        assert_eq!(popups.active(), None);
        assert_eq!(popups.open("settings"), Ok(Some(a)));
        assert_eq!(popups.active(), Some("settings"));
        assert_eq!(popups.active_node(), Some(a));
        assert_eq!(popups.close(), Some(a));
        assert_eq!(popups.active(), None);
    }

    #[test]
    fn reopening_active_popup_is_noop() {
        let (mut popups, ..) = manager();
        popups.open("settings").unwrap();
        assert_eq!(popups.open("settings"), Ok(None));
        assert_eq!(popups.active(), Some("settings"));
    }

    #[test]
    fn second_popup_conflicts() {
        let (mut popups, ..) = manager();
        popups.open("settings").unwrap();
        assert_eq!(
            popups.open("alert"),
            Err(NavigationError::PopupConflict {
                active: "settings".into(),
                requested: "alert".into(),
            })
        );
        assert_eq!(popups.active(), Some("settings"));
    }

    #[test]
    fn unknown_popup() {
        let (mut popups, ..) = manager();
        assert_eq!(
            popups.open("ghost"),
            Err(NavigationError::UnknownPopup { id: "ghost".into() })
        );
    }

    #[test]
    fn close_without_active_is_noop() {
        let (mut popups, ..) = manager();
        assert_eq!(popups.close(), None);
    }

    #[test]
    fn dismiss_respects_policy() {
        let (mut popups, a, b) = manager();
        popups.open("alert").unwrap();
        assert_eq!(popups.dismiss(DismissTrigger::Background), None);
        assert_eq!(popups.active(), Some("alert"));
        assert_eq!(popups.dismiss(DismissTrigger::Timeout), Some(b));

        popups.open("settings").unwrap();
        assert_eq!(popups.dismiss(DismissTrigger::Timeout), None);
        assert_eq!(popups.dismiss(DismissTrigger::Background), Some(a));
        assert_eq!(popups.dismiss(DismissTrigger::Explicit), None);
    }

    #[test]
    fn ids_in_registration_order() {
        let (popups, ..) = manager();
        assert_eq!(popups.ids().collect::<Vec<_>>(), vec!["settings", "alert"]);
        assert_eq!(popups.len(), 2);
    }
}
