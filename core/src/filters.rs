use tracing::{debug, info};

use crate::conversations::matches_query;
use crate::error::CoreError;
use crate::models::{Conversation, FilterTab, TabKind};

pub const BUILTIN_TABS: [&str; 4] = ["All", "Unread", "Groups", "Favorites"];
/// Tab-bar affordance that opens the tab-creation flow; never a filter.
pub const ADD_TAB: &str = "+";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Unread,
    Groups,
    Favorites,
    Custom(String),
}

impl Filter {
    pub fn from_name(name: &str) -> Filter {
        match name {
            "All" => Filter::All,
            "Unread" => Filter::Unread,
            "Groups" => Filter::Groups,
            "Favorites" => Filter::Favorites,
            other => Filter::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Filter::All => "All",
            Filter::Unread => "Unread",
            Filter::Groups => "Groups",
            Filter::Favorites => "Favorites",
            Filter::Custom(name) => name,
        }
    }

    pub fn matches(&self, conversation: &Conversation) -> bool {
        match self {
            Filter::All => true,
            Filter::Unread => conversation.unread_count > 0,
            Filter::Groups => conversation.is_group,
            Filter::Favorites => conversation.is_favorite,
            Filter::Custom(tag) => conversation.tags.contains(tag),
        }
    }
}

/// Conversations matching both `query` (by name) and `filter`, pinned first.
///
/// The sort is stable, so entries with equal pinned state keep their input order.
pub fn visible_set<'a>(filter: &Filter, query: &str, conversations: &'a [Conversation]) -> Vec<&'a Conversation> {
    let mut visible: Vec<&Conversation> = conversations
        .iter()
        .filter(|c| matches_query(&c.name, query) && filter.matches(c))
        .collect();
    visible.sort_by_key(|c| !c.is_pinned);
    visible
}

pub fn is_reserved_tab_name(name: &str) -> bool {
    name == ADD_TAB || BUILTIN_TABS.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabSelection {
    Activated(Filter),
    OpenTabCreation,
}

/// Proof that the user was asked to confirm deleting a custom tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTabDeletion {
    name: String,
}

impl PendingTabDeletion {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt(&self) -> String {
        format!("Do you want to delete \"{}\"?", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct TabRegistry {
    custom: Vec<String>,
    active: Filter,
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self {
            custom: Vec::new(),
            active: Filter::All,
        }
    }
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &Filter {
        &self.active
    }

    pub fn custom_tabs(&self) -> &[String] {
        &self.custom
    }

    pub fn contains(&self, name: &str) -> bool {
        is_reserved_tab_name(name) || self.custom.iter().any(|t| t == name)
    }

    /// Tabs in display order: built-ins, then custom tabs in creation order.
    pub fn tabs(&self) -> Vec<FilterTab> {
        BUILTIN_TABS
            .iter()
            .map(|name| FilterTab {
                name: name.to_string(),
                kind: TabKind::Builtin,
            })
            .chain(self.custom.iter().map(|name| FilterTab {
                name: name.clone(),
                kind: TabKind::Custom,
            }))
            .collect()
    }

    pub fn select(&mut self, name: &str) -> Result<TabSelection, CoreError> {
        if name == ADD_TAB {
            return Ok(TabSelection::OpenTabCreation);
        }
        if !self.contains(name) {
            return Err(CoreError::NotFound(format!("tab {}", name)));
        }
        self.active = Filter::from_name(name);
        debug!(tab = name, "filter activated");
        Ok(TabSelection::Activated(self.active.clone()))
    }

    /// Checks a new tab request in order: empty name, collision, empty selection.
    /// Returns the trimmed name.
    pub fn validate_new_tab(&self, raw_name: &str, selected: usize) -> Result<String, CoreError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(CoreError::EmptyTabName);
        }
        if self.contains(name) {
            return Err(CoreError::DuplicateTab(name.to_string()));
        }
        if selected == 0 {
            return Err(CoreError::NoChatsSelected);
        }
        Ok(name.to_string())
    }

    /// Registers `name` unless it already exists. Returns whether it was added.
    pub fn ensure_registered(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.custom.push(name.to_string());
        info!(tab = name, "custom tab registered");
        true
    }

    pub fn request_deletion(&self, name: &str) -> Result<PendingTabDeletion, CoreError> {
        if is_reserved_tab_name(name) {
            return Err(CoreError::Validation(format!("\"{}\" is a built-in tab.", name)));
        }
        if !self.custom.iter().any(|t| t == name) {
            return Err(CoreError::NotFound(format!("tab {}", name)));
        }
        Ok(PendingTabDeletion { name: name.to_string() })
    }

    /// Drops the tab; falls back to `All` when it was the active filter.
    pub fn confirm_deletion(&mut self, pending: &PendingTabDeletion) -> bool {
        let before = self.custom.len();
        self.custom.retain(|t| t != &pending.name);
        if self.active == Filter::Custom(pending.name.clone()) {
            self.active = Filter::All;
        }
        before != self.custom.len()
    }
}
