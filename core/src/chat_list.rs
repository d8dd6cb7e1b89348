use tracing::{info, warn};

use crate::error::CoreError;
use crate::filters::{is_reserved_tab_name, visible_set, Filter, PendingTabDeletion, TabSelection};
use crate::format::now_millis;
use crate::models::{Contact, Conversation, FilterTab};
use crate::repository::{ChatRepository, RepositoryEvent};
use crate::selection::{Selection, TapOutcome};

/// State behind the chat-list screen: search box, tab bar and multi-select,
/// over the shared repository.
pub struct ChatList {
    repo: ChatRepository,
    search: String,
    selection: Selection,
}

impl ChatList {
    pub fn new(repo: ChatRepository) -> Self {
        Self {
            repo,
            search: String::new(),
            selection: Selection::new(),
        }
    }

    pub fn repository(&self) -> &ChatRepository {
        &self.repo
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn visible(&self) -> Result<Vec<Conversation>, CoreError> {
        self.repo.read(|state| {
            visible_set(state.tabs.active(), &self.search, state.conversations.list())
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn tabs(&self) -> Result<Vec<FilterTab>, CoreError> {
        self.repo.read(|state| state.tabs.tabs())
    }

    pub fn active_filter(&self) -> Result<Filter, CoreError> {
        self.repo.read(|state| state.tabs.active().clone())
    }

    pub fn select_tab(&mut self, name: &str) -> Result<TabSelection, CoreError> {
        self.repo.update(|state, events| {
            let selection = state.tabs.select(name)?;
            if matches!(selection, TabSelection::Activated(_)) {
                events.push(RepositoryEvent::TabsChanged);
            }
            Ok(selection)
        })
    }

    /// Registers a custom tab, tags the chosen conversations with it and activates it.
    pub fn create_tab<S: AsRef<str>>(&mut self, name: &str, selected_ids: &[S]) -> Result<String, CoreError> {
        self.repo.update(|state, events| {
            let selected: Vec<&str> = selected_ids
                .iter()
                .map(|id| id.as_ref())
                .filter(|id| state.conversations.get(id).is_some())
                .collect();
            let name = state.tabs.validate_new_tab(name, selected.len())?;
            state.tabs.ensure_registered(&name);
            state.conversations.apply_tag_to_ids(&selected, &name);
            state.tabs.select(&name)?;
            events.push(RepositoryEvent::TabsChanged);
            events.push(RepositoryEvent::ConversationsChanged);
            info!(tab = %name, chats = selected.len(), "custom tab created");
            Ok(name)
        })
    }

    pub fn request_tab_deletion(&self, name: &str) -> Result<PendingTabDeletion, CoreError> {
        self.repo.read(|state| state.tabs.request_deletion(name))?
    }

    /// Removes a confirmed custom tab and every tag that refers to it.
    pub fn confirm_tab_deletion(&mut self, pending: PendingTabDeletion) -> Result<(), CoreError> {
        self.repo.update(|state, events| {
            state.tabs.confirm_deletion(&pending);
            state.conversations.remove_tag(pending.name());
            events.push(RepositoryEvent::TabsChanged);
            events.push(RepositoryEvent::ConversationsChanged);
            Ok(())
        })
    }

    /// Tags conversations named in a JSON array of strings, e.g. a navigation payload.
    ///
    /// Names with no conversation are ignored. A malformed payload, or a tab name
    /// taken by a built-in tab or "+", is logged and skipped, returning `Ok(false)`.
    pub fn apply_tag_selection(&mut self, tab_name: &str, selected_names: &str) -> Result<bool, CoreError> {
        let tab_name = tab_name.trim();
        if tab_name.is_empty() {
            warn!("tag selection without a tab name");
            return Ok(false);
        }
        if is_reserved_tab_name(tab_name) {
            warn!(tab = %tab_name, "tag selection names a reserved tab");
            return Ok(false);
        }
        let names: Vec<String> = match serde_json::from_str(selected_names) {
            Ok(names) => names,
            Err(err) => {
                warn!(error = %err, "failed to parse selected names");
                return Ok(false);
            }
        };
        self.repo.update(|state, events| {
            if state.tabs.ensure_registered(tab_name) {
                events.push(RepositoryEvent::TabsChanged);
            }
            state.conversations.apply_tag(&names, tab_name);
            events.push(RepositoryEvent::ConversationsChanged);
            Ok(true)
        })
    }

    /// Starts a chat with `contact`. A name already in the list is rejected.
    pub fn add_contact(&mut self, contact: &Contact) -> Result<Conversation, CoreError> {
        let config = self.repo.config().clone();
        self.repo.update(|state, events| {
            let conversation = state.conversations.create(contact, &config, now_millis())?;
            events.push(RepositoryEvent::ConversationsChanged);
            Ok(conversation)
        })
    }

    pub fn set_favorite(&mut self, id: &str, favorite: bool) -> Result<(), CoreError> {
        self.repo.update(|state, events| {
            state.conversations.set_favorite(id, favorite)?;
            events.push(RepositoryEvent::ConversationsChanged);
            Ok(())
        })
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), CoreError> {
        self.repo.update(|state, events| {
            state.conversations.rename(id, name)?;
            events.push(RepositoryEvent::ConversationsChanged);
            Ok(())
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn long_press(&mut self, id: &str) -> bool {
        self.selection.long_press(id)
    }

    pub fn tap(&mut self, id: &str) -> TapOutcome {
        self.selection.tap(id)
    }

    pub fn close_selection(&mut self) {
        self.selection.close();
    }

    /// Pins every selected conversation, or unpins them when all are pinned already.
    pub fn pin_selected(&mut self) -> Result<usize, CoreError> {
        let ids = self.selection.take();
        self.repo.update(|state, events| {
            let all_pinned = ids
                .iter()
                .all(|id| state.conversations.get(id).is_some_and(|c| c.is_pinned));
            let changed = state.conversations.bulk_set_pinned(&ids, !all_pinned);
            events.push(RepositoryEvent::ConversationsChanged);
            Ok(changed)
        })
    }

    pub fn delete_selected(&mut self) -> Result<usize, CoreError> {
        let ids = self.selection.take();
        self.repo.update(|state, events| {
            let removed = state.conversations.bulk_delete(&ids);
            state.drop_orphan_threads();
            events.push(RepositoryEvent::ConversationsChanged);
            Ok(removed)
        })
    }
}
