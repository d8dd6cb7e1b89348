use std::collections::BTreeSet;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::contacts::contact_key;
use crate::error::CoreError;
use crate::models::{Contact, Conversation};

/// Case-insensitive substring match used by every list search box.
pub fn matches_query(haystack: &str, query: &str) -> bool {
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_conversations(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }

    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.conversations.iter().map(|c| c.name.as_str()).collect()
    }

    /// Creates a conversation for `contact` and prepends it to the list.
    pub fn create(&mut self, contact: &Contact, config: &ClientConfig, now: i64) -> Result<Conversation, CoreError> {
        let name = contact.display_name().to_string();
        let key = contact_key(contact);
        let duplicate = self.conversations.iter().any(|c| {
            c.name == name || (key.is_some() && c.contact_key.is_some() && c.contact_key == key)
        });
        if duplicate {
            return Err(CoreError::DuplicateConversation(name));
        }
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            name,
            contact_key: key,
            last_message_preview: config.new_chat_preview.clone(),
            last_activity_at: now,
            unread_count: 0,
            is_favorite: false,
            is_pinned: false,
            is_group: false,
            tags: BTreeSet::new(),
            avatar_ref: config.default_avatar.clone(),
        };
        info!(conversation_id = %conversation.id, "conversation created");
        self.conversations.insert(0, conversation.clone());
        Ok(conversation)
    }

    /// Adds `tag` to every conversation whose name is in `names`. Returns how many changed.
    pub fn apply_tag<S: AsRef<str>>(&mut self, names: &[S], tag: &str) -> usize {
        let mut changed = 0;
        for conversation in self.conversations.iter_mut() {
            if names.iter().any(|n| n.as_ref() == conversation.name) && conversation.tags.insert(tag.to_string()) {
                changed += 1;
            }
        }
        debug!(tag, changed, "tag applied");
        changed
    }

    pub fn apply_tag_to_ids<S: AsRef<str>>(&mut self, ids: &[S], tag: &str) -> usize {
        let mut changed = 0;
        for conversation in self.conversations.iter_mut() {
            if ids.iter().any(|id| id.as_ref() == conversation.id) && conversation.tags.insert(tag.to_string()) {
                changed += 1;
            }
        }
        changed
    }

    pub fn remove_tag(&mut self, tag: &str) -> usize {
        let mut changed = 0;
        for conversation in self.conversations.iter_mut() {
            if conversation.tags.remove(tag) {
                changed += 1;
            }
        }
        debug!(tag, changed, "tag removed");
        changed
    }

    pub fn bulk_set_pinned<S: AsRef<str>>(&mut self, ids: &[S], pinned: bool) -> usize {
        let mut changed = 0;
        for conversation in self.conversations.iter_mut() {
            if ids.iter().any(|id| id.as_ref() == conversation.id) {
                conversation.is_pinned = pinned;
                changed += 1;
            }
        }
        changed
    }

    pub fn bulk_delete<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let before = self.conversations.len();
        self.conversations
            .retain(|c| !ids.iter().any(|id| id.as_ref() == c.id));
        let removed = before - self.conversations.len();
        info!(removed, "conversations deleted");
        removed
    }

    pub fn search(&self, query: &str) -> Vec<&Conversation> {
        self.conversations
            .iter()
            .filter(|c| matches_query(&c.name, query))
            .collect()
    }

    pub fn set_favorite(&mut self, id: &str, favorite: bool) -> Result<(), CoreError> {
        let conversation = self.require_mut(id)?;
        conversation.is_favorite = favorite;
        Ok(())
    }

    /// Contact edit: rename a conversation, keeping names unique.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Name cannot be empty.".to_string()));
        }
        if self.conversations.iter().any(|c| c.id != id && c.name == name) {
            return Err(CoreError::DuplicateConversation(name.to_string()));
        }
        let conversation = self.require_mut(id)?;
        conversation.name = name.to_string();
        Ok(())
    }

    pub fn mark_read(&mut self, id: &str) -> Result<(), CoreError> {
        let conversation = self.require_mut(id)?;
        conversation.unread_count = 0;
        Ok(())
    }

    /// Mirrors the newest message of a thread into the list entry.
    pub fn record_activity(&mut self, id: &str, preview: String, at: i64) -> Result<(), CoreError> {
        let conversation = self.require_mut(id)?;
        conversation.last_message_preview = preview;
        conversation.last_activity_at = at;
        Ok(())
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Conversation, CoreError> {
        self.get_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("conversation {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, phone: &str) -> Contact {
        Contact {
            id: format!("c-{}", name),
            name: Some(name.to_string()),
            phone_numbers: vec![phone.to_string()],
        }
    }

    #[test]
    fn create_prepends_with_empty_state() {
        let config = ClientConfig::default();
        let mut store = ConversationStore::new();
        store.create(&contact("Ayesha", "+92 300 1111111"), &config, 1).expect("first");
        let zara = store.create(&contact("Zara", "+92 300 2222222"), &config, 2).expect("second");
        assert_eq!(store.list()[0].id, zara.id);
        assert_eq!(zara.unread_count, 0);
        assert!(zara.tags.is_empty());
        assert_eq!(zara.last_message_preview, "New contact added!");
    }

    #[test]
    fn create_rejects_same_phone_under_new_name() {
        let config = ClientConfig::default();
        let mut store = ConversationStore::new();
        store.create(&contact("Zara", "+92 300 2222222"), &config, 1).expect("first");
        let err = store
            .create(&contact("Zara K", "+923002222222"), &config, 2)
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateConversation(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn search_is_case_insensitive() {
        let config = ClientConfig::default();
        let mut store = ConversationStore::new();
        store.create(&contact("Ayesha", "1"), &config, 1).expect("a");
        store.create(&contact("Usman", "2"), &config, 1).expect("u");
        let hits = store.search("AYE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ayesha");
    }

    #[test]
    fn rename_keeps_names_unique() {
        let config = ClientConfig::default();
        let mut store = ConversationStore::new();
        let a = store.create(&contact("Ayesha", "1"), &config, 1).expect("a");
        store.create(&contact("Usman", "2"), &config, 1).expect("u");
        assert!(store.rename(&a.id, "Usman").is_err());
        store.rename(&a.id, " Ayesha B ").expect("rename");
        assert_eq!(store.get(&a.id).expect("a").name, "Ayesha B");
    }
}
