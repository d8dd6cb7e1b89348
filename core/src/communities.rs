use tracing::info;
use uuid::Uuid;

use crate::conversations::matches_query;
use crate::error::CoreError;
use crate::models::{Community, Message, MessageBody, Sender};

const WELCOME_PREVIEW: &str = "Welcome to the community!";

#[derive(Debug, Clone, Default)]
pub struct CommunityStore {
    communities: Vec<Community>,
}

impl CommunityStore {
    pub fn new(communities: Vec<Community>) -> Self {
        Self { communities }
    }

    pub fn list(&self) -> &[Community] {
        &self.communities
    }

    pub fn get(&self, id: &str) -> Option<&Community> {
        self.communities.iter().find(|c| c.id == id)
    }

    pub fn search(&self, query: &str) -> Vec<&Community> {
        self.communities
            .iter()
            .filter(|c| matches_query(&c.name, query))
            .collect()
    }

    /// Creates a community with its founder as the only member; newest first.
    pub fn create(&mut self, name: &str, avatar: Option<&str>) -> Result<Community, CoreError> {
        let name = name.trim();
        let avatar = avatar.map(str::trim).filter(|a| !a.is_empty());
        let Some(avatar) = avatar.filter(|_| !name.is_empty()) else {
            return Err(CoreError::Validation(
                "Please enter a community name and choose an image.".to_string(),
            ));
        };
        let community = Community {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            members: 1,
            recent: WELCOME_PREVIEW.to_string(),
            unread: 0,
            avatar: avatar.to_string(),
        };
        self.communities.insert(0, community.clone());
        info!(community_id = %community.id, "community created");
        Ok(community)
    }
}

/// Announcement-style chat where only admins may post.
#[derive(Debug, Clone)]
pub struct CommunityChat {
    community_id: String,
    is_admin: bool,
    posts: Vec<Message>,
}

impl CommunityChat {
    pub fn new(community_id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            community_id: community_id.into(),
            is_admin,
            posts: Vec::new(),
        }
    }

    pub fn community_id(&self) -> &str {
        &self.community_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn posts(&self) -> &[Message] {
        &self.posts
    }

    /// Empty posts are ignored (`Ok(None)`); non-admins are refused.
    pub fn post(&mut self, text: &str, now: i64) -> Result<Option<Message>, CoreError> {
        if !self.is_admin {
            return Err(CoreError::PermissionDenied("Only admins can send messages.".to_string()));
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        let message = Message {
            id: format!("post:{}:{}", now, self.posts.len() + 1),
            body: MessageBody::text(text),
            sent_at: now,
            sender: Sender::SelfUser,
            status: None,
            pinned: false,
            reply_to_body: None,
        };
        self.posts.push(message.clone());
        Ok(Some(message))
    }
}
