use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub name: String,
    pub contact_key: Option<String>,
    pub last_message_preview: String,
    pub last_activity_at: i64,
    pub unread_count: u32,
    pub is_favorite: bool,
    pub is_pinned: bool,
    pub is_group: bool,
    pub tags: BTreeSet<String>,
    pub avatar_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    SelfUser,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Text { text: String },
    Image { uri: String },
    Document { name: String, uri: String, size: u64 },
    VoiceNote { uri: String, duration_secs: u32 },
}

impl MessageBody {
    pub fn text(text: impl Into<String>) -> Self {
        MessageBody::Text { text: text.into() }
    }

    /// Single-line rendering used for list previews, reply snapshots and the pinned banner.
    pub fn preview(&self) -> String {
        match self {
            MessageBody::Text { text } => text.clone(),
            MessageBody::Image { .. } => "📷 Image".to_string(),
            MessageBody::Document { name, .. } => format!("📄 {}", name),
            MessageBody::VoiceNote { duration_secs, .. } => {
                format!("🎤 Voice message ({}s)", duration_secs)
            }
        }
    }

    pub fn search_text(&self) -> &str {
        match self {
            MessageBody::Text { text } => text,
            MessageBody::Image { uri } => uri,
            MessageBody::Document { name, .. } => name,
            MessageBody::VoiceNote { uri, .. } => uri,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub body: MessageBody,
    pub sent_at: i64,
    pub sender: Sender,
    pub status: Option<DeliveryStatus>,
    pub pinned: bool,
    pub reply_to_body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabKind {
    Builtin,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTab {
    pub name: String,
    pub kind: TabKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: Option<String>,
    pub phone_numbers: Vec<String>,
}

impl Contact {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Unnamed",
        }
    }

    pub fn primary_phone(&self) -> Option<&str> {
        self.phone_numbers.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub uri: String,
    pub name: Option<String>,
    pub size: Option<u64>,
    pub mime_type_hint: Option<String>,
}

impl FileDescriptor {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: None,
            size: None,
            mime_type_hint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    pub members: u32,
    pub recent: String,
    pub unread: u32,
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    Incoming,
    Outgoing,
    Missed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Voice,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLogEntry {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub direction: CallDirection,
    pub kind: CallKind,
    pub at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub media_uri: String,
    pub posted_at: i64,
    pub seen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub bio: String,
    pub photo_url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_body_serializes_as_tagged_union() {
        let body = MessageBody::Document {
            name: "report.pdf".to_string(),
            uri: "file:///tmp/report.pdf".to_string(),
            size: 2048,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["kind"], "document");
        assert_eq!(json["name"], "report.pdf");
    }

    #[test]
    fn contact_without_name_is_unnamed() {
        let contact = Contact {
            id: "c1".to_string(),
            name: Some("  ".to_string()),
            phone_numbers: vec![],
        };
        assert_eq!(contact.display_name(), "Unnamed");
    }
}
