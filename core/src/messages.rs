use tracing::debug;

use crate::conversations::matches_query;
use crate::error::CoreError;
use crate::models::{DeliveryStatus, Message, MessageBody, Sender};

/// Ordered message list for one conversation plus its composer state.
#[derive(Debug, Clone)]
pub struct MessageThread {
    conversation_id: String,
    messages: Vec<Message>,
    reply_to: Option<String>,
    typing: bool,
    next_seq: u64,
}

impl MessageThread {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self::with_messages(conversation_id, Vec::new())
    }

    pub fn with_messages(conversation_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            messages,
            reply_to: None,
            typing: false,
            next_seq: 0,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Messages in chronological (insertion) order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn append(&mut self, message: Message) -> Result<(), CoreError> {
        if self.get(&message.id).is_some() {
            return Err(CoreError::InvalidArgument(format!("duplicate message id {}", message.id)));
        }
        self.messages.push(message);
        Ok(())
    }

    fn next_id(&mut self, now: i64) -> String {
        loop {
            self.next_seq += 1;
            let id = format!("msg:{}:{}", now, self.next_seq);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn push_new(&mut self, body: MessageBody, sender: Sender, reply_to_body: Option<String>, now: i64) -> Message {
        let message = Message {
            id: self.next_id(now),
            body,
            sent_at: now,
            sender,
            status: (sender == Sender::SelfUser).then_some(DeliveryStatus::Sent),
            pinned: false,
            reply_to_body,
        };
        self.messages.push(message.clone());
        message
    }

    /// Sends a text message. Blank text is ignored.
    ///
    /// An active reply preview is snapshotted into the new message and cleared.
    pub fn send(&mut self, text: &str, now: i64) -> Option<Message> {
        if text.trim().is_empty() {
            return None;
        }
        let reply_to_body = self.take_reply_snapshot();
        let message = self.push_new(MessageBody::text(text), Sender::SelfUser, reply_to_body, now);
        debug!(conversation_id = %self.conversation_id, message_id = %message.id, "message sent");
        Some(message)
    }

    pub fn send_attachment(&mut self, body: MessageBody, now: i64) -> Message {
        let reply_to_body = self.take_reply_snapshot();
        self.push_new(body, Sender::SelfUser, reply_to_body, now)
    }

    pub fn receive(&mut self, body: MessageBody, now: i64) -> Message {
        self.push_new(body, Sender::Other, None, now)
    }

    pub fn begin_reply(&mut self, message_id: &str) -> Result<(), CoreError> {
        if self.get(message_id).is_none() {
            return Err(CoreError::NotFound(format!("message {}", message_id)));
        }
        self.reply_to = Some(message_id.to_string());
        Ok(())
    }

    pub fn cancel_reply(&mut self) {
        self.reply_to = None;
    }

    pub fn reply_preview(&self) -> Option<&Message> {
        self.reply_to.as_deref().and_then(|id| self.get(id))
    }

    fn take_reply_snapshot(&mut self) -> Option<String> {
        let snapshot = self.reply_preview().map(|m| m.body.preview());
        self.reply_to = None;
        snapshot
    }

    pub fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn toggle_pin<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let mut changed = 0;
        for message in self.messages.iter_mut() {
            if ids.iter().any(|id| id.as_ref() == message.id) {
                message.pinned = !message.pinned;
                changed += 1;
            }
        }
        changed
    }

    pub fn delete<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let before = self.messages.len();
        self.messages.retain(|m| !ids.iter().any(|id| id.as_ref() == m.id));
        if self
            .reply_to
            .as_deref()
            .is_some_and(|id| ids.iter().any(|d| d.as_ref() == id))
        {
            self.reply_to = None;
        }
        before - self.messages.len()
    }

    pub fn filter_by_search(&self, query: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| matches_query(m.body.search_text(), query))
            .collect()
    }

    /// Render order: pinned first, chronological otherwise. `search` narrows by body.
    pub fn visible(&self, search: Option<&str>) -> Vec<&Message> {
        let mut visible = match search {
            Some(query) => self.filter_by_search(query),
            None => self.messages.iter().collect(),
        };
        visible.sort_by_key(|m| !m.pinned);
        visible
    }

    /// Latest pinned message, shown in the banner above the thread.
    pub fn pinned_banner(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.pinned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_ignored() {
        let mut thread = MessageThread::new("c1");
        assert!(thread.send("   \n", 1).is_none());
        assert!(thread.is_empty());
    }

    #[test]
    fn sent_messages_carry_status_and_unique_ids() {
        let mut thread = MessageThread::new("c1");
        let a = thread.send("hi", 5).expect("a");
        let b = thread.send("again", 5).expect("b");
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, Some(DeliveryStatus::Sent));
        let reply = thread.receive(MessageBody::text("Okay great!"), 6);
        assert_eq!(reply.status, None);
        assert_eq!(reply.sender, Sender::Other);
    }

    #[test]
    fn reply_preview_is_snapshotted_then_cleared() {
        let mut thread = MessageThread::new("c1");
        let original = thread.receive(MessageBody::text("Sab theek?"), 1);
        thread.begin_reply(&original.id).expect("reply");
        let sent = thread.send("Haan", 2).expect("sent");
        assert_eq!(sent.reply_to_body.as_deref(), Some("Sab theek?"));
        assert!(thread.reply_preview().is_none());
    }

    #[test]
    fn pinned_messages_render_first() {
        let mut thread = MessageThread::new("c1");
        let a = thread.send("one", 1).expect("a");
        let b = thread.send("two", 2).expect("b");
        let c = thread.send("three", 3).expect("c");
        thread.toggle_pin(&[&c.id]);
        let order: Vec<&str> = thread.visible(None).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(order, vec![c.id.as_str(), a.id.as_str(), b.id.as_str()]);
        assert_eq!(thread.pinned_banner().map(|m| m.id.clone()), Some(c.id.clone()));
        thread.toggle_pin(&[&c.id]);
        assert!(thread.pinned_banner().is_none());
    }

    #[test]
    fn search_covers_document_names() {
        let mut thread = MessageThread::new("c1");
        thread.send("see attached", 1);
        thread.send_attachment(
            MessageBody::Document {
                name: "Invoice.PDF".to_string(),
                uri: "file:///x/invoice.pdf".to_string(),
                size: 10,
            },
            2,
        );
        assert_eq!(thread.filter_by_search("invoice").len(), 1);
        assert_eq!(thread.visible(Some("SEE")).len(), 1);
    }
}
