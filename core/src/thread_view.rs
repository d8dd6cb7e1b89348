//! State behind an open conversation screen.
//!
//! Every outgoing message schedules the canned reply on a [`TimerHandle`]
//! owned by the view. Closing or dropping the view cancels replies that have
//! not fired yet. The closed flag is flipped under the repository lock, so a
//! reply whose delay ran out during `close` either lands before it returns or
//! not at all.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::CoreError;
use crate::format::now_millis;
use crate::models::{Message, MessageBody};
use crate::repository::{ChatRepository, RepositoryEvent, WeakRepository};
use crate::selection::{Selection, TapOutcome};
use crate::timer::{schedule_once, TimerHandle};

pub struct ThreadView {
    repo: ChatRepository,
    conversation_id: String,
    search: Option<String>,
    selection: Selection,
    pending_replies: Vec<TimerHandle>,
    closed: Arc<AtomicBool>,
}

impl ThreadView {
    /// Opens the thread of an existing conversation and marks it read.
    pub fn open(repo: ChatRepository, conversation_id: &str) -> Result<Self, CoreError> {
        repo.update(|state, events| {
            state.conversations.mark_read(conversation_id)?;
            state.thread_mut(conversation_id)?;
            events.push(RepositoryEvent::ConversationsChanged);
            Ok(())
        })?;
        debug!(%conversation_id, "thread opened");
        Ok(Self {
            repo,
            conversation_id: conversation_id.to_string(),
            search: None,
            selection: Selection::new(),
            pending_replies: Vec::new(),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Messages in render order, narrowed by the active search.
    pub fn messages(&self) -> Result<Vec<Message>, CoreError> {
        self.repo.read(|state| {
            state
                .thread(&self.conversation_id)
                .map(|thread| thread.visible(self.search.as_deref()).into_iter().cloned().collect())
                .unwrap_or_default()
        })
    }

    pub fn set_search(&mut self, query: Option<String>) {
        self.search = query.filter(|q| !q.trim().is_empty());
    }

    pub fn is_typing(&self) -> Result<bool, CoreError> {
        self.read_thread(|thread| thread.is_typing())
    }

    pub fn pinned_banner(&self) -> Result<Option<Message>, CoreError> {
        self.read_thread(|thread| thread.pinned_banner().cloned())
    }

    pub fn reply_preview(&self) -> Result<Option<Message>, CoreError> {
        self.read_thread(|thread| thread.reply_preview().cloned())
    }

    pub fn begin_reply(&mut self, message_id: &str) -> Result<(), CoreError> {
        let id = self.conversation_id.clone();
        self.repo.update(|state, events| {
            state.thread_mut(&id)?.begin_reply(message_id)?;
            events.push(RepositoryEvent::ThreadChanged { conversation_id: id.clone() });
            Ok(())
        })
    }

    pub fn cancel_reply(&mut self) -> Result<(), CoreError> {
        let id = self.conversation_id.clone();
        self.repo.update(|state, events| {
            state.thread_mut(&id)?.cancel_reply();
            events.push(RepositoryEvent::ThreadChanged { conversation_id: id.clone() });
            Ok(())
        })
    }

    /// Sends `text` and schedules the simulated reply. Blank text returns `Ok(None)`.
    pub fn send_text(&mut self, text: &str) -> Result<Option<Message>, CoreError> {
        let id = self.conversation_id.clone();
        let sent = self.repo.update(|state, events| {
            let now = now_millis();
            let Some(message) = state.thread_mut(&id)?.send(text, now) else {
                return Ok(None);
            };
            state.conversations.record_activity(&id, message.body.preview(), now)?;
            push_sent_events(events, &id);
            Ok(Some(message))
        })?;
        if sent.is_some() {
            self.start_typing()?;
        }
        Ok(sent)
    }

    pub fn send_attachment(&mut self, body: MessageBody) -> Result<Message, CoreError> {
        let id = self.conversation_id.clone();
        let sent = self.repo.update(|state, events| {
            let now = now_millis();
            let message = state.thread_mut(&id)?.send_attachment(body, now);
            state.conversations.record_activity(&id, message.body.preview(), now)?;
            push_sent_events(events, &id);
            Ok(message)
        })?;
        self.start_typing()?;
        Ok(sent)
    }

    fn start_typing(&mut self) -> Result<(), CoreError> {
        let id = self.conversation_id.clone();
        self.repo.update(|state, events| {
            state.thread_mut(&id)?.set_typing(true);
            events.push(RepositoryEvent::TypingChanged {
                conversation_id: id.clone(),
                typing: true,
            });
            Ok(())
        })?;
        self.pending_replies.retain(|handle| !handle.is_finished());
        let weak = self.repo.downgrade();
        let reply_text = self.repo.config().reply_text.clone();
        let closed = Arc::clone(&self.closed);
        let handle = schedule_once(self.repo.config().reply_delay(), move || {
            deliver_reply(&weak, &id, reply_text, &closed);
        });
        self.pending_replies.push(handle);
        Ok(())
    }

    /// Number of simulated replies that have not fired yet.
    pub fn pending_replies(&self) -> usize {
        self.pending_replies.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn long_press(&mut self, message_id: &str) -> bool {
        self.selection.long_press(message_id)
    }

    pub fn tap(&mut self, message_id: &str) -> TapOutcome {
        self.selection.tap(message_id)
    }

    pub fn close_selection(&mut self) {
        self.selection.close();
    }

    /// Toggles the pinned flag of every selected message.
    pub fn pin_selected(&mut self) -> Result<usize, CoreError> {
        let ids = self.selection.take();
        let id = self.conversation_id.clone();
        self.repo.update(|state, events| {
            let changed = state.thread_mut(&id)?.toggle_pin(&ids);
            events.push(RepositoryEvent::ThreadChanged { conversation_id: id.clone() });
            Ok(changed)
        })
    }

    pub fn delete_selected(&mut self) -> Result<usize, CoreError> {
        let ids = self.selection.take();
        let id = self.conversation_id.clone();
        self.repo.update(|state, events| {
            let removed = state.thread_mut(&id)?.delete(&ids);
            events.push(RepositoryEvent::ThreadChanged { conversation_id: id.clone() });
            Ok(removed)
        })
    }

    /// Leaves the screen. Replies still waiting on their delay are cancelled.
    pub fn close(mut self) {
        self.cancel_pending();
    }

    fn cancel_pending(&mut self) {
        let cancelled = self.pending_replies.iter().filter(|h| !h.is_finished()).count();
        for handle in self.pending_replies.drain(..) {
            handle.cancel();
        }
        if cancelled > 0 {
            let id = self.conversation_id.clone();
            let closed = Arc::clone(&self.closed);
            let _ = self.repo.update(|state, events| {
                closed.store(true, Ordering::Release);
                if let Ok(thread) = state.thread_mut(&id) {
                    thread.set_typing(false);
                    events.push(RepositoryEvent::TypingChanged {
                        conversation_id: id.clone(),
                        typing: false,
                    });
                }
                Ok(())
            });
            debug!(conversation_id = %id, cancelled, "pending replies cancelled");
        }
    }

    fn read_thread<T: Default, F>(&self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&crate::messages::MessageThread) -> T,
    {
        self.repo
            .read(|state| state.thread(&self.conversation_id).map(f).unwrap_or_default())
    }
}

impl Drop for ThreadView {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn push_sent_events(events: &mut Vec<RepositoryEvent>, conversation_id: &str) {
    events.push(RepositoryEvent::ThreadChanged {
        conversation_id: conversation_id.to_string(),
    });
    events.push(RepositoryEvent::ConversationsChanged);
}

fn deliver_reply(weak: &WeakRepository, conversation_id: &str, text: String, closed: &AtomicBool) {
    let Some(repo) = weak.upgrade() else {
        return;
    };
    let result = repo.update(|state, events| {
        if closed.load(Ordering::Acquire) {
            return Ok(false);
        }
        let now = now_millis();
        let thread = state.thread_mut(conversation_id)?;
        let reply = thread.receive(MessageBody::text(text), now);
        thread.set_typing(false);
        state
            .conversations
            .record_activity(conversation_id, reply.body.preview(), now)?;
        events.push(RepositoryEvent::ThreadChanged {
            conversation_id: conversation_id.to_string(),
        });
        events.push(RepositoryEvent::TypingChanged {
            conversation_id: conversation_id.to_string(),
            typing: false,
        });
        events.push(RepositoryEvent::ConversationsChanged);
        Ok(true)
    });
    match result {
        Ok(true) => info!(%conversation_id, "simulated reply delivered"),
        Ok(false) => debug!(%conversation_id, "simulated reply after close dropped"),
        Err(err) => debug!(%conversation_id, error = %err, "simulated reply dropped"),
    }
}
