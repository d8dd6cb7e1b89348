//! Shared in-memory chat state.
//!
//! The chat list and every open thread hold clones of one [`ChatRepository`].
//! Mutations go through [`ChatRepository::update`], which publishes
//! [`RepositoryEvent`]s to subscribers once the state lock is released.

use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, Weak};

use tracing::trace;

use crate::config::ClientConfig;
use crate::conversations::ConversationStore;
use crate::error::CoreError;
use crate::filters::TabRegistry;
use crate::messages::MessageThread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    ConversationsChanged,
    TabsChanged,
    ThreadChanged { conversation_id: String },
    TypingChanged { conversation_id: String, typing: bool },
}

#[derive(Debug, Clone, Default)]
pub struct RepositoryState {
    pub conversations: ConversationStore,
    pub tabs: TabRegistry,
    threads: HashMap<String, MessageThread>,
}

impl RepositoryState {
    pub fn new(conversations: ConversationStore) -> Self {
        Self {
            conversations,
            tabs: TabRegistry::new(),
            threads: HashMap::new(),
        }
    }

    pub fn thread(&self, conversation_id: &str) -> Option<&MessageThread> {
        self.threads.get(conversation_id)
    }

    /// Thread for an existing conversation, created empty on first use.
    pub fn thread_mut(&mut self, conversation_id: &str) -> Result<&mut MessageThread, CoreError> {
        if self.conversations.get(conversation_id).is_none() {
            return Err(CoreError::NotFound(format!("conversation {}", conversation_id)));
        }
        Ok(self
            .threads
            .entry(conversation_id.to_string())
            .or_insert_with(|| MessageThread::new(conversation_id)))
    }

    pub fn insert_thread(&mut self, thread: MessageThread) {
        self.threads.insert(thread.conversation_id().to_string(), thread);
    }

    pub(crate) fn drop_orphan_threads(&mut self) {
        let conversations = &self.conversations;
        self.threads.retain(|id, _| conversations.get(id).is_some());
    }
}

struct Shared {
    state: Mutex<RepositoryState>,
    subscribers: Mutex<Vec<mpsc::Sender<RepositoryEvent>>>,
    config: ClientConfig,
}

#[derive(Clone)]
pub struct ChatRepository {
    shared: Arc<Shared>,
}

impl ChatRepository {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_state(config, RepositoryState::default())
    }

    pub fn with_state(config: ClientConfig, state: RepositoryState) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                subscribers: Mutex::new(Vec::new()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    pub fn subscribe(&self) -> Result<mpsc::Receiver<RepositoryEvent>, CoreError> {
        let (tx, rx) = mpsc::channel();
        self.shared
            .subscribers
            .lock()
            .map_err(|_| CoreError::StatePoisoned)?
            .push(tx);
        Ok(rx)
    }

    pub fn read<T, F>(&self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&RepositoryState) -> T,
    {
        let guard = self.shared.state.lock().map_err(|_| CoreError::StatePoisoned)?;
        Ok(f(&guard))
    }

    /// Applies `f` under the state lock. Events pushed by `f` are published
    /// only when it succeeds, after the lock is released.
    pub fn update<T, F>(&self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut RepositoryState, &mut Vec<RepositoryEvent>) -> Result<T, CoreError>,
    {
        let mut events = Vec::new();
        let result = {
            let mut guard = self.shared.state.lock().map_err(|_| CoreError::StatePoisoned)?;
            f(&mut guard, &mut events)?
        };
        self.publish(events);
        Ok(result)
    }

    fn publish(&self, events: Vec<RepositoryEvent>) {
        if events.is_empty() {
            return;
        }
        let Ok(mut subscribers) = self.shared.subscribers.lock() else {
            return;
        };
        for event in events {
            trace!(?event, "publish");
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    pub(crate) fn downgrade(&self) -> WeakRepository {
        WeakRepository(Arc::downgrade(&self.shared))
    }
}

/// Non-owning handle held by timers so a pending callback never keeps state alive.
#[derive(Clone)]
pub(crate) struct WeakRepository(Weak<Shared>);

impl WeakRepository {
    pub(crate) fn upgrade(&self) -> Option<ChatRepository> {
        self.0.upgrade().map(|shared| ChatRepository { shared })
    }
}
