pub mod calls;
pub mod chat_list;
pub mod commands;
pub mod communities;
pub mod config;
pub mod contacts;
pub mod conversations;
pub mod diagnostics;
pub mod error;
pub mod filters;
pub mod format;
pub mod identity;
pub mod media;
pub mod messages;
pub mod models;
pub mod repository;
pub mod seed;
pub mod selection;
pub mod status;
pub mod thread_view;
pub mod timer;

pub use chat_list::ChatList;
pub use config::ClientConfig;
pub use error::{Alert, CoreError};
pub use repository::{ChatRepository, RepositoryEvent, RepositoryState};
pub use thread_view::ThreadView;
