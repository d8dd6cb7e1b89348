use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Validation(String),
    #[error("Tab name cannot be empty.")]
    EmptyTabName,
    #[error("Tab \"{0}\" already exists.")]
    DuplicateTab(String),
    #[error("Please select at least one chat.")]
    NoChatsSelected,
    #[error("{0} is already in your chats.")]
    DuplicateConversation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("No contacts found on your phone.")]
    NoContacts,
    #[error("{0}")]
    External(String),
    #[error("No updates to save.")]
    NoChanges,
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("repository state lock poisoned")]
    StatePoisoned,
}

/// Blocking, dismissible message shown to the user when an operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl From<&CoreError> for Alert {
    fn from(err: &CoreError) -> Self {
        let title = match err {
            CoreError::EmptyTabName | CoreError::NoChatsSelected | CoreError::Validation(_) => "Invalid",
            CoreError::DuplicateTab(_) => "Tab already exists",
            CoreError::DuplicateConversation(_) => "Already Added",
            CoreError::PermissionDenied(_) => "Permission denied",
            CoreError::NoContacts => "No contacts",
            CoreError::NoChanges => "No Changes",
            CoreError::NotFound(_) => "Not found",
            CoreError::External(_)
            | CoreError::InvalidArgument(_)
            | CoreError::Json(_)
            | CoreError::Io(_)
            | CoreError::StatePoisoned => "Error",
        };
        Alert::new(title, err.to_string())
    }
}

impl From<CoreError> for Alert {
    fn from(err: CoreError) -> Self {
        Alert::from(&err)
    }
}
