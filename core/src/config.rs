use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const REPLY_DELAY_ENV: &str = "CHATSPHERE_REPLY_DELAY_MS";
const REPLY_TEXT_ENV: &str = "CHATSPHERE_REPLY_TEXT";
const LOG_DIR_ENV: &str = "CHATSPHERE_LOG_DIR";

pub const DEFAULT_AVATAR: &str = "https://cdn-icons-png.flaticon.com/512/149/149071.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub reply_delay_ms: u64,
    pub reply_text: String,
    pub new_chat_preview: String,
    pub default_avatar: String,
    pub default_bio: String,
    pub diagnostics_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 1500,
            reply_text: "Okay great!".to_string(),
            new_chat_preview: "New contact added!".to_string(),
            default_avatar: DEFAULT_AVATAR.to_string(),
            default_bio: "Hey there! I'm using ChatSphere.".to_string(),
            diagnostics_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: ClientConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, CoreError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps an environment key to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(REPLY_DELAY_ENV) {
            self.reply_delay_ms = raw.trim().parse().map_err(|_| {
                CoreError::InvalidArgument(format!("{} must be milliseconds, got {:?}", REPLY_DELAY_ENV, raw))
            })?;
        }
        if let Some(text) = lookup(REPLY_TEXT_ENV) {
            if text.trim().is_empty() {
                return Err(CoreError::InvalidArgument(format!("{} is empty", REPLY_TEXT_ENV)));
            }
            self.reply_text = text;
        }
        if let Some(dir) = lookup(LOG_DIR_ENV) {
            self.diagnostics_dir = Some(PathBuf::from(dir));
        }
        Ok(self)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}
