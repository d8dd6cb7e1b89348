use crate::conversations::matches_query;
use crate::error::CoreError;
use crate::media::{pick_file, MediaPicker, PickerKind};
use crate::models::{FileDescriptor, StatusUpdate};

/// True when the status media should be played as a video rather than shown as an image.
pub fn is_video(uri: &str) -> bool {
    uri.ends_with(".mp4") || uri.contains("video") || uri.contains(".mov")
}

#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    updates: Vec<StatusUpdate>,
    mine: Option<FileDescriptor>,
}

impl StatusBoard {
    pub fn new(updates: Vec<StatusUpdate>) -> Self {
        Self { updates, mine: None }
    }

    pub fn unseen(&self, search: &str) -> Vec<&StatusUpdate> {
        self.filtered(search, false)
    }

    pub fn seen(&self, search: &str) -> Vec<&StatusUpdate> {
        self.filtered(search, true)
    }

    fn filtered(&self, search: &str, seen: bool) -> Vec<&StatusUpdate> {
        self.updates
            .iter()
            .filter(|s| s.seen == seen && matches_query(&s.name, search))
            .collect()
    }

    /// Opens a status in the viewer and moves it to the seen list.
    pub fn view(&mut self, id: &str) -> Option<&StatusUpdate> {
        let update = self.updates.iter_mut().find(|s| s.id == id)?;
        update.seen = true;
        Some(update)
    }

    pub fn my_status(&self) -> Option<&FileDescriptor> {
        self.mine.as_ref()
    }

    pub fn set_my_status(&mut self, media: FileDescriptor) {
        self.mine = Some(media);
    }

    /// Picks my status from the gallery. Returns `false` when the pick was cancelled.
    pub fn add_my_status<P: MediaPicker + ?Sized>(&mut self, picker: &P) -> Result<bool, CoreError> {
        match pick_file(picker, PickerKind::Gallery)? {
            Some(media) => {
                self.set_my_status(media);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
