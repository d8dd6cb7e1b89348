/// What a tap on a list item should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Not in selection mode: open the item.
    Open(String),
    Selected(String),
    Deselected(String),
}

/// Multi-select state shared by the chat list and the message thread.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Vec<String>,
    active: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// Long-press enters selection mode with the item selected. Returns whether it changed.
    pub fn long_press(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.active = true;
        self.ids.push(id.to_string());
        true
    }

    pub fn tap(&mut self, id: &str) -> TapOutcome {
        if !self.active {
            return TapOutcome::Open(id.to_string());
        }
        if self.contains(id) {
            self.ids.retain(|s| s != id);
            if self.ids.is_empty() {
                self.active = false;
            }
            TapOutcome::Deselected(id.to_string())
        } else {
            self.ids.push(id.to_string());
            TapOutcome::Selected(id.to_string())
        }
    }

    pub fn close(&mut self) {
        self.ids.clear();
        self.active = false;
    }

    /// Hands the selected ids to a bulk action and leaves selection mode.
    pub fn take(&mut self) -> Vec<String> {
        self.active = false;
        std::mem::take(&mut self.ids)
    }

    /// Drops ids that no longer refer to live items.
    pub fn retain_existing<F>(&mut self, exists: F)
    where
        F: Fn(&str) -> bool,
    {
        self.ids.retain(|id| exists(id));
        if self.ids.is_empty() {
            self.active = false;
        }
    }
}
