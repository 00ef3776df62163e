//! In-place label editing for a single annotation.

use crate::input::Key;

/// State of the label editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelEditState {
    #[default]
    Inactive,
    Editing {
        /// Position of the annotation in the scene.
        index: usize,
        buffer: String,
    },
}

/// Result of feeding a key to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelEditResult {
    /// The key edited the buffer (or was swallowed).
    Handled,
    /// Editing finished; write `label` into the annotation at `index`.
    Commit { index: usize, label: String },
    /// Editing ended without a change.
    Closed,
    /// The editor is inactive; the key belongs to someone else.
    NotHandled,
}

/// Sub-state-machine for editing one annotation's label.
#[derive(Debug, Clone, Default)]
pub struct LabelEditor {
    state: LabelEditState,
}

impl LabelEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LabelEditState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, LabelEditState::Editing { .. })
    }

    /// Index of the annotation being edited.
    pub fn editing_index(&self) -> Option<usize> {
        match &self.state {
            LabelEditState::Editing { index, .. } => Some(*index),
            LabelEditState::Inactive => None,
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            LabelEditState::Editing { buffer, .. } => Some(buffer),
            LabelEditState::Inactive => None,
        }
    }

    /// Start editing the annotation at `index`, seeded with its label.
    pub fn begin(&mut self, index: usize, current_label: &str) {
        log::debug!("label edit begin at index {}", index);
        self.state = LabelEditState::Editing {
            index,
            buffer: current_label.to_string(),
        };
    }

    /// Replace the whole buffer, e.g. from a host text field.
    pub fn set_buffer(&mut self, text: &str) {
        if let LabelEditState::Editing { buffer, .. } = &mut self.state {
            buffer.clear();
            buffer.push_str(text);
        }
    }

    /// Finish editing. Yields the trimmed label when it is not empty.
    pub fn confirm(&mut self) -> LabelEditResult {
        match std::mem::take(&mut self.state) {
            LabelEditState::Inactive => LabelEditResult::NotHandled,
            LabelEditState::Editing { index, buffer } => {
                let label = buffer.trim();
                if label.is_empty() {
                    LabelEditResult::Closed
                } else {
                    LabelEditResult::Commit {
                        index,
                        label: label.to_string(),
                    }
                }
            }
        }
    }

    /// Abandon editing without touching the annotation.
    pub fn cancel(&mut self) -> LabelEditResult {
        match std::mem::take(&mut self.state) {
            LabelEditState::Inactive => LabelEditResult::NotHandled,
            LabelEditState::Editing { .. } => LabelEditResult::Closed,
        }
    }

    /// Feed a pressed key while editing.
    pub fn handle_key(&mut self, key: &Key) -> LabelEditResult {
        match key {
            Key::Enter => return self.confirm(),
            Key::Escape => return self.cancel(),
            _ => {}
        }
        let LabelEditState::Editing { buffer, .. } = &mut self.state else {
            return LabelEditResult::NotHandled;
        };
        match key {
            Key::Enter | Key::Escape | Key::Delete => LabelEditResult::Handled,
            Key::Backspace => {
                buffer.pop();
                LabelEditResult::Handled
            }
            Key::Character(text) => {
                buffer.push_str(text);
                LabelEditResult::Handled
            }
        }
    }

    /// Keep the edited index valid after the annotation at `removed` is gone.
    ///
    /// Editing is cancelled if it targeted the removed annotation.
    pub fn on_removed(&mut self, removed: usize) {
        if let LabelEditState::Editing { index, .. } = &mut self.state {
            if *index == removed {
                log::debug!("label edit cancelled: annotation removed");
                self.state = LabelEditState::Inactive;
            } else if *index > removed {
                *index -= 1;
            }
        }
    }
}
