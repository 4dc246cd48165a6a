use super::state::EditState;
use serde::Serialize;

/// Mutating actions a user can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    New,
    Save,
    Discard,
    Delete,
    Publish,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::New => "new",
            Action::Save => "save",
            Action::Discard => "discard",
            Action::Delete => "delete",
            Action::Publish => "publish",
        }
    }
}

/// Which actions are currently enabled
///
/// New, Delete and Publish are all disabled while there are unsaved edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionGates {
    pub new: bool,
    pub save: bool,
    pub discard: bool,
    pub delete: bool,
    pub publish: bool,
}

impl ActionGates {
    pub fn evaluate(state: &EditState, modifiable: bool) -> Self {
        let dirty = state.is_dirty();
        let selected = state.is_selected();
        Self {
            new: !dirty && selected && modifiable,
            save: dirty && modifiable,
            discard: dirty,
            delete: !dirty && selected && modifiable,
            publish: !dirty && selected && modifiable,
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::New => self.new,
            Action::Save => self.save,
            Action::Discard => self.discard,
            Action::Delete => self.delete,
            Action::Publish => self.publish,
        }
    }
}
