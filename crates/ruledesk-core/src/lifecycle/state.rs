use crate::model::{Rule, RuleSnapshot};

/// Last known persisted state of the rule being edited
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Baseline {
    pub content: String,
    pub history: Vec<RuleSnapshot>,
}

/// Selection plus the two edit buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    selected: Option<String>,
    unmodified: Baseline,
    modified: String,
}

impl EditState {
    /// Unselected state with both buffers set to `template`
    pub fn new_rule(template: impl Into<String>) -> Self {
        let template = template.into();
        Self {
            selected: None,
            unmodified: Baseline {
                content: template.clone(),
                history: Vec::new(),
            },
            modified: template,
        }
    }

    /// State after the server returned `rule`: selected, clean
    pub fn from_rule(rule: &Rule) -> Self {
        Self {
            selected: Some(rule.id.clone()),
            unmodified: Baseline {
                content: rule.content.clone(),
                history: rule.history.clone(),
            },
            modified: rule.content.clone(),
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn unmodified(&self) -> &Baseline {
        &self.unmodified
    }

    pub fn modified(&self) -> &str {
        &self.modified
    }

    pub fn is_selected(&self) -> bool {
        self.selected.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.modified != self.unmodified.content
    }

    /// Replace the edit buffer
    pub fn edited(self, text: impl Into<String>) -> Self {
        Self {
            modified: text.into(),
            ..self
        }
    }

    /// Drop unsaved edits
    pub fn discarded(self) -> Self {
        Self {
            modified: self.unmodified.content.clone(),
            ..self
        }
    }

    /// Take the server's copy as both baseline and buffer
    pub fn adopted(self, rule: &Rule) -> Self {
        Self::from_rule(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_rule_is_clean_and_unselected() {
        let state = EditState::new_rule("Core:\n  Status: Draft\n");
        assert!(!state.is_selected());
        assert!(!state.is_dirty());
        assert_eq!(state.modified(), state.unmodified().content);
    }

    #[test]
    fn test_edit_then_discard() {
        let state = EditState::new_rule("a: 1\n").edited("a: 2\n");
        assert!(state.is_dirty());
        let state = state.discarded();
        assert!(!state.is_dirty());
        assert_eq!(state.modified(), "a: 1\n");
    }

    #[test]
    fn test_editing_back_to_baseline_is_clean() {
        let state = EditState::new_rule("a: 1\n").edited("a: 2\n").edited("a: 1\n");
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_adopt_selects_rule() {
        let rule = Rule::new("r1".into(), "a: 1\n".into(), json!({"a": 1}));
        let state = EditState::new_rule("x: 0\n").edited("a: 1\n").adopted(&rule);
        assert_eq!(state.selected(), Some("r1"));
        assert!(!state.is_dirty());
        assert!(state.unmodified().history.is_empty());
    }
}
