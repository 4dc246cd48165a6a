//! Whether the rule in the editor may be changed

use std::collections::HashSet;

pub trait ModifiablePolicy: Send + Sync {
    /// `selected` is `None` for a rule that has not been saved yet
    fn is_modifiable(&self, selected: Option<&str>) -> bool;
}

/// Every rule may be edited
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysModifiable;

impl ModifiablePolicy for AlwaysModifiable {
    fn is_modifiable(&self, _selected: Option<&str>) -> bool {
        true
    }
}

/// A fixed set of rules is read-only; everything else is editable
///
/// ```
/// use ruledesk_core::lifecycle::{LockedRules, ModifiablePolicy};
///
/// let policy = LockedRules::new(["rule-frozen"]);
/// assert!(!policy.is_modifiable(Some("rule-frozen")));
/// assert!(policy.is_modifiable(Some("rule-other")));
/// assert!(policy.is_modifiable(None));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LockedRules {
    locked: HashSet<String>,
}

impl LockedRules {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locked: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl ModifiablePolicy for LockedRules {
    fn is_modifiable(&self, selected: Option<&str>) -> bool {
        selected.map_or(true, |id| !self.locked.contains(id))
    }
}
