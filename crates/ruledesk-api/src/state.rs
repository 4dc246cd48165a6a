use ruledesk_core::allocator::IdentifierAllocator;
use ruledesk_core::storage::RuleStorage;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn RuleStorage>,
    pub allocator: Arc<dyn IdentifierAllocator>,
    /// Text offered for new rules
    pub template: Arc<str>,
}

impl AppState {
    /// State over a store that also allocates identifiers
    pub fn new<S>(store: Arc<S>, template: impl Into<Arc<str>>) -> Self
    where
        S: RuleStorage + IdentifierAllocator + 'static,
    {
        Self {
            storage: store.clone(),
            allocator: store,
            template: template.into(),
        }
    }
}
