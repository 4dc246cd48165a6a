use crate::error::Result;
use async_trait::async_trait;
use ruledesk_core::model::{Rule, RuleSummary};

/// Remote rule operations used by the editor
#[async_trait]
pub trait RuleClient: Send + Sync {
    async fn list_rules(&self) -> Result<Vec<RuleSummary>>;

    async fn get_rule(&self, id: &str) -> Result<Rule>;

    async fn create_rule(&self, content: &str) -> Result<Rule>;

    async fn update_rule(&self, id: &str, content: &str) -> Result<Rule>;

    async fn delete_rule(&self, id: &str) -> Result<()>;

    /// Stamp `Core.Id`/`Core.Status` server-side and return the stored rule
    async fn publish_rule(&self, id: &str) -> Result<Rule>;

    /// Text the server offers for new rules
    async fn template(&self) -> Result<String>;
}
