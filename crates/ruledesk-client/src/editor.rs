//! Editor driver over the lifecycle state machine
//!
//! Holds the authoritative [`EditState`], checks [`ActionGates`] before any
//! network call, and only replaces the state once the server has answered
//! successfully. Failed actions leave the buffers exactly as they were.

use crate::client::RuleClient;
use crate::error::{ClientError, Result};
use ruledesk_core::document::Document;
use ruledesk_core::lifecycle::{
    Action, ActionGates, AlwaysModifiable, EditState, ModifiablePolicy, Notice,
};
use ruledesk_core::model::Rule;

pub const SAVED: &str = "Saved successfully";
pub const DELETED: &str = "Deleted rule successfully";
pub const PUBLISHED: &str = "Published successfully";

pub struct RuleEditor<C, P = AlwaysModifiable> {
    client: C,
    policy: P,
    template: String,
    state: EditState,
    notice: Option<Notice>,
    explorer_stale: bool,
}

impl<C: RuleClient> RuleEditor<C, AlwaysModifiable> {
    pub fn new(client: C, template: impl Into<String>) -> Self {
        Self::with_policy(client, AlwaysModifiable, template)
    }
}

impl<C: RuleClient, P: ModifiablePolicy> RuleEditor<C, P> {
    pub fn with_policy(client: C, policy: P, template: impl Into<String>) -> Self {
        let template = template.into();
        Self {
            client,
            policy,
            state: EditState::new_rule(template.clone()),
            template,
            notice: None,
            explorer_stale: false,
        }
    }

    /// Start from the template the server offers
    ///
    /// # Errors
    ///
    /// The template request failed.
    pub async fn connect(client: C, policy: P) -> Result<Self> {
        let template = client.template().await?;
        Ok(Self::with_policy(client, policy, template))
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn gates(&self) -> ActionGates {
        let modifiable = self.policy.is_modifiable(self.state.selected());
        ActionGates::evaluate(&self.state, modifiable)
    }

    /// Latest outcome message, if any
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Whether a rule list shown next to the editor needs refreshing
    pub fn explorer_stale(&self) -> bool {
        self.explorer_stale
    }

    pub fn mark_explorer_fresh(&mut self) {
        self.explorer_stale = false;
    }

    fn ensure(&self, action: Action) -> Result<()> {
        if self.gates().allows(action) {
            Ok(())
        } else {
            tracing::debug!(action = action.as_str(), "editor action disabled");
            Err(ClientError::NotPermitted { action })
        }
    }

    fn succeeded(&mut self, state: EditState, message: &str) {
        self.state = state;
        self.notice = Some(Notice::success(message));
        self.explorer_stale = true;
    }

    fn failed<T>(&mut self, err: ClientError) -> Result<T> {
        tracing::warn!(error = %err, "editor action failed");
        self.notice = Some(Notice::error(err.to_string()));
        Err(err)
    }

    /// Load `id` from the server and make it the selection
    ///
    /// # Errors
    ///
    /// The fetch failed; the current state is kept.
    pub async fn select(&mut self, id: &str) -> Result<&EditState> {
        match self.client.get_rule(id).await {
            Ok(rule) => {
                self.state = EditState::from_rule(&rule);
                Ok(&self.state)
            }
            Err(e) => self.failed(e),
        }
    }

    /// Replace the edit buffer
    pub fn edit(&mut self, text: impl Into<String>) {
        self.state = self.state.clone().edited(text);
    }

    /// Clear the selection and start over from the template
    ///
    /// # Errors
    ///
    /// `ClientError::NotPermitted` while dirty, unselected or locked.
    pub fn new_rule(&mut self) -> Result<()> {
        self.ensure(Action::New)?;
        self.state = EditState::new_rule(self.template.clone());
        Ok(())
    }

    /// # Errors
    ///
    /// `ClientError::NotPermitted` when there is nothing to discard.
    pub fn discard(&mut self) -> Result<()> {
        self.ensure(Action::Discard)?;
        self.state = self.state.clone().discarded();
        Ok(())
    }

    /// Update the selected rule, or create one when nothing is selected
    ///
    /// # Errors
    ///
    /// `ClientError::NotPermitted`, or whatever the server call returned.
    pub async fn save(&mut self) -> Result<Rule> {
        self.ensure(Action::Save)?;
        let content = self.state.modified().to_string();
        let result = match self.state.selected() {
            Some(id) => self.client.update_rule(id, &content).await,
            None => self.client.create_rule(&content).await,
        };
        match result {
            Ok(rule) => {
                let next = self.state.clone().adopted(&rule);
                self.succeeded(next, SAVED);
                Ok(rule)
            }
            Err(e) => self.failed(e),
        }
    }

    /// # Errors
    ///
    /// `ClientError::NotPermitted`, or whatever the server call returned.
    pub async fn delete(&mut self) -> Result<()> {
        self.ensure(Action::Delete)?;
        let Some(id) = self.state.selected().map(str::to_string) else {
            return Err(ClientError::NotPermitted {
                action: Action::Delete,
            });
        };
        match self.client.delete_rule(&id).await {
            Ok(()) => {
                let next = EditState::new_rule(self.template.clone());
                self.succeeded(next, DELETED);
                Ok(())
            }
            Err(e) => self.failed(e),
        }
    }

    /// Validate the buffer locally, then publish the selected rule
    ///
    /// # Errors
    ///
    /// - `ClientError::NotPermitted` while dirty, unselected or locked
    /// - `ClientError::Validation` when the buffer does not parse; nothing
    ///   is sent
    /// - `ClientError::Network` / `ClientError::Rejected` from the server
    pub async fn publish(&mut self) -> Result<Rule> {
        self.ensure(Action::Publish)?;
        let Some(id) = self.state.selected().map(str::to_string) else {
            return Err(ClientError::NotPermitted {
                action: Action::Publish,
            });
        };
        if let Err(e) = Document::parse(self.state.modified()) {
            return self.failed(e.into());
        }
        match self.client.publish_rule(&id).await {
            Ok(rule) => {
                let next = self.state.clone().adopted(&rule);
                self.succeeded(next, PUBLISHED);
                Ok(rule)
            }
            Err(e) => self.failed(e),
        }
    }
}
