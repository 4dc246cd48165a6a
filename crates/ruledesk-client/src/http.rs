//! reqwest-backed [`RuleClient`]

use crate::client::RuleClient;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use ruledesk_core::model::{Rule, RuleSummary};
use ruledesk_core_types::schema::HEADER_REQUEST_ID;
use ruledesk_core_types::{RequestId, Sensitive};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ContentBody<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct TemplateBody {
    content: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpRuleClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<Sensitive<String>>,
}

impl HttpRuleClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Sensitive::new(token.into()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = RequestId::new();
        tracing::debug!(%method, path, request_id = %request_id, "rule api request");
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(HEADER_REQUEST_ID, request_id.as_str());
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.map_err(|e| ClientError::Network {
            message: format!("reading error response: {e}"),
        })?;
        Err(rejection(status.as_u16(), text))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        response.json::<T>().await.map_err(|e| ClientError::Network {
            message: format!("invalid response body: {e}"),
        })
    }
}

/// Error body of a non-2xx response; non-JSON bodies are kept as the message
fn rejection(status: u16, text: String) -> ClientError {
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.message),
        Err(_) => (format!("HTTP_{}", status), text),
    };
    ClientError::Rejected {
        status,
        code,
        message,
    }
}

#[async_trait]
impl RuleClient for HttpRuleClient {
    async fn list_rules(&self) -> Result<Vec<RuleSummary>> {
        self.send_json(self.request(Method::GET, "/rules")).await
    }

    async fn get_rule(&self, id: &str) -> Result<Rule> {
        self.send_json(self.request(Method::GET, &format!("/rules/{id}")))
            .await
    }

    async fn create_rule(&self, content: &str) -> Result<Rule> {
        let builder = self
            .request(Method::POST, "/rules")
            .json(&ContentBody { content });
        self.send_json(builder).await
    }

    async fn update_rule(&self, id: &str, content: &str) -> Result<Rule> {
        let builder = self
            .request(Method::PATCH, &format!("/rules/{id}"))
            .json(&ContentBody { content });
        self.send_json(builder).await
    }

    async fn delete_rule(&self, id: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/rules/{id}")))
            .await?;
        Ok(())
    }

    async fn publish_rule(&self, id: &str) -> Result<Rule> {
        self.send_json(self.request(Method::PATCH, &format!("/rules/{id}/publish")))
            .await
    }

    async fn template(&self) -> Result<String> {
        let body: TemplateBody = self.send_json(self.request(Method::GET, "/template")).await?;
        Ok(body.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reads_error_body() {
        let err = rejection(
            404,
            r#"{"code":"ERR_NOT_FOUND","message":"no rule","request_id":"r1"}"#.to_string(),
        );
        assert_eq!(err.code(), Some("ERR_NOT_FOUND"));

        let err = rejection(502, "bad gateway".to_string());
        assert!(matches!(
            err,
            ClientError::Rejected { status: 502, ref code, ref message }
                if code == "HTTP_502" && message == "bad gateway"
        ));
    }

    #[test]
    fn test_base_url_is_normalised() {
        let client = HttpRuleClient::new("http://localhost:7070/");
        assert_eq!(client.base_url(), "http://localhost:7070");
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let client = HttpRuleClient::new("http://localhost:7070").with_token("s3cret");
        assert!(!format!("{client:?}").contains("s3cret"));
    }
}
