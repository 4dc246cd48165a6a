//! Rule endpoints

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ruledesk_core::errors::{ExError, ExErrorKind, ExResult};
use ruledesk_core::model::{Rule, RuleSnapshot, RuleSummary};
use ruledesk_core_types::RequestContext;
use ruledesk_engine::commands::rule;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBody {
    pub content: String,
}

/// Run a storage-bound closure on the blocking pool, tagging failures
/// with the caller's request id
async fn blocking<T, F>(ctx: RequestContext, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> ExResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ExError::new(ExErrorKind::Internal).with_message(e.to_string()))
        .and_then(|result| result)
        .map_err(|e| ApiError::from(e.with_request_id(ctx.request_id)))
}

pub async fn list_rules(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<RuleSummary>>, ApiError> {
    let rules = blocking(ctx, move || rule::list_rules(state.storage.as_ref())).await?;
    Ok(Json(rules))
}

pub async fn create_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<ContentBody>,
) -> Result<(StatusCode, Json<Rule>), ApiError> {
    let created = blocking(ctx, move || rule::create_rule(&body.content, state.storage.as_ref())).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Rule>, ApiError> {
    let found = blocking(ctx, move || rule::get_rule(&id, state.storage.as_ref())).await?;
    Ok(Json(found))
}

pub async fn update_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<ContentBody>,
) -> Result<Json<Rule>, ApiError> {
    let updated =
        blocking(ctx, move || rule::update_rule(&id, &body.content, state.storage.as_ref())).await?;
    Ok(Json(updated))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    blocking(ctx, move || rule::delete_rule(&id, state.storage.as_ref())).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Rule>, ApiError> {
    let outcome = blocking(ctx, move || {
        ruledesk_engine::publish_rule(&id, state.storage.as_ref(), state.allocator.as_ref())
    })
    .await?;
    Ok(Json(outcome.rule))
}

pub async fn rule_history(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RuleSnapshot>>, ApiError> {
    let history = blocking(ctx, move || rule::rule_history(&id, state.storage.as_ref())).await?;
    Ok(Json(history))
}

pub async fn get_template(State(state): State<AppState>) -> Json<ContentBody> {
    Json(ContentBody {
        content: state.template.to_string(),
    })
}
