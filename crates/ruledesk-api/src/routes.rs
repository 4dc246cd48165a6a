use crate::handlers;
use crate::state::AppState;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch};
use axum::Router;
use ruledesk_core_types::correlation::{RequestContext, RequestId};
use ruledesk_core_types::schema::HEADER_REQUEST_ID;
use tracing::Instrument;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rules", get(handlers::list_rules).post(handlers::create_rule))
        .route(
            "/rules/:id",
            get(handlers::get_rule)
                .patch(handlers::update_rule)
                .delete(handlers::delete_rule),
        )
        .route("/rules/:id/publish", patch(handlers::publish_rule))
        .route("/rules/:id/history", get(handlers::rule_history))
        .route("/template", get(handlers::get_template))
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}

/// Reuse or mint an `x-request-id`, expose it to handlers as a
/// [`RequestContext`], scope the request's logs to it and echo it back
async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(|s| RequestId::from_string(s.to_string()))
        .unwrap_or_default();
    req.extensions_mut()
        .insert(RequestContext::with_request_id(id.clone()));
    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path()
    );

    let mut res = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        res.headers_mut().insert(HEADER_REQUEST_ID, value);
    }
    res
}
