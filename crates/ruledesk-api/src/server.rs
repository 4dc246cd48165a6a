use crate::config::ApiConfig;
use crate::routes::router;
use crate::state::AppState;
use anyhow::Context;
use ruledesk_store::SqliteRuleStorage;
use std::sync::Arc;

/// Open the configured SQLite store and template
///
/// # Errors
///
/// Store cannot be opened or migrated, or the template file is unreadable.
pub fn open_state(config: &ApiConfig) -> anyhow::Result<AppState> {
    let store = SqliteRuleStorage::open(&config.db_path, config.busy_timeout())
        .with_context(|| format!("opening rule store at {}", config.db_path.display()))?;
    let template = config.template().context("reading rule template")?;
    Ok(AppState::new(Arc::new(store), template))
}

/// Serve the HTTP surface until the process is stopped
///
/// # Errors
///
/// Startup failures and listener errors.
pub async fn serve(config: ApiConfig) -> anyhow::Result<()> {
    let state = open_state(&config)?;
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(
        bind = %config.bind,
        db_path = %config.db_path.display(),
        "ruledesk api listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}
