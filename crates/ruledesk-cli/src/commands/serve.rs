//! `serve` command

use anyhow::Context;
use clap::Args;
use ruledesk_api::ApiConfig;
use ruledesk_core::logging_facility::{self, Profile};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Config file; `ruledesk.toml` plus `RULEDESK_*` variables when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub bind: Option<String>,

    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn execute(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ApiConfig::from_file(path),
        None => ApiConfig::load(),
    }
    .context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }

    let profile: Profile = config.profile().map_err(anyhow::Error::msg)?;
    logging_facility::init(profile);

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(ruledesk_api::serve(config))
}
