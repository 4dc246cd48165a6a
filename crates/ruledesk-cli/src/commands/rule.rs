//! Rule commands

use anyhow::Context;
use clap::{Args, Subcommand};
use ruledesk_engine::{
    apply_engine_command, apply_engine_query, EngineCommand, EngineCommandResult, EngineQuery,
    EngineQueryResult,
};
use ruledesk_store::db::DEFAULT_BUSY_TIMEOUT;
use ruledesk_store::SqliteRuleStorage;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RuleArgs {
    #[arg(long, global = true, default_value = ".ruledesk/rules.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: RuleCommand,
}

#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    /// List stored rules
    List,
    /// Print a rule's content
    Show { id: String },
    /// Create a rule from a YAML file
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Replace a rule's content from a YAML file
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    Delete { id: String },
    /// Assign Core.Id if needed and mark the rule Published
    Publish { id: String },
    /// Print earlier versions, oldest first
    History { id: String },
}

pub fn execute(args: RuleArgs) -> anyhow::Result<()> {
    let storage = SqliteRuleStorage::open(&args.db, DEFAULT_BUSY_TIMEOUT)
        .with_context(|| format!("opening {}", args.db.display()))?;

    match args.command {
        RuleCommand::List => list(&storage),
        RuleCommand::Show { id } => show(&storage, id),
        RuleCommand::History { id } => history(&storage, id),
        RuleCommand::Create { file } => {
            let content = read(&file)?;
            run(&storage, EngineCommand::CreateRule { content })
        }
        RuleCommand::Update { id, file } => {
            let content = read(&file)?;
            run(&storage, EngineCommand::UpdateRule { rule_id: id, content })
        }
        RuleCommand::Delete { id } => run(&storage, EngineCommand::DeleteRule { rule_id: id }),
        RuleCommand::Publish { id } => run(&storage, EngineCommand::PublishRule { rule_id: id }),
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn run(storage: &SqliteRuleStorage, cmd: EngineCommand) -> anyhow::Result<()> {
    match apply_engine_command(cmd, storage, storage)? {
        EngineCommandResult::Created(rule) => {
            println!("Rule created:");
            println!("  id: {}", rule.id);
            println!("  revision: {}", rule.revision);
        }
        EngineCommandResult::Updated(rule) => {
            println!("Rule updated:");
            println!("  id: {}", rule.id);
            println!("  revision: {}", rule.revision);
        }
        EngineCommandResult::Deleted { rule_id } => {
            println!("Rule deleted: {}", rule_id);
        }
        EngineCommandResult::Published(outcome) => {
            println!("Rule published:");
            println!("  id: {}", outcome.rule.id);
            println!("  core_id: {}", outcome.core_id);
            println!("  revision: {}", outcome.rule.revision);
            if !outcome.allocated {
                println!("  (existing Core.Id kept)");
            }
        }
    }
    Ok(())
}

fn list(storage: &SqliteRuleStorage) -> anyhow::Result<()> {
    let EngineQueryResult::Rules(rules) = apply_engine_query(EngineQuery::ListRules, storage)? else {
        anyhow::bail!("unexpected query result");
    };
    for rule in rules {
        let core_id = rule.core_id.map(|id| id.to_string());
        println!(
            "{}\t{}\t{}\trev {}",
            rule.id,
            core_id.as_deref().unwrap_or("-"),
            rule.status.as_deref().unwrap_or("-"),
            rule.revision
        );
    }
    Ok(())
}

fn show(storage: &SqliteRuleStorage, id: String) -> anyhow::Result<()> {
    let EngineQueryResult::Rule(rule) =
        apply_engine_query(EngineQuery::GetRule { rule_id: id }, storage)?
    else {
        anyhow::bail!("unexpected query result");
    };
    print!("{}", rule.content);
    Ok(())
}

fn history(storage: &SqliteRuleStorage, id: String) -> anyhow::Result<()> {
    let EngineQueryResult::History(snapshots) =
        apply_engine_query(EngineQuery::RuleHistory { rule_id: id }, storage)?
    else {
        anyhow::bail!("unexpected query result");
    };
    for snapshot in snapshots {
        println!("--- revision {} ({})", snapshot.revision, snapshot.recorded_at.to_rfc3339());
        print!("{}", snapshot.content);
    }
    Ok(())
}
