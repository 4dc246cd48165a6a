//! RuleDesk CLI
//!
//! Command-line interface for RuleDesk

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "ruledesk")]
#[command(about = "RuleDesk - Rule authoring and publishing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rule operations against the local store
    Rule(commands::rule::RuleArgs),
    /// Run the HTTP API
    Serve(commands::serve::ServeArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Rule(args) => commands::rule::execute(args),
        Commands::Serve(args) => commands::serve::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
