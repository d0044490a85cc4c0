//! kanban-reorder - reconcile kanban drag-and-drop events.
//!
//! Commands:
//! - `kanban-reorder reconcile --board <doc> --drop <file>`: print the intents for a drop
//! - `kanban-reorder apply --board <doc> --drop <file> [--out <doc>]`: apply a drop
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: Move rejected (capacity or duplicate assignee)

use std::io;

use clap::Parser;
use kanban_reorder::{ReorderConfig, ReorderError};
use tracing_subscriber::EnvFilter;

use kanban_reorder_cli::commands::{run_apply, run_reconcile};
use kanban_reorder_cli::{Cli, Commands};

/// Exit code returned when the move is rejected.
const REJECTED_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level
    let filter = if cli.debug {
        EnvFilter::new("kanban_reorder=debug,kanban_reorder_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => error_to_exit(e),
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ReorderConfig::load_from(cli.config.as_deref())?;
    let mut stdout = io::stdout().lock();
    match &cli.command {
        Commands::Reconcile(args) => run_reconcile(args, &config, &mut stdout).await,
        Commands::Apply(args) => run_apply(args, &config, &mut stdout).await,
    }
}

/// Rejections print the board's alert text and exit 2; anything else exits 1.
fn error_to_exit(error: anyhow::Error) -> i32 {
    if let Some(message) = error
        .downcast_ref::<ReorderError>()
        .and_then(ReorderError::user_message)
    {
        eprintln!("{}", message);
        return REJECTED_EXIT_CODE;
    }
    eprintln!("Error: {:#}", error);
    1
}
