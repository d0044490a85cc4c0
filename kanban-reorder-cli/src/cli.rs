//! CLI definition for kanban-reorder.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for printed intents and documents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// kanban-reorder - reconcile kanban drag-and-drop events
#[derive(Parser, Debug)]
#[command(name = "kanban-reorder")]
#[command(version)]
#[command(about = "Reconcile kanban drag-and-drop events into sync intents")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file (toml, yaml or json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the intents a drop would produce, without applying them
    Reconcile(ReconcileArgs),
    /// Apply a drop to a board document and write the result
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Board document (yaml or json)
    #[arg(short, long)]
    pub board: PathBuf,

    /// Drop result from the drag-and-drop layer
    #[arg(long)]
    pub drop: PathBuf,

    /// How to print the intents
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Board document (yaml or json)
    #[arg(short, long)]
    pub board: PathBuf,

    /// Drop result from the drag-and-drop layer
    #[arg(long)]
    pub drop: PathBuf,

    /// Where to write the updated document; printed as YAML when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}
