use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "apilock",
    about = "apilock: catch breaking changes in public API surfaces",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding recorded snapshots
    #[arg(long, global = true, default_value = "api-snapshots")]
    pub store: PathBuf,

    /// Gate configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two serialized symbol trees
    Diff(DiffArgs),
    /// Check API types from a symbol manifest against their snapshots
    Check(CheckArgs),
    /// Record the current trees as the approved snapshots
    Approve(ApproveArgs),
    /// Render a stored snapshot
    Show(ShowArgs),
    /// List stored snapshots
    List(ListArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// The recorded tree (JSON)
    pub original: PathBuf,
    /// The tree to compare against it (JSON)
    pub candidate: PathBuf,
    /// Also print a line diff of the rendered surfaces
    #[arg(long)]
    pub surface: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Symbol manifest produced by an extractor
    #[arg(long)]
    pub symbols: PathBuf,
    /// API types to check (default: every type in the manifest)
    #[arg(long = "type", value_name = "NAME")]
    pub types: Vec<String>,
}

#[derive(Args)]
pub struct ApproveArgs {
    #[arg(long)]
    pub symbols: PathBuf,
    #[arg(long = "type", value_name = "NAME", required = true)]
    pub types: Vec<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub name: String,
}

#[derive(Args)]
pub struct ListArgs {}
