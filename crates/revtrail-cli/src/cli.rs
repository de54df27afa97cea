use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use revtrail_types::Revision;

#[derive(Parser)]
#[command(
    name = "revtrail",
    about = "revtrail: revision tree queries and state diffs over commit history",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with comparison settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the parent of every revision
    Parents(HistoryArgs),
    /// Print the lowest common ancestor of two revisions
    Lca(LcaArgs),
    /// Print the change list recorded by a revision
    Changes(ChangesArgs),
    /// Compare the states of two revisions
    Diff(DiffArgs),
}

#[derive(Args)]
pub struct HistoryArgs {
    /// JSON array of commit records
    #[arg(long)]
    pub history: PathBuf,
}

#[derive(Args)]
pub struct LcaArgs {
    #[command(flatten)]
    pub history: HistoryArgs,
    pub v1: Revision,
    pub v2: Revision,
}

#[derive(Args)]
pub struct ChangesArgs {
    #[command(flatten)]
    pub history: HistoryArgs,
    pub revision: Revision,
}

#[derive(Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub history: HistoryArgs,
    /// Directory holding `<revision>.json` snapshots
    #[arg(long)]
    pub snapshots: PathBuf,
    pub v1: Revision,
    pub v2: Revision,
}
