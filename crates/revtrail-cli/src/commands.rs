use std::fmt::Write;

use anyhow::Context;
use colored::Colorize;
use revtrail_compare::{CompareConfig, DirectorySource, VersionComparer, VersionComparison};
use revtrail_diff::{LinkStatus, StateDiffEntry, StateId, StateStatus};
use revtrail_tree::ParentMap;
use revtrail_types::{ChangeCommand, Revision};

use crate::cli::*;

/// Run a command and return what it prints.
pub async fn run_command(cli: Cli) -> anyhow::Result<String> {
    let config = match &cli.config {
        Some(path) => CompareConfig::load_async(path).await?,
        None => CompareConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Command::Parents(args) => {
            let comparer = open(DirectorySource::new(&args.history), config).await?;
            render_parents(comparer.parent_map()?, format)
        }
        Command::Lca(args) => {
            let comparer = open(DirectorySource::new(&args.history.history), config).await?;
            let lca = comparer.find_lca(args.v1, args.v2)?;
            render_lca(args.v1, args.v2, lca, format)
        }
        Command::Changes(args) => {
            let comparer = open(DirectorySource::new(&args.history.history), config).await?;
            let commands = comparer.change_list(args.revision)?;
            render_changes(args.revision, &commands, format)
        }
        Command::Diff(args) => {
            let source =
                DirectorySource::new(&args.history.history).with_snapshot_dir(&args.snapshots);
            let comparer = open(source, config).await?;
            let comparison = comparer
                .compare(args.v1, args.v2)
                .await
                .with_context(|| format!("comparing {} with {}", args.v1, args.v2))?;
            render_comparison(&comparison, format)
        }
    }
}

async fn open(
    source: DirectorySource,
    config: CompareConfig,
) -> anyhow::Result<VersionComparer<DirectorySource>> {
    let comparer = VersionComparer::with_config(source, config);
    let tree = comparer
        .load_history()
        .await
        .context("loading commit history")?;
    tracing::debug!(latest = %tree.latest(), revisions = tree.len(), "history ready");
    Ok(comparer)
}

fn render_parents(parents: &ParentMap, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(parents)? + "\n");
    }
    let mut out = String::new();
    for (revision, parent) in parents {
        match parent {
            Some(parent) => writeln!(out, "{}  <- {}", revision.to_string().yellow(), parent)?,
            None => writeln!(out, "{}  {}", revision.to_string().yellow(), "(root)".dimmed())?,
        }
    }
    Ok(out)
}

fn render_lca(
    v1: Revision,
    v2: Revision,
    lca: Revision,
    format: OutputFormat,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        let value = serde_json::json!({ "v1": v1, "v2": v2, "lca": lca });
        return Ok(serde_json::to_string_pretty(&value)? + "\n");
    }
    Ok(format!(
        "Common ancestor of {} and {}: {}\n",
        v1,
        v2,
        lca.to_string().yellow().bold()
    ))
}

fn render_changes(
    revision: Revision,
    commands: &[ChangeCommand],
    format: OutputFormat,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(commands)? + "\n");
    }
    let mut out = String::new();
    writeln!(out, "Changes in {}", revision.to_string().yellow().bold())?;
    if commands.is_empty() {
        writeln!(out, "  {}", "(none)".dimmed())?;
    }
    for command in commands {
        writeln!(out, "  {}", command.summary())?;
    }
    Ok(out)
}

fn render_comparison(comparison: &VersionComparison, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(comparison)? + "\n");
    }

    let mut out = String::new();
    writeln!(
        out,
        "Comparing {} -> {} (common ancestor {})",
        comparison.v1.to_string().yellow().bold(),
        comparison.v2.to_string().yellow().bold(),
        comparison.lca
    )?;

    for (_, entry) in comparison.states.iter() {
        let (marker, label) = match entry.status {
            StateStatus::Added => ("+".green(), "added".green()),
            StateStatus::Deleted => ("-".red(), "deleted".red()),
            StateStatus::Changed => ("~".yellow(), "changed".yellow()),
            StateStatus::Unchanged => (" ".normal(), "unchanged".dimmed()),
        };
        writeln!(out, "  {} {:<10} {}", marker, label, entry_label(entry))?;
    }

    if !comparison.links.is_empty() {
        writeln!(out, "Links:")?;
        for link in &comparison.links {
            let marker = match link.status {
                LinkStatus::Added => "+".green(),
                LinkStatus::Deleted => "-".red(),
                LinkStatus::Unchanged => " ".normal(),
            };
            writeln!(
                out,
                "  {} {} -> {}",
                marker,
                state_name(comparison, link.source),
                state_name(comparison, link.target)
            )?;
        }
    }
    Ok(out)
}

fn entry_label(entry: &StateDiffEntry) -> String {
    if entry.is_renamed() {
        format!("{} -> {}", entry.original_name, entry.newest_name)
    } else {
        entry.newest_name.clone()
    }
}

fn state_name(comparison: &VersionComparison, id: StateId) -> String {
    comparison
        .states
        .get(id)
        .map(|entry| entry.newest_name.clone())
        .unwrap_or_else(|| id.to_string())
}
