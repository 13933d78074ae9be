//! `trellis snapshot generate|verify`: the persisted graph contract.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use trellis_core::contract::{
    CONTRACT_VERSION, DEFAULT_SNAPSHOT_FILE, EdgeType, MissingSnapshot, VerifyOutcome,
    VerifyReport, generate, verify_snapshot, write_snapshot,
};

use super::{Context, load_graph};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render, render_error};

#[derive(Subcommand, Debug)]
pub enum SnapshotCommand {
    #[command(
        about = "Write the snapshot artifact for the current graph",
        after_help = "EXAMPLES:\n    # Refresh the committed artifact\n    trellis snapshot generate\n\n    # Write somewhere else\n    trellis snapshot generate --out build/graph.json"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Compare the snapshot artifact with the live graph",
        long_about = "Rebuild the graph and diff it against the artifact. Exits 1 when the \
                      two diverge or when the artifact does not exist.",
        after_help = "EXAMPLES:\n    # Gate CI on an up-to-date artifact\n    trellis snapshot verify\n\n    # Inspect the diff as JSON\n    trellis snapshot verify --format json"
    )]
    Verify(VerifyArgs),
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Artifact path, relative to the working directory.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct VerifyArgs {
    /// Artifact to compare against, relative to the working directory.
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,
}

/// Summary printed after a successful `generate`.
#[derive(Debug, Serialize)]
struct Generated {
    path: String,
    contract_version: &'static str,
    generated: String,
    node_count: usize,
    edge_count: usize,
    structural: usize,
    semantic: usize,
    navigational: usize,
}

/// Execute a `trellis snapshot` subcommand.
pub fn run_snapshot(
    command: &SnapshotCommand,
    output: OutputMode,
    ctx: &Context,
) -> anyhow::Result<()> {
    match command {
        SnapshotCommand::Generate(args) => run_generate(args, output, ctx),
        SnapshotCommand::Verify(args) => run_verify(args, output, ctx),
    }
}

fn artifact_path(ctx: &Context, flag: Option<&PathBuf>) -> PathBuf {
    ctx.resolve(flag.map_or_else(|| Path::new(DEFAULT_SNAPSHOT_FILE), PathBuf::as_path))
}

fn run_generate(args: &GenerateArgs, output: OutputMode, ctx: &Context) -> anyhow::Result<()> {
    let path = artifact_path(ctx, args.out.as_ref());
    let (_corpus, graph) = load_graph(ctx, output)?;
    let snapshot = generate(&graph, &ctx.config.scan, Utc::now());

    if let Err(err) = write_snapshot(&path, &snapshot) {
        render_error(output, &CliError::from(&err))?;
        anyhow::bail!("snapshot generate: {err}");
    }

    let mut summary = Generated {
        path: path.display().to_string(),
        contract_version: CONTRACT_VERSION,
        generated: snapshot.generated.clone(),
        node_count: snapshot.node_count,
        edge_count: snapshot.edge_count,
        structural: 0,
        semantic: 0,
        navigational: 0,
    };
    for (kind, count) in snapshot.type_counts() {
        match kind {
            EdgeType::Structural => summary.structural = count,
            EdgeType::Semantic => summary.semantic = count,
            EdgeType::Navigational => summary.navigational = count,
        }
    }

    render(output, &summary, |s, w| {
        if output.is_pretty() {
            pretty_section(w, "Snapshot written")?;
            pretty_kv(w, "Path", &s.path)?;
            pretty_kv(w, "Contract", s.contract_version)?;
            pretty_kv(w, "Nodes", s.node_count.to_string())?;
            pretty_kv(w, "Edges", s.edge_count.to_string())?;
            pretty_kv(
                w,
                "By type",
                format!(
                    "structural {}, semantic {}, navigational {}",
                    s.structural, s.semantic, s.navigational
                ),
            )
        } else {
            writeln!(
                w,
                "OK   {} ({} nodes, {} edges)",
                s.path, s.node_count, s.edge_count
            )
        }
    })
}

fn run_verify(args: &VerifyArgs, output: OutputMode, ctx: &Context) -> anyhow::Result<()> {
    let path = artifact_path(ctx, args.snapshot.as_ref());
    let (_corpus, graph) = load_graph(ctx, output)?;

    let outcome = match verify_snapshot(&path, &graph) {
        Ok(outcome) => outcome,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            anyhow::bail!("snapshot verify: {err}");
        }
    };

    render(output, &outcome, |outcome, w| match outcome {
        VerifyOutcome::Report(report) => write_report(report, w),
        VerifyOutcome::NotFound(missing) => write_missing(missing, w),
    })?;

    match &outcome {
        VerifyOutcome::Report(report) if report.is_ok() => Ok(()),
        VerifyOutcome::Report(report) => {
            anyhow::bail!("snapshot verify: diverged ({})", report.divergence_count)
        }
        VerifyOutcome::NotFound(_) => anyhow::bail!("snapshot verify: artifact not found"),
    }
}

fn write_report(report: &VerifyReport, w: &mut dyn Write) -> std::io::Result<()> {
    let version = if report.version_match {
        format!("OK   contract {}", report.current_contract_version)
    } else {
        format!(
            "WARN contract {} (artifact {})",
            report.current_contract_version, report.snapshot_version
        )
    };
    writeln!(w, "{version}")?;
    writeln!(
        w,
        "     nodes {} / {} live, edges {} / {} live",
        report.snapshot_node_count,
        report.live_node_count,
        report.snapshot_edge_count,
        report.live_edge_count
    )?;

    for (label, items) in [
        ("stale node", &report.stale_nodes),
        ("missing node", &report.missing_nodes),
        ("stale edge", &report.stale_edges),
        ("missing edge", &report.missing_edges),
    ] {
        for item in items {
            writeln!(w, "FAIL {label} {item}")?;
        }
    }

    if report.is_ok() {
        writeln!(w, "verify: in sync")
    } else {
        writeln!(w, "verify: {} divergences", report.divergence_count)
    }
}

fn write_missing(missing: &MissingSnapshot, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "FAIL {} [{}]", missing.message, missing.error_code)?;
    if let Some(hint) = missing.hint {
        writeln!(w, "  hint: {hint}")?;
    }
    Ok(())
}
