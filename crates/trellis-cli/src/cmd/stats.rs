//! `trellis stats`: topology and density report.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use clap::Args;
use tracing::info;
use trellis_metrics::{StatsReport, compute_stats};

use super::{Context, load_graph};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Hubs and redundant pairs listed in human output before truncating.
const HUMAN_LIST_LIMIT: usize = 10;

/// Arguments for `trellis stats`.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Also write the JSON report to this file.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Execute `trellis stats`.
pub fn run_stats(args: &StatsArgs, output: OutputMode, ctx: &Context) -> anyhow::Result<()> {
    let (_corpus, graph) = load_graph(ctx, output)?;
    let report = compute_stats(&graph.nodes, &graph.edges, &ctx.source_label, Utc::now());

    if let Some(out) = &args.out {
        let path = ctx.resolve(out);
        write_report(&path, &report)?;
        info!(path = %path.display(), "stats report written");
    }

    render_mode(output, &report, render_stats_text, render_stats_pretty)
}

fn write_report(path: &Path, report: &StatsReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut body = serde_json::to_string_pretty(report)?;
    body.push('\n');
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

fn render_stats_text(r: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "source {}", r.source)?;
    writeln!(w, "nodes {} edges {}", r.node_count, r.edge_count)?;
    writeln!(
        w,
        "degree avg_out {} avg_in {} avg_total {} mean {} stddev {} hub_threshold {}",
        r.avg_out_degree,
        r.avg_in_degree,
        r.avg_total_degree,
        r.degree_mean,
        r.degree_stddev,
        r.hub_threshold
    )?;
    writeln!(w, "clustering {}", r.clustering_coefficient)?;
    writeln!(
        w,
        "components weak {} strong {} largest_weak_pct {}",
        r.weak_component_count, r.strong_component_count, r.largest_weak_component_pct
    )?;
    for hub in &r.hubs {
        writeln!(w, "hub {} {} z={}", hub.slug, hub.degree, hub.z_score)?;
    }
    for leaf in &r.leaves {
        writeln!(w, "leaf {leaf}")?;
    }
    for pair in &r.redundant_neighborhoods {
        writeln!(
            w,
            "redundant {} {} {}",
            pair.source, pair.target, pair.similarity
        )?;
    }
    Ok(())
}

fn render_stats_pretty(r: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Link graph: {}", r.source))?;
    pretty_kv(w, "Nodes", r.node_count.to_string())?;
    pretty_kv(w, "Edges", r.edge_count.to_string())?;
    pretty_kv(w, "Generated", &r.timestamp)?;
    writeln!(w)?;

    pretty_section(w, "Degree")?;
    pretty_kv(w, "Avg out", r.avg_out_degree.to_string())?;
    pretty_kv(w, "Avg in", r.avg_in_degree.to_string())?;
    pretty_kv(w, "Avg total", r.avg_total_degree.to_string())?;
    pretty_kv(
        w,
        "Mean ± sd",
        format!("{} ± {}", r.degree_mean, r.degree_stddev),
    )?;
    pretty_kv(w, "Hub above", r.hub_threshold.to_string())?;
    writeln!(w)?;

    pretty_section(w, "Structure")?;
    pretty_kv(w, "Clustering", r.clustering_coefficient.to_string())?;
    pretty_kv(w, "Weak comps", r.weak_component_count.to_string())?;
    pretty_kv(w, "Strong comps", r.strong_component_count.to_string())?;
    pretty_kv(w, "Largest weak", format!("{}%", r.largest_weak_component_pct))?;
    pretty_kv(w, "Leaves", r.leaf_count.to_string())?;
    writeln!(w)?;

    pretty_section(w, &format!("Hubs ({})", r.hub_count))?;
    if r.hubs.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for hub in r.hubs.iter().take(HUMAN_LIST_LIMIT) {
        writeln!(
            w,
            "  {:<40} {:>4}  in {:>3}  out {:>3}  z {}",
            hub.slug, hub.degree, hub.in_degree, hub.out_degree, hub.z_score
        )?;
    }
    if r.hub_count > HUMAN_LIST_LIMIT {
        writeln!(w, "  … {} more", r.hub_count - HUMAN_LIST_LIMIT)?;
    }
    writeln!(w)?;

    pretty_section(
        w,
        &format!("Redundant neighborhoods ({})", r.redundant_neighborhood_count),
    )?;
    if r.redundant_neighborhoods.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for pair in r.redundant_neighborhoods.iter().take(HUMAN_LIST_LIMIT) {
        writeln!(
            w,
            "  {} ↔ {}  {} ({}/{})",
            pair.source, pair.target, pair.similarity, pair.shared, pair.union
        )?;
    }
    if r.redundant_neighborhood_count > HUMAN_LIST_LIMIT {
        writeln!(
            w,
            "  … {} more",
            r.redundant_neighborhood_count - HUMAN_LIST_LIMIT
        )?;
    }
    Ok(())
}
