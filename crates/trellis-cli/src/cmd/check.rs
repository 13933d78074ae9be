//! `trellis check`: per-document link integrity rules.

use std::collections::BTreeMap;
use std::io::Write;

use clap::Args;
use trellis_core::check::{CheckReport, Rule, check_corpus};

use super::{Context, load_graph};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `trellis check`.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Report only these rules (repeatable).
    #[arg(long = "rule", value_name = "RULE", value_parser = parse_rule)]
    pub rules: Vec<Rule>,
}

fn parse_rule(raw: &str) -> Result<Rule, String> {
    [
        Rule::MissingLinksSection,
        Rule::Orphan,
        Rule::TooFewOutbound,
        Rule::DanglingLink,
        Rule::MalformedLink,
    ]
    .into_iter()
    .find(|rule| rule.as_str() == raw)
    .ok_or_else(|| format!("unknown rule `{raw}`"))
}

/// Execute `trellis check`. Fails when any reported violation remains.
pub fn run_check(args: &CheckArgs, output: OutputMode, ctx: &Context) -> anyhow::Result<()> {
    let (corpus, graph) = load_graph(ctx, output)?;
    let mut report = check_corpus(&corpus, &graph, &ctx.config.scan);

    if !args.rules.is_empty() {
        report.violations.retain(|v| args.rules.contains(&v.rule));
        report.violation_count = report.violations.len();
    }

    render_mode(output, &report, render_check_text, render_check_pretty)?;

    if !report.is_clean() {
        anyhow::bail!("check: {} violations", report.violation_count);
    }
    Ok(())
}

fn render_check_text(report: &CheckReport, w: &mut dyn Write) -> std::io::Result<()> {
    for v in &report.violations {
        writeln!(w, "{}  {}  {}", v.rule, v.path, v.message)?;
    }
    writeln!(
        w,
        "scanned {} isolated {} orphans {} violations {}",
        report.scanned, report.isolated, report.orphans, report.violation_count
    )
}

fn render_check_pretty(report: &CheckReport, w: &mut dyn Write) -> std::io::Result<()> {
    let mut by_path: BTreeMap<&str, Vec<(Rule, &str)>> = BTreeMap::new();
    for v in &report.violations {
        by_path
            .entry(v.path.as_str())
            .or_default()
            .push((v.rule, v.message.as_str()));
    }

    for (path, items) in &by_path {
        writeln!(w, "{path}")?;
        for (rule, message) in items {
            writeln!(w, "  {:<22} {message}", rule.as_str())?;
        }
    }
    if !by_path.is_empty() {
        writeln!(w)?;
    }

    pretty_section(w, "Integrity check")?;
    pretty_kv(w, "Scanned", report.scanned.to_string())?;
    pretty_kv(w, "Isolated", report.isolated.to_string())?;
    pretty_kv(w, "Orphans", report.orphans.to_string())?;
    pretty_kv(w, "Violations", report.violation_count.to_string())?;
    if report.is_clean() {
        writeln!(w, "All documents pass.")?;
    }
    Ok(())
}
