#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trellis_core::config::{load_project_config, load_user_config};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "trellis: wiki-link graph auditing for markdown knowledge bases",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Documents root, relative to the working directory.
    #[arg(long, global = true, default_value = "docs")]
    source: PathBuf,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Compute topology and density metrics",
        long_about = "Build the link graph and report degree statistics, hubs, leaves, \
                      clustering, component counts, and redundant neighborhoods.",
        after_help = "EXAMPLES:\n    # Print the report for ./docs\n    trellis stats\n\n    # Analyze another root and keep the JSON\n    trellis stats --source notes --out stats.json\n\n    # Machine-readable output\n    trellis stats --format json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Contract",
        about = "Generate or verify the graph snapshot artifact"
    )]
    Snapshot {
        #[command(subcommand)]
        command: cmd::snapshot::SnapshotCommand,
    },

    #[command(
        next_help_heading = "Analysis",
        about = "Check documents against link-integrity rules",
        long_about = "Report documents without a links section, orphans, documents with too \
                      few outbound links, dangling links, and malformed link syntax.",
        after_help = "EXAMPLES:\n    # Check ./docs and fail on violations\n    trellis check\n\n    # Feed violations to another tool\n    trellis check --format json"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    trellis completions bash > ~/.local/share/bash-completion/completions/trellis\n\n    # Zsh\n    trellis completions zsh > ~/.zfunc/_trellis"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "trellis=debug,info"
        } else {
            "trellis=info,warn"
        })
    });

    let format = env::var("TRELLIS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output only
    match format.as_str() {
        "json" => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(args) = &cli.command {
        return cmd::completions::run_completions(args, &mut Cli::command());
    }

    let project_root = env::current_dir()?;

    let user_output = match load_user_config() {
        Ok(user) => user.output,
        Err(err) => {
            warn!("ignoring user config: {err:#}");
            None
        }
    };
    let early_output = resolve_output_mode(cli.format, cli.json, user_output.as_deref());

    let config = match load_project_config(&project_root) {
        Ok(config) => config,
        Err(err) => {
            render_error(early_output, &CliError::from(&err))?;
            anyhow::bail!("configuration: {err}");
        }
    };
    let configured = config.output.format.as_deref().or(user_output.as_deref());
    let output = resolve_output_mode(cli.format, cli.json, configured);
    debug!(?output, root = %project_root.display(), "resolved output mode");

    let ctx = cmd::Context {
        source: project_root.join(&cli.source),
        source_label: cli.source.display().to_string(),
        project_root,
        config,
    };

    match cli.command {
        Commands::Stats(ref args) => cmd::stats::run_stats(args, output, &ctx),
        Commands::Snapshot { ref command } => cmd::snapshot::run_snapshot(command, output, &ctx),
        Commands::Check(ref args) => cmd::check::run_check(args, output, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}
