pub mod check;
pub mod completions;
pub mod snapshot;
pub mod stats;

use std::path::{Path, PathBuf};

use trellis_core::config::ProjectConfig;
use trellis_core::corpus::{Corpus, load_corpus};
use trellis_core::graph::LinkGraph;

use crate::output::{CliError, OutputMode, render_error};

/// Resolved invocation state shared by the corpus-reading commands.
#[derive(Debug)]
pub struct Context {
    pub project_root: PathBuf,
    /// Documents root joined onto the project root.
    pub source: PathBuf,
    /// Documents root as the user typed it; echoed in reports.
    pub source_label: String,
    pub config: ProjectConfig,
}

impl Context {
    /// Resolve a user-supplied path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.project_root.join(path)
    }
}

/// Load the corpus and build its link graph, rendering load errors.
pub fn load_graph(ctx: &Context, output: OutputMode) -> anyhow::Result<(Corpus, LinkGraph)> {
    let corpus = match load_corpus(&ctx.source, &ctx.config.scan) {
        Ok(corpus) => corpus,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            anyhow::bail!("load: {err}");
        }
    };
    let graph = LinkGraph::build(&corpus);
    Ok((corpus, graph))
}
