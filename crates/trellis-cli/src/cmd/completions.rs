//! `trellis completions`: shell completion scripts.

use std::io::{self, Write};

use clap::{Args, Command};
use clap_complete::{Shell, generate};

/// Arguments for `trellis completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to emit the script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Print the completion script for `args.shell` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
pub fn run_completions(args: &CompletionsArgs, command: &mut Command) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_completions(args.shell, command, &mut out)?;
    Ok(())
}

fn write_completions(shell: Shell, command: &mut Command, out: &mut dyn Write) -> io::Result<()> {
    generate(shell, command, "trellis", out);
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::CommandFactory;

    #[test]
    fn bash_script_covers_subcommands() {
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut Cli::command(), &mut buf).unwrap();
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("_trellis"));
        assert!(script.contains("snapshot"));
        assert!(script.contains("--rule"));
    }
}
