//! Command-line argument parsing.

use clap::Parser;

/// Parsed invocation shape: file vs. REPL, plus the initial error language.
#[derive(Debug, Parser)]
#[command(name = "latin", about = "Interpreter for LATIN, a Latin-inspired imperative language")]
pub struct Cli {
    /// Source file to run. Omitted (and `--repl` not given) starts the REPL.
    pub file: Option<String>,

    /// Force interactive mode even if a file is also given.
    #[arg(long)]
    pub repl: bool,

    /// Render error and diagnostic messages in English instead of Latin.
    #[arg(long)]
    pub english: bool,
}

impl Cli {
    /// Whether this invocation should start the REPL rather than run a file.
    pub fn wants_repl(&self) -> bool {
        self.repl || self.file.is_none()
    }
}
