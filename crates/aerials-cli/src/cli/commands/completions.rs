//! `aerials completions <shell>` – shell completion script on stdout.
//!
//! ```bash
//! eval "$(aerials completions bash)"
//! aerials completions fish > ~/.config/fish/completions/aerials.fish
//! ```

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

pub fn run_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "aerials", &mut io::stdout());
    Ok(())
}
