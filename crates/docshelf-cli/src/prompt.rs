//! Interactive prompts

use std::io::{self, BufRead, Write};

use anyhow::Result;

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    read_answer(io::stdin().lock())
}

fn read_answer(mut input: impl BufRead) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    let line = line.trim().to_lowercase();
    Ok(line == "y" || line == "yes")
}
