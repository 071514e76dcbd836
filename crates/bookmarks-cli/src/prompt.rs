//! Interactive prompts

use anyhow::Result;
use std::io::{self, Write};

use crate::output::Output;

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

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(is_yes(&input))
}

/// Ask before deleting `what`
///
/// Only human output prompts; `--yes`, `--json` and `--quiet` go ahead.
/// Prints "Cancelled." when the user declines.
pub fn confirm_delete(output: &Output, yes: bool, what: &str) -> Result<bool> {
    if yes || !output.should_prompt() {
        return Ok(true);
    }

    println!("Delete {}", what);
    if confirm("Are you sure?")? {
        Ok(true)
    } else {
        output.message("Cancelled.");
        Ok(false)
    }
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}
