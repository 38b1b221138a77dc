//! User interaction operations (confirmation and selection prompts).

use anyhow::Result;

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Core, testable implementation that reads from any BufRead and writes to any Write.
/// This is intentionally free-standing so tests can exercise it without needing a RealRuntime.
pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let response = line.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

/// Numbered picker over a list of options. Empty input declines the selection.
/// Out-of-range or non-numeric input is re-prompted until valid or declined.
pub(crate) fn select_with_io<R: BufRead, W: Write>(
    prompt: &str,
    options: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<Option<usize>> {
    if options.is_empty() {
        return Ok(None);
    }

    writeln!(output, "{}", prompt)?;
    for (i, option) in options.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, option)?;
    }

    loop {
        write!(output, "Selection (1-{}, empty to cancel): ", options.len())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None); // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match trimmed.parse::<usize>() {
            Ok(n) if n >= 1 && n <= options.len() => return Ok(Some(n - 1)),
            _ => writeln!(output, "Invalid selection: {}", trimmed)?,
        }
    }
}

impl RealRuntime {
    pub(crate) fn confirm_impl(&self, prompt: &str) -> Result<bool> {
        // Wire the generic implementation to real stdin/stdout.
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        confirm_with_io(prompt, &mut stdin_lock, &mut stdout)
    }

    pub(crate) fn select_impl(&self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        select_with_io(prompt, options, &mut stdin_lock, &mut stdout)
    }
}
