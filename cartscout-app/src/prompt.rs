use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};

pub const PROMPT: &str = "Enter query: ";

/// Ask for a search query on `output` and read one line from `input`.
pub fn read_query(mut input: impl BufRead, mut output: impl Write) -> Result<String> {
    output.write_all(PROMPT.as_bytes()).context("failed to write prompt")?;
    output.flush().context("failed to flush prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).context("failed to read query")?;
    let query = line.trim();
    if query.is_empty() {
        bail!("a search query is required");
    }
    Ok(query.to_string())
}
