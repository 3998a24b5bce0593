use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Line-oriented question/answer over any reader and writer.
///
/// Every `ask*` method returns `None` once input is exhausted, so callers can
/// treat a closed stdin as "quit".
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print a block of text followed by a newline.
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write output")
    }

    /// Prompt with a message and return the trimmed answer.
    pub fn ask(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush output")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt with a default value shown in brackets; empty input takes the default.
    pub fn ask_with_default(&mut self, message: &str, default: &str) -> Result<Option<String>> {
        let answer = self.ask(&format!("{} [{}]: ", message, default))?;
        Ok(answer.map(|a| if a.is_empty() { default.to_string() } else { a }))
    }

    /// Prompt with a yes/no question.
    pub fn ask_yes_no(&mut self, message: &str, default_yes: bool) -> Result<Option<bool>> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let answer = self.ask(&format!("{} [{}]: ", message, hint))?;
        Ok(answer.map(|a| {
            let a = a.to_lowercase();
            if a.is_empty() {
                default_yes
            } else {
                a == "y" || a == "yes"
            }
        }))
    }
}
