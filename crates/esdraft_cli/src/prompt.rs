//! Terminal input for the host.
//!
//! `TerminalPrompt` drives an attended terminal through `dialoguer`;
//! `ScriptedPrompt` reads piped or scripted input line by line.

use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use std::io::{self, BufRead, IsTerminal, Write};

/// Terminates a multi-line block.
pub const BLOCK_TERMINATOR: &str = ".";

/// Input surface used by the commands and the session.
pub trait Prompt {
    /// Reads one line after showing `label`. `None` at end of input.
    fn line<W: Write>(&mut self, out: &mut W, label: &str) -> io::Result<Option<String>>;

    /// Asks a yes/no question; anything but an explicit yes is "no".
    fn confirm<W: Write>(&mut self, out: &mut W, question: &str) -> bool;

    /// Reads lines until a lone `.` or end of input and joins them with `\n`.
    fn block<W: Write>(&mut self, out: &mut W) -> io::Result<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.line(out, "")? {
            if line == BLOCK_TERMINATOR {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }
}

/// True when both stdin and the prompt output (stderr) are terminals.
pub fn stdin_is_attended() -> bool {
    io::stdin().is_terminal() && Term::stderr().is_term()
}

pub struct TerminalPrompt {
    theme: ColorfulTheme,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn line<W: Write>(&mut self, out: &mut W, label: &str) -> io::Result<Option<String>> {
        out.flush()?;
        let input = Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty(true);
        match input.interact_text() {
            Ok(value) => Ok(Some(value)),
            Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Ok(None)
            }
            Err(dialoguer::Error::IO(err)) => Err(err),
        }
    }

    fn confirm<W: Write>(&mut self, out: &mut W, question: &str) -> bool {
        if out.flush().is_err() {
            return false;
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Line reader over any `BufRead`; prompts are echoed to the output.
pub struct ScriptedPrompt<R> {
    input: R,
}

impl<R: BufRead> ScriptedPrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Prompt for ScriptedPrompt<R> {
    fn line<W: Write>(&mut self, out: &mut W, label: &str) -> io::Result<Option<String>> {
        if !label.is_empty() {
            write!(out, "{label} ")?;
            out.flush()?;
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn confirm<W: Write>(&mut self, out: &mut W, question: &str) -> bool {
        match self.line(out, &format!("{question} [y/N]")) {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}
