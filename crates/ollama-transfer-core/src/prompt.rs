//! Overwrite confirmation.
//!
//! Exporter and importer ask before replacing an existing file. The question
//! is routed through [`ConfirmOverwrite`] so callers decide how it is
//! answered: interactively on a console, or with a fixed answer.

use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

/// Decides whether an existing file may be overwritten.
pub trait ConfirmOverwrite {
    /// Return `true` to overwrite `path`, `false` to abort the operation.
    fn confirm(&mut self, path: &Path) -> bool;
}

/// Interpret a console answer. Only `y` (any case, surrounding whitespace
/// ignored) confirms.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Asks on a line-oriented console.
///
/// End of input and read errors count as "no".
pub struct ConsolePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConfirmOverwrite for ConsolePrompt<R, W> {
    fn confirm(&mut self, path: &Path) -> bool {
        if let Err(e) = write!(
            self.writer,
            "File '{}' already exists. Overwrite? (y/N): ",
            path.display()
        ) {
            debug!("Failed to write prompt: {}", e);
        }
        if let Err(e) = self.writer.flush() {
            debug!("Failed to flush prompt: {}", e);
        }

        let mut answer = String::new();
        match self.reader.read_line(&mut answer) {
            Ok(0) => {
                debug!("No answer on input, treating as decline");
                false
            }
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                debug!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

/// Answers every prompt the same way without asking.
#[derive(Debug, Clone, Copy)]
pub struct AssumeAnswer(pub bool);

impl ConfirmOverwrite for AssumeAnswer {
    fn confirm(&mut self, path: &Path) -> bool {
        debug!(
            "Overwrite of {} {} without prompting",
            path.display(),
            if self.0 { "accepted" } else { "declined" }
        );
        self.0
    }
}
