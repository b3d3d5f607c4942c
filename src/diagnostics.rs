//! The Diagnostic Sink: accumulates one line per error, counts them, and
//! formats them as "`<line>: <message>`" with a location, or bare
//! `<message>` without one.

use crate::stream::Position;
use std::fmt;

/// Collects diagnostics emitted over the course of one semantic-analysis
/// pass. Never aborts early — every call site keeps going after reporting.
#[derive(Debug, Default)]
pub struct Diagnostics {
    lines: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { lines: Vec::new() }
    }

    /// Report an error tied to a source position.
    pub fn error_at(&mut self, pos: Position, message: impl fmt::Display) {
        log::debug!("semantic error at {}: {}", pos, message);
        self.lines.push(format!("{}: {}", pos.line, message));
    }

    /// Report an error with no associated source position (missing `main`,
    /// the halt banner).
    pub fn error(&mut self, message: impl fmt::Display) {
        log::debug!("semantic error (no location): {}", message);
        self.lines.push(message.to_string());
    }

    pub fn count(&self) -> usize {
        self.lines.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Write every accumulated diagnostic, one per line, to `out`.
    pub fn write_to(&self, mut out: impl std::io::Write) -> std::io::Result<()> {
        for line in &self.lines {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_is_monotonic() {
        let mut diags = Diagnostics::new();
        assert_eq!(diags.count(), 0);
        diags.error_at(Position::new(), "first");
        assert_eq!(diags.count(), 1);
        diags.error("second");
        assert_eq!(diags.count(), 2);
    }

    #[test]
    fn located_errors_carry_line_prefix() {
        let mut diags = Diagnostics::new();
        diags.error_at(Position { line: 12, column: 3 }, "bad thing");
        assert_eq!(diags.lines()[0], "12: bad thing");
    }

    #[test]
    fn unlocated_errors_have_no_prefix() {
        let mut diags = Diagnostics::new();
        diags.error("Main function has not been defined");
        assert_eq!(diags.lines()[0], "Main function has not been defined");
    }
}
