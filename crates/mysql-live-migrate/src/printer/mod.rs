//! Progress reporting for the copy loop.
//!
//! Reporters are purely observational: they consume per-chunk completion
//! events and render them, and are never relied on for correctness. Output
//! is best-effort; write failures are swallowed rather than surfaced into
//! the copy loop.

use std::io::{self, Write};

/// Consumes per-chunk completion events from the copy engine.
pub trait Printer: Send {
    /// Called once per completed chunk with the chunk bounds, the overall
    /// upper bound, and the number of rows the chunk changed.
    fn notify_detailed(&mut self, bottom: i64, top: i64, limit: i64, affected: u64);

    /// Called once, after the loop terminates normally.
    fn end(&mut self);
}

/// In-place percentage renderer.
///
/// Redraws a single line per chunk, padding with spaces to blank out any
/// longer previous line.
pub struct PercentagePrinter<W: Write + Send = io::Stdout> {
    out: W,
    max_length: usize,
}

impl PercentagePrinter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for PercentagePrinter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PercentagePrinter<W> {
    /// Render to an arbitrary writer instead of stdout.
    pub fn with_output(out: W) -> Self {
        Self { out, max_length: 0 }
    }

    fn write_line(&mut self, message: &str) {
        let extra = self.max_length.saturating_sub(message.len());
        if message.len() > self.max_length {
            self.max_length = message.len();
        }
        let _ = write!(self.out, "\r{}{}", message, " ".repeat(extra));
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> Printer for PercentagePrinter<W> {
    fn notify_detailed(&mut self, bottom: i64, top: i64, limit: i64, affected: u64) {
        if top == 0 {
            return;
        }
        let message = format!(
            "{:.2}% (from {} to {}) completed, {} ids left up to {}, affected rows: {}",
            bottom as f64 / top as f64 * 100.0,
            bottom,
            top,
            limit - top,
            limit,
            affected
        );
        self.write_line(&message);
    }

    fn end(&mut self) {
        self.write_line("100% complete");
        let _ = writeln!(self.out);
    }
}

/// Minimal renderer: one mark per chunk.
pub struct DotPrinter<W: Write + Send = io::Stdout> {
    out: W,
}

impl DotPrinter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for DotPrinter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> DotPrinter<W> {
    pub fn with_output(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Printer for DotPrinter<W> {
    fn notify_detailed(&mut self, _bottom: i64, _top: i64, _limit: i64, _affected: u64) {
        let _ = write!(self.out, ".");
        let _ = self.out.flush();
    }

    fn end(&mut self) {
        let _ = writeln!(self.out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(printer: PercentagePrinter<Vec<u8>>) -> String {
        String::from_utf8(printer.out).unwrap()
    }

    #[test]
    fn test_percentage_renders_chunk_line() {
        let mut printer = PercentagePrinter::with_output(Vec::new());
        printer.notify_detailed(1, 10, 23, 10);
        let out = rendered(printer);
        assert_eq!(
            out,
            "\r10.00% (from 1 to 10) completed, 13 ids left up to 23, affected rows: 10"
        );
    }

    #[test]
    fn test_percentage_ignores_zero_top() {
        let mut printer = PercentagePrinter::with_output(Vec::new());
        printer.notify_detailed(0, 0, 0, 0);
        assert!(rendered(printer).is_empty());
    }

    #[test]
    fn test_percentage_pads_shorter_redraw() {
        let mut printer = PercentagePrinter::with_output(Vec::new());
        printer.notify_detailed(100_000, 1_000_000, 9_000_000, 40_000);
        printer.notify_detailed(11, 20, 23, 9);
        let out = rendered(printer);
        let second = out.rsplit('\r').next().unwrap();
        // shorter line is padded out to the longest one seen
        assert!(second.ends_with(' '));
        assert_eq!(second.len(), out.split('\r').nth(1).unwrap().len());
    }

    #[test]
    fn test_percentage_end_marks_completion() {
        let mut printer = PercentagePrinter::with_output(Vec::new());
        printer.notify_detailed(21, 23, 23, 3);
        printer.end();
        let out = rendered(printer);
        assert!(out.contains("100% complete"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_dot_prints_one_mark_per_chunk() {
        let mut printer = DotPrinter::with_output(Vec::new());
        printer.notify_detailed(1, 10, 23, 10);
        printer.notify_detailed(11, 20, 23, 10);
        printer.end();
        assert_eq!(String::from_utf8(printer.out).unwrap(), "..\n");
    }
}
