//! Report rendering
//!
//! Re-walks the original report text and swaps resolved backtrace lines for
//! annotated ones. Every line is checked on its own, independent of which
//! section it sits in, and the output has exactly one line per input line.

use crate::domain::SymbolMap;
use crate::parsing::match_backtrace_line;

/// Render a single report line
#[must_use]
pub fn render_line(line: &str, symbols: &SymbolMap) -> String {
    match match_backtrace_line(line) {
        Some(bt) => match symbols.get(bt.address) {
            Some(symbol) => format!("{} - {} - {} - {}", bt.index, bt.library, bt.address, symbol),
            None => line.trim_end().to_string(),
        },
        None => line.trim_end().to_string(),
    }
}

/// Render every line of a report
#[must_use]
pub fn render_report<'a, I>(lines: I, symbols: &SymbolMap) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().map(|line| render_line(line, symbols)).collect()
}
