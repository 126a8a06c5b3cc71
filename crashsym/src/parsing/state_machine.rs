//! Crash report line parser
//!
//! A small state machine driven one line at a time. Each transition reports
//! whether it consumed the line; a section ends on the first line that does
//! not belong to it, and that same line is then fed to [`ParseState::Scanning`]
//! so it can open the next section.

use log::debug;

use super::patterns::{
    is_binary_images_header, match_backtrace_line, match_identifier_header,
    match_library_line, match_path_header, match_thread_header,
};
use crate::domain::{ReportModel, StackFrame, ThreadInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    /// Waiting for the `Path:` / `Identifier:` header lines
    #[default]
    ExpectProcessHeader,
    Scanning,
    InBacktrace,
    InLoadAddressTable,
}

/// Whether a transition used up the current line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDisposition {
    Consumed,
    /// Feed the same line again in the returned state
    Reprocess,
}

/// Apply one transition for `line` in `state`.
///
/// Returns the next state and whether the line was consumed. The model is
/// updated only for lines that are consumed.
pub fn step(state: ParseState, line: &str, model: &mut ReportModel) -> (ParseState, LineDisposition) {
    use self::LineDisposition::{Consumed, Reprocess};

    match state {
        ParseState::ExpectProcessHeader => {
            if let Some(name) = match_path_header(line) {
                model.process.name = name;
            } else if let Some(identifier) = match_identifier_header(line) {
                model.process.identifier = identifier.to_string();
                return (ParseState::Scanning, Consumed);
            }
            (ParseState::ExpectProcessHeader, Consumed)
        }
        ParseState::Scanning => {
            if let Some(header) = match_thread_header(line) {
                debug!("thread {} (crashed: {})", header.number, header.crashed);
                model.threads.push(ThreadInfo::new(header.number, header.name, header.crashed));
                (ParseState::InBacktrace, Consumed)
            } else if is_binary_images_header(line) {
                (ParseState::InLoadAddressTable, Consumed)
            } else {
                (ParseState::Scanning, Consumed)
            }
        }
        ParseState::InBacktrace => match (match_backtrace_line(line), model.current_thread_mut()) {
            (Some(bt), Some(thread)) => {
                thread.frames.push(StackFrame {
                    index: bt.index,
                    library: bt.library.to_string(),
                    address: bt.address.to_string(),
                });
                (ParseState::InBacktrace, Consumed)
            }
            _ => (ParseState::Scanning, Reprocess),
        },
        ParseState::InLoadAddressTable => match match_library_line(line) {
            Some(library) => {
                let name = library.name.clone();
                if !model.add_library(library) {
                    debug!("duplicate binary image entry for {name}, keeping the first");
                }
                (ParseState::InLoadAddressTable, Consumed)
            }
            None => (ParseState::Scanning, Reprocess),
        },
    }
}

/// Line-at-a-time parser that builds a [`ReportModel`]
#[derive(Debug, Default)]
pub struct LineParser {
    state: ParseState,
    model: ReportModel,
}

impl LineParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Feed one line, re-running transitions until it is consumed.
    ///
    /// Every reprocessing transition lands in `Scanning`, which always
    /// consumes, so this loops at most twice.
    pub fn feed(&mut self, line: &str) {
        loop {
            let (next, disposition) = step(self.state, line, &mut self.model);
            self.state = next;
            if disposition == LineDisposition::Consumed {
                break;
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> ReportModel {
        self.model
    }
}

/// Parse a complete crash report
#[must_use]
pub fn parse_report<'a, I>(lines: I) -> ReportModel
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parser = LineParser::new();
    for line in lines {
        parser.feed(line);
    }
    let model = parser.finish();
    debug!(
        "parsed report for {}: {} threads, {} frames, {} binary images",
        model.process.name,
        model.threads.len(),
        model.frame_count(),
        model.libraries.len()
    );
    model
}
