//! Compiled line patterns for macOS crash reports
//!
//! Every matcher works on a single line and has no notion of parser state, so
//! the renderer can reuse [`match_backtrace_line`] for its stateless re-scan.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::domain::LibraryInfo;

/// Literal that opens the loaded-binaries table
pub const BINARY_IMAGES_MARKER: &str = "Binary Images:";

/// The only architecture accepted in the binary images table
pub const SUPPORTED_ARCH: &str = "x86_64";

static PATH_HEADER: OnceLock<Regex> = OnceLock::new();
static IDENTIFIER_HEADER: OnceLock<Regex> = OnceLock::new();
static THREAD_HEADER: OnceLock<Regex> = OnceLock::new();
static BACKTRACE_LINE: OnceLock<Regex> = OnceLock::new();
static LIBRARY_LINE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("crash report pattern must compile"))
}

/// Thread section header, e.g. `Thread 0 Crashed:: Dispatch queue: com.apple.main-thread`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadHeader {
    pub number: u32,
    pub crashed: bool,
    pub name: Option<String>,
}

/// A backtrace line, e.g. `3   MyLib   0x0000000100001500 foo + 12`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktraceLine<'a> {
    pub index: u32,
    pub library: &'a str,
    pub address: &'a str,
}

/// `Path:` header → process display name (basename of the path)
#[must_use]
pub fn match_path_header(line: &str) -> Option<String> {
    let caps = compiled(&PATH_HEADER, r"^Path:\s+(.+?)\s*$").captures(line)?;
    let raw = caps.get(1)?.as_str();
    Some(display_name(raw))
}

/// `Identifier:` header → bundle identifier
#[must_use]
pub fn match_identifier_header(line: &str) -> Option<&str> {
    let caps = compiled(&IDENTIFIER_HEADER, r"^Identifier:\s+(.+?)\s*$").captures(line)?;
    caps.get(1).map(|m| m.as_str())
}

#[must_use]
pub fn match_thread_header(line: &str) -> Option<ThreadHeader> {
    let caps = compiled(&THREAD_HEADER, r"^Thread\s+(\d+)(\s+Crashed)?:(?::\s*(.*?))?\s*$")
        .captures(line)?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    let name = caps.get(3).map(|m| m.as_str().to_string()).filter(|n| !n.is_empty());
    Some(ThreadHeader { number, crashed: caps.get(2).is_some(), name })
}

#[must_use]
pub fn match_backtrace_line(line: &str) -> Option<BacktraceLine<'_>> {
    let caps = compiled(&BACKTRACE_LINE, r"^(\d+)\s+(.+?)\s+(0x[0-9a-fA-F]+)(?:\s|$)")
        .captures(line)?;
    Some(BacktraceLine {
        index: caps.get(1)?.as_str().parse().ok()?,
        library: caps.get(2)?.as_str(),
        address: caps.get(3)?.as_str(),
    })
}

#[must_use]
pub fn is_binary_images_header(line: &str) -> bool {
    line.contains(BINARY_IMAGES_MARKER)
}

/// Binary images entry for the supported architecture
///
/// `0x1000 - 0x2000 +MyLib x86_64 (1.0) <abcd1234> /path/MyLib`
#[must_use]
pub fn match_library_line(line: &str) -> Option<LibraryInfo> {
    let re = compiled(
        &LIBRARY_LINE,
        r"^\s*(0x[0-9a-fA-F]+)\s+-\s+(0x[0-9a-fA-F]+)\s+\+?(.+?)\s+x86_64\s+(?:\((.*?)\)\s+)?<([0-9a-fA-F-]+)>\s+(.+?)\s*$",
    );
    let caps = re.captures(line)?;
    Some(LibraryInfo {
        start: caps.get(1)?.as_str().to_string(),
        end: caps.get(2)?.as_str().to_string(),
        name: caps.get(3)?.as_str().to_string(),
        version: caps.get(4).map_or_else(String::new, |m| m.as_str().to_string()),
        uuid: caps.get(5)?.as_str().to_string(),
        path: caps.get(6)?.as_str().to_string(),
    })
}

/// Basename of a path as it appears in the report, tolerating trailing slashes
fn display_name(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| raw.to_string(), str::to_string)
}
