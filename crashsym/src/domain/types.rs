//! Report model types
//!
//! Passive data holders populated by the line parser and consumed by the
//! resolver and exporter. Addresses stay as the exact strings found in the
//! report so they can be matched back against resolver output and rendered
//! lines without any reformatting.

use serde::Serialize;
use std::collections::HashMap;

/// Process information taken from the report header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    /// Display name (basename of the `Path:` header)
    pub name: String,
    /// Bundle identifier (`Identifier:` header)
    pub identifier: String,
}

/// One frame of a thread backtrace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    pub index: u32,
    pub library: String,
    pub address: String,
}

/// A thread section of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadInfo {
    pub number: u32,
    pub name: Option<String>,
    pub crashed: bool,
    pub frames: Vec<StackFrame>,
}

impl ThreadInfo {
    #[must_use]
    pub fn new(number: u32, name: Option<String>, crashed: bool) -> Self {
        Self { number, name, crashed, frames: Vec::new() }
    }
}

/// An entry of the `Binary Images:` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryInfo {
    pub start: String,
    pub end: String,
    pub name: String,
    pub version: String,
    pub uuid: String,
    pub path: String,
}

/// Everything the parser extracted from one crash report
///
/// `libraries` keeps every table entry in report order; the name lookup only
/// holds the first entry seen for each name.
#[derive(Debug, Default, Serialize)]
pub struct ReportModel {
    pub process: ProcessInfo,
    pub threads: Vec<ThreadInfo>,
    pub libraries: Vec<LibraryInfo>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl ReportModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a library table entry.
    ///
    /// Returns `false` if an entry with the same name was already indexed; the
    /// new entry is still kept in the ordered list.
    pub fn add_library(&mut self, library: LibraryInfo) -> bool {
        let idx = self.libraries.len();
        let name = library.name.clone();
        self.libraries.push(library);
        if self.by_name.contains_key(&name) {
            return false;
        }
        self.by_name.insert(name, idx);
        true
    }

    /// Look up the first library table entry with the given name
    #[must_use]
    pub fn library(&self, name: &str) -> Option<&LibraryInfo> {
        self.by_name.get(name).map(|&idx| &self.libraries[idx])
    }

    /// The thread currently receiving backtrace frames
    pub fn current_thread_mut(&mut self) -> Option<&mut ThreadInfo> {
        self.threads.last_mut()
    }

    /// The thread flagged as crashed, if any
    #[must_use]
    pub fn crashed_thread(&self) -> Option<&ThreadInfo> {
        self.threads.iter().find(|t| t.crashed)
    }

    /// Total number of frames across all threads
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.threads.iter().map(|t| t.frames.len()).sum()
    }
}

/// Resolved address → symbol text
///
/// Built once by the resolver and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolMap {
    entries: HashMap<String, String>,
}

impl SymbolMap {
    #[must_use]
    pub fn get(&self, address: &str) -> Option<&str> {
        self.entries.get(address).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for SymbolMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(name: &str, start: &str) -> LibraryInfo {
        LibraryInfo {
            start: start.to_string(),
            end: "0xffff".to_string(),
            name: name.to_string(),
            version: "1.0".to_string(),
            uuid: "abcd".to_string(),
            path: format!("/usr/lib/{name}"),
        }
    }

    #[test]
    fn test_duplicate_library_keeps_first_in_lookup() {
        let mut model = ReportModel::new();
        assert!(model.add_library(lib("libfoo.dylib", "0x1000")));
        assert!(!model.add_library(lib("libfoo.dylib", "0x9000")));

        assert_eq!(model.libraries.len(), 2);
        assert_eq!(model.library("libfoo.dylib").unwrap().start, "0x1000");
        assert!(model.library("libbar.dylib").is_none());
    }

    #[test]
    fn test_crashed_thread_and_frame_count() {
        let mut model = ReportModel::new();
        model.threads.push(ThreadInfo::new(0, None, false));
        let mut crashed = ThreadInfo::new(1, Some("worker".to_string()), true);
        crashed.frames.push(StackFrame {
            index: 0,
            library: "MyApp".to_string(),
            address: "0x10".to_string(),
        });
        model.threads.push(crashed);

        assert_eq!(model.crashed_thread().unwrap().number, 1);
        assert_eq!(model.frame_count(), 1);
    }

    #[test]
    fn test_symbol_map_lookup() {
        let map: SymbolMap =
            [("0x1500".to_string(), "foo()".to_string())].into_iter().collect();
        assert_eq!(map.get("0x1500"), Some("foo()"));
        assert_eq!(map.get("0x1501"), None);
        assert_eq!(map.len(), 1);
    }
}
