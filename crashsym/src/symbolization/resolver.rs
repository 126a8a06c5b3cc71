//! Address → symbol resolution across libraries
//!
//! Frames are grouped by library, each library with a known symbol artifact
//! and load address is sent to an [`AddressResolver`] once, and the results are
//! merged into a single [`SymbolMap`].

use crossbeam_channel::unbounded;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use super::artifact::SymbolPaths;
use super::demangle::demangle_resolver_line;
use crate::domain::{ReportModel, ResolveError, SymbolMap};

/// One resolver call: every distinct address seen for one library
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub library: &'a str,
    pub artifact: &'a Path,
    /// Runtime load address of the library, used as the load bias
    pub load_address: &'a str,
    pub addresses: &'a [String],
}

/// Translates a batch of addresses for one library.
///
/// Implementations return one line per requested address, in request order.
pub trait AddressResolver: Sync {
    /// # Errors
    /// Returns an error if the underlying tool cannot be run or fails.
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Vec<String>, ResolveError>;
}

/// Resolution settings taken from the command line
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Number of libraries resolved concurrently (at least 1)
    pub jobs: usize,
    /// Log and skip failing libraries instead of aborting
    pub keep_going: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { jobs: 1, keep_going: false }
    }
}

/// What happened to each library during resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: Vec<String>,
    /// Libraries with frames but no symbol artifact or load address
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    pub addresses: usize,
}

/// Distinct frame addresses per library, across all threads
#[must_use]
pub fn group_addresses(model: &ReportModel) -> BTreeMap<String, BTreeSet<String>> {
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for frame in model.threads.iter().flat_map(|t| &t.frames) {
        grouped.entry(frame.library.clone()).or_default().insert(frame.address.clone());
    }
    grouped
}

/// A library that is ready to be sent to the resolver
#[derive(Debug)]
struct Job<'a> {
    library: String,
    artifact: &'a Path,
    load_address: &'a str,
    addresses: Vec<String>,
}

type JobResult = (String, Result<Vec<(String, String)>, ResolveError>);

/// Resolve all addresses of one library.
///
/// An empty address list never reaches the resolver.
///
/// # Errors
/// Propagates resolver failures, and returns [`ResolveError::OutputMismatch`]
/// when the resolver does not produce exactly one line per address.
pub fn resolve_library<R: AddressResolver + ?Sized>(
    resolver: &R,
    request: &ResolveRequest<'_>,
) -> Result<Vec<(String, String)>, ResolveError> {
    if request.addresses.is_empty() {
        return Ok(Vec::new());
    }

    let lines = resolver.resolve(request)?;
    if lines.len() != request.addresses.len() {
        return Err(ResolveError::OutputMismatch {
            library: request.library.to_string(),
            expected: request.addresses.len(),
            actual: lines.len(),
        });
    }

    Ok(request
        .addresses
        .iter()
        .zip(lines)
        .map(|(address, line)| (address.clone(), demangle_resolver_line(&line)))
        .collect())
}

/// Drives an [`AddressResolver`] over a whole report
pub struct SymbolResolver<'a, R: AddressResolver + ?Sized> {
    resolver: &'a R,
    options: ResolveOptions,
}

impl<'a, R: AddressResolver + ?Sized> SymbolResolver<'a, R> {
    pub fn new(resolver: &'a R, options: ResolveOptions) -> Self {
        Self { resolver, options }
    }

    /// Build the symbol map for every frame whose library has an artifact.
    ///
    /// # Errors
    /// Without `keep_going`, the first failing library (in name order) aborts
    /// the whole resolution.
    pub fn resolve(
        &self,
        model: &ReportModel,
        paths: &SymbolPaths,
    ) -> Result<(SymbolMap, ResolveSummary), ResolveError> {
        let mut summary = ResolveSummary::default();
        let mut jobs = Vec::new();

        for (library, addresses) in group_addresses(model) {
            let Some(artifact) = paths.get(&library) else {
                debug!("no symbol file for {library}, leaving {} frames as-is", addresses.len());
                summary.skipped.push(library);
                continue;
            };
            let Some(info) = model.library(&library) else {
                warn!("{library} has a symbol file but no entry in Binary Images, skipping");
                summary.skipped.push(library);
                continue;
            };
            jobs.push(Job {
                artifact,
                load_address: info.start.as_str(),
                addresses: addresses.into_iter().collect(),
                library,
            });
        }

        let mut results = if self.options.jobs > 1 && jobs.len() > 1 {
            self.run_parallel(jobs)
        } else {
            self.run_sequential(&jobs)
        };
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut entries = Vec::new();
        for (library, result) in results {
            match result {
                Ok(pairs) => {
                    summary.addresses += pairs.len();
                    summary.resolved.push(library);
                    entries.extend(pairs);
                }
                Err(e) if self.options.keep_going => {
                    warn!("skipping {library}: {e}");
                    summary.failed.push(library);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "resolved {} addresses in {} libraries ({} skipped, {} failed)",
            summary.addresses,
            summary.resolved.len(),
            summary.skipped.len(),
            summary.failed.len()
        );

        Ok((entries.into_iter().collect(), summary))
    }

    fn run_job(&self, job: &Job<'_>) -> JobResult {
        let request = ResolveRequest {
            library: &job.library,
            artifact: job.artifact,
            load_address: job.load_address,
            addresses: &job.addresses,
        };
        (job.library.clone(), resolve_library(self.resolver, &request))
    }

    /// Stops at the first failure unless `keep_going` is set
    fn run_sequential(&self, jobs: &[Job<'_>]) -> Vec<JobResult> {
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            let result = self.run_job(job);
            let failed = result.1.is_err();
            results.push(result);
            if failed && !self.options.keep_going {
                break;
            }
        }
        results
    }

    fn run_parallel(&self, jobs: Vec<Job<'_>>) -> Vec<JobResult> {
        let workers = self.options.jobs.min(jobs.len());
        let (job_tx, job_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();

        for job in jobs {
            // Receiver is alive until the scope below ends
            job_tx.send(job).ok();
        }
        drop(job_tx);

        // Set on the first failure; queued jobs are then left unstarted
        let aborted = AtomicBool::new(false);
        let aborted = &aborted;

        debug!("resolving on {workers} worker threads");
        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for job in job_rx {
                        if aborted.load(Ordering::SeqCst) {
                            break;
                        }
                        let result = self.run_job(&job);
                        if result.1.is_err() && !self.options.keep_going {
                            aborted.store(true, Ordering::SeqCst);
                        }
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        result_rx.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LibraryInfo, StackFrame, ThreadInfo};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Resolver that echoes `sym@<address>` and records every call
    #[derive(Default)]
    struct EchoResolver {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String, String)>>,
        fail_for: Option<&'static str>,
        drop_last_line: bool,
        delay: Option<Duration>,
    }

    impl AddressResolver for EchoResolver {
        fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Vec<String>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((
                request.library.to_string(),
                request.artifact.display().to_string(),
                request.load_address.to_string(),
            ));
            if self.fail_for == Some(request.library) {
                return Err(ResolveError::Failed {
                    library: request.library.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "boom".to_string(),
                });
            }
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            let mut lines: Vec<String> =
                request.addresses.iter().map(|a| format!("sym@{a}")).collect();
            if self.drop_last_line {
                lines.pop();
            }
            Ok(lines)
        }
    }

    fn library(name: &str, start: &str) -> LibraryInfo {
        LibraryInfo {
            start: start.to_string(),
            end: "0xffffff".to_string(),
            name: name.to_string(),
            version: "1.0".to_string(),
            uuid: "abcd".to_string(),
            path: format!("/path/{name}"),
        }
    }

    fn frame(index: u32, library: &str, address: &str) -> StackFrame {
        StackFrame { index, library: library.to_string(), address: address.to_string() }
    }

    fn sample_model() -> ReportModel {
        let mut model = ReportModel::new();
        let mut t0 = ThreadInfo::new(0, None, true);
        t0.frames.push(frame(0, "MyApp", "0x1500"));
        t0.frames.push(frame(1, "MyLib", "0x2500"));
        t0.frames.push(frame(2, "libsystem_c.dylib", "0x9000"));
        let mut t1 = ThreadInfo::new(1, None, false);
        t1.frames.push(frame(0, "MyApp", "0x1500"));
        t1.frames.push(frame(1, "MyApp", "0x1600"));
        model.threads.push(t0);
        model.threads.push(t1);
        model.add_library(library("MyApp", "0x1000"));
        model.add_library(library("MyLib", "0x2000"));
        model.add_library(library("libsystem_c.dylib", "0x8000"));
        model
    }

    fn sample_paths() -> SymbolPaths {
        let mut paths = SymbolPaths::new();
        paths.insert("MyApp", "/build/MyApp");
        paths.insert("MyLib", "/build/MyLib");
        paths
    }

    #[test]
    fn test_group_addresses_collapses_duplicates() {
        let grouped = group_addresses(&sample_model());
        assert_eq!(grouped.len(), 3);
        let app: Vec<_> = grouped["MyApp"].iter().map(String::as_str).collect();
        assert_eq!(app, vec!["0x1500", "0x1600"]);
    }

    #[test]
    fn test_resolve_maps_known_libraries_only() {
        let echo = EchoResolver::default();
        let (map, summary) = SymbolResolver::new(&echo, ResolveOptions::default())
            .resolve(&sample_model(), &sample_paths())
            .unwrap();

        assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("0x1600"), Some("sym@0x1600"));
        assert_eq!(map.get("0x2500"), Some("sym@0x2500"));
        assert_eq!(map.get("0x9000"), None);
        assert_eq!(summary.resolved, vec!["MyApp", "MyLib"]);
        assert_eq!(summary.skipped, vec!["libsystem_c.dylib"]);
        assert_eq!(summary.addresses, 3);
    }

    #[test]
    fn test_resolver_receives_artifact_and_load_address() {
        let echo = EchoResolver::default();
        SymbolResolver::new(&echo, ResolveOptions::default())
            .resolve(&sample_model(), &sample_paths())
            .unwrap();

        let mut seen = echo.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("MyApp".to_string(), "/build/MyApp".to_string(), "0x1000".to_string()),
                ("MyLib".to_string(), "/build/MyLib".to_string(), "0x2000".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_address_set_skips_resolver() {
        let echo = EchoResolver::default();
        let request = ResolveRequest {
            library: "MyApp",
            artifact: Path::new("/build/MyApp"),
            load_address: "0x1000",
            addresses: &[],
        };
        assert!(resolve_library(&echo, &request).unwrap().is_empty());
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_library_without_binary_image_is_skipped() {
        let mut model = sample_model();
        model.threads[0].frames.push(frame(3, "Ghost", "0x7000"));
        let mut paths = sample_paths();
        paths.insert("Ghost", "/build/Ghost");

        let echo = EchoResolver::default();
        let (map, summary) =
            SymbolResolver::new(&echo, ResolveOptions::default()).resolve(&model, &paths).unwrap();
        assert_eq!(map.get("0x7000"), None);
        assert!(summary.skipped.contains(&"Ghost".to_string()));
    }

    #[test]
    fn test_failure_aborts_by_default() {
        let echo = EchoResolver { fail_for: Some("MyLib"), ..Default::default() };
        let err = SymbolResolver::new(&echo, ResolveOptions::default())
            .resolve(&sample_model(), &sample_paths())
            .unwrap_err();
        assert!(matches!(err, ResolveError::Failed { ref library, .. } if library == "MyLib"));
    }

    /// Three libraries, each with one frame and a symbol artifact
    fn three_library_model() -> (ReportModel, SymbolPaths) {
        let mut model = ReportModel::new();
        let mut paths = SymbolPaths::new();
        let mut crashed = ThreadInfo::new(0, None, true);
        for (index, (name, start)) in
            [("LibA", "0x1000"), ("LibB", "0x2000"), ("LibC", "0x3000")].into_iter().enumerate()
        {
            let index = u32::try_from(index).unwrap();
            crashed.frames.push(frame(index, name, &format!("{start}0")));
            model.add_library(library(name, start));
            paths.insert(name, format!("/build/{name}"));
        }
        model.threads.push(crashed);
        (model, paths)
    }

    #[test]
    fn test_failure_stops_remaining_libraries() {
        let (model, paths) = three_library_model();
        let echo = EchoResolver { fail_for: Some("LibA"), ..Default::default() };
        let err =
            SymbolResolver::new(&echo, ResolveOptions::default()).resolve(&model, &paths).unwrap_err();

        assert!(matches!(err, ResolveError::Failed { ref library, .. } if library == "LibA"));
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parallel_failure_leaves_queued_libraries() {
        let (model, paths) = three_library_model();
        let echo = EchoResolver {
            fail_for: Some("LibA"),
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        };
        let options = ResolveOptions { jobs: 2, keep_going: false };
        let err = SymbolResolver::new(&echo, options).resolve(&model, &paths).unwrap_err();

        assert!(matches!(err, ResolveError::Failed { ref library, .. } if library == "LibA"));
        let seen = echo.seen.lock().unwrap();
        assert!(seen.iter().all(|(library, _, _)| library != "LibC"), "{seen:?}");
    }

    #[test]
    fn test_keep_going_isolates_failure() {
        let echo = EchoResolver { fail_for: Some("MyLib"), ..Default::default() };
        let options = ResolveOptions { jobs: 1, keep_going: true };
        let (map, summary) =
            SymbolResolver::new(&echo, options).resolve(&sample_model(), &sample_paths()).unwrap();
        assert_eq!(map.get("0x1500"), Some("sym@0x1500"));
        assert_eq!(map.get("0x2500"), None);
        assert_eq!(summary.failed, vec!["MyLib"]);
    }

    #[test]
    fn test_short_output_is_mismatch() {
        let echo = EchoResolver { drop_last_line: true, ..Default::default() };
        let err = SymbolResolver::new(&echo, ResolveOptions::default())
            .resolve(&sample_model(), &sample_paths())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::OutputMismatch { expected: 2, actual: 1, ref library } if library == "MyApp"
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = EchoResolver::default();
        let (seq_map, seq_summary) = SymbolResolver::new(&sequential, ResolveOptions::default())
            .resolve(&sample_model(), &sample_paths())
            .unwrap();

        let parallel = EchoResolver::default();
        let options = ResolveOptions { jobs: 4, keep_going: false };
        let (par_map, par_summary) =
            SymbolResolver::new(&parallel, options).resolve(&sample_model(), &sample_paths()).unwrap();

        assert_eq!(seq_map, par_map);
        assert_eq!(seq_summary, par_summary);
        assert_eq!(parallel.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_output_is_demangled() {
        struct RustResolver;
        impl AddressResolver for RustResolver {
            fn resolve(&self, _: &ResolveRequest<'_>) -> Result<Vec<String>, ResolveError> {
                Ok(vec!["_ZN5myapp4main17h0123456789abcdefE (in MyApp)".to_string()])
            }
        }
        let addresses = vec!["0x1500".to_string()];
        let request = ResolveRequest {
            library: "MyApp",
            artifact: Path::new("/build/MyApp"),
            load_address: "0x1000",
            addresses: &addresses,
        };
        let pairs = resolve_library(&RustResolver, &request).unwrap();
        assert_eq!(pairs, vec![("0x1500".to_string(), "myapp::main (in MyApp)".to_string())]);
    }
}
