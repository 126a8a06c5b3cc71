//! Demangling of resolver output
//!
//! `atos` demangles C++ names itself but prints Rust symbols in their mangled
//! form, e.g. `_ZN5myapp4main17h0123456789abcdefE (in MyApp) (main.rs:12)`.

use rustc_demangle::try_demangle;

/// Demangle the leading symbol of a resolver output line, if it is a Rust symbol.
///
/// Mach-O symbols carry an extra leading underscore, which is stripped before
/// demangling. Lines that do not start with a mangled Rust name are returned
/// unchanged.
#[must_use]
pub fn demangle_resolver_line(line: &str) -> String {
    let (symbol, rest) = line.split_once(' ').unwrap_or((line, ""));
    let candidate = if symbol.starts_with("__") { &symbol[1..] } else { symbol };

    match try_demangle(candidate) {
        Ok(demangled) if rest.is_empty() => format!("{demangled:#}"),
        Ok(demangled) => format!("{demangled:#} {rest}"),
        Err(_) => line.to_string(),
    }
}
