//! # Symbol Resolution
//!
//! Converts the raw return addresses in a crash report's backtraces into
//! function names and source locations by handing them to an external
//! `atos`-compatible resolver.
//!
//! ## Load Bias
//!
//! Crash reports record **runtime** addresses. The symbol file only knows
//! **link-time** addresses, so the resolver must be told where the library
//! was actually mapped. That is the start address from the `Binary Images:`
//! table:
//!
//! ```text
//! Binary Images:
//!    0x10a8c1000 - 0x10a8c4fff +MyApp x86_64 (1.0) <5B2D...> /Applications/MyApp.app/...
//!    ^^^^^^^^^^^ load address passed as `-l`
//! ```
//!
//! ## Resolution Flow
//!
//! ```text
//! 1. Group frame addresses by library (duplicates collapse)
//!    MyApp → {0x10a8c2f3c, 0x10a8c3001}
//!    libsystem_kernel.dylib → {0x7fff8f5d5f06}
//!
//! 2. Keep libraries that have a symbol artifact and a Binary Images entry
//!    MyApp → MyApp.app.dSYM, load 0x10a8c1000
//!    libsystem_kernel.dylib → (no artifact, skipped)
//!
//! 3. Write each library's addresses to a unique temporary file and run
//!    atos -arch x86_64 -o MyApp.app.dSYM -l 0x10a8c1000 -f /tmp/.tmpXXXX
//!
//! 4. Pair output line N with address N
//!    0x10a8c2f3c → main (in MyApp) (main.m:14)
//! ```
//!
//! ## Module Structure
//!
//! - **`artifact`**: bundle → executable mapping, library → artifact table,
//!   Mach-O inspection before resolution
//! - **`atos`**: the external process invocation
//! - **`resolver`**: grouping, per-library dispatch (optionally parallel),
//!   failure isolation and merging into a [`SymbolMap`](crate::domain::SymbolMap)
//! - **`demangle`**: Rust demangling of resolver output
//!
//! ## Limitations
//!
//! - **x86_64 only**: other architectures in the report are ignored
//! - **No UUID verification**: a mismatched dSYM silently yields wrong symbols

pub mod artifact;
pub mod atos;
pub mod demangle;
pub mod resolver;

pub use artifact::{check_debug_symbols, executable_for_artifact, parse_library_mapping, SymbolPaths};
pub use atos::{AtosResolver, DEFAULT_RESOLVER};
pub use resolver::{
    group_addresses, resolve_library, AddressResolver, ResolveOptions, ResolveRequest,
    ResolveSummary, SymbolResolver,
};
