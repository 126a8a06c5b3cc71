//! # crashsym - macOS Crash Report Symbolicator
//!
//! Rewrites the backtraces of a macOS (x86_64) crash report with function
//! names and source locations, using an external `atos`-compatible resolver
//! and the symbol files of the crashed application.
//!
//! ## Architecture Overview
//!
//! ```text
//!   crash report text
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │   Line Parser    │────▶│  Report Model    │────▶│ Symbol Resolver  │
//! │ (state machine)  │     │ threads, images  │     │ (atos per lib)   │
//! └──────────────────┘     └──────────────────┘     └────────┬─────────┘
//!          │                                                  │ SymbolMap
//!          │ original lines                                   ▼
//!          └────────────────────────────────────────▶┌──────────────────┐
//!                                                    │ Report Renderer  │──▶ stdout
//!                                                    └──────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`parsing`]: line patterns and the parser state machine
//! - [`domain`]: report model types and structured errors
//! - [`symbolization`]: artifact handling, resolver invocation, demangling
//! - [`render`]: line-for-line output with resolved frames annotated
//! - [`pipeline`]: parse → resolve → render in one call
//! - [`export`]: JSON dump of the report model
//! - [`preflight`]: input checks with distinct failures per input
//! - [`cli`]: command-line argument parsing
//!
//! ## Typical Usage
//!
//! ```bash
//! # Symbolicate against the app's dSYM
//! crashsym MyApp_2024-01-01.crash build/MyApp.app.dSYM > symbolicated.crash
//!
//! # Add symbols for a bundled dylib and resolve libraries in parallel
//! crashsym MyApp.crash MyApp.app --library libfoo.dylib=build/libfoo.dylib -j 4
//! ```

// Expose modules for testing
pub mod cli;
pub mod domain;
pub mod export;
pub mod parsing;
pub mod pipeline;
pub mod preflight;
pub mod render;
pub mod symbolization;
