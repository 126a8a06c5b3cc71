//! # Crash Report Parsing
//!
//! Turns the text of a macOS crash report into a [`ReportModel`](crate::domain::ReportModel).
//!
//! ## Report Layout
//!
//! Only a few parts of the report carry structure the symbolicator needs:
//!
//! ```text
//! Path:            /Applications/MyApp.app/Contents/MacOS/MyApp   ← process name
//! Identifier:      com.example.MyApp                              ← bundle id
//! ...
//! Thread 0 Crashed:: Dispatch queue: com.apple.main-thread        ← thread header
//! 0   libsystem_kernel.dylib   0x00007fff8f5d5f06 __pthread_kill + 10
//! 1   MyApp                    0x000000010a8c2f3c 0x10a8c1000 + 7996
//! ...
//! Binary Images:                                                  ← table start
//!    0x10a8c1000 -    0x10a8c4fff +MyApp x86_64 (1.0) <5B2D...> /Applications/...
//! ```
//!
//! Everything else is free text and is skipped.
//!
//! ## State Machine
//!
//! ```text
//!  ExpectProcessHeader ──Identifier──▶ Scanning ──Thread N:──────▶ InBacktrace
//!                                        ▲  │                          │
//!                                        │  └──Binary Images:──▶ InLoadAddressTable
//!                                        │                             │
//!                                        └──── non-matching line ◀─────┘
//!                                              (re-evaluated in Scanning)
//! ```
//!
//! - **`patterns`**: per-line regular expressions, shared with the renderer
//! - **`state_machine`**: the explicit transition function and [`LineParser`]

pub mod patterns;
pub mod state_machine;

pub use patterns::{match_backtrace_line, BacktraceLine};
pub use state_machine::{parse_report, step, LineDisposition, LineParser, ParseState};
