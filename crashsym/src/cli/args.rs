//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::symbolization::DEFAULT_RESOLVER;

#[derive(Parser, Debug)]
#[command(
    name = "crashsym",
    version,
    about = "Symbolicate macOS x86_64 crash reports",
    after_help = "\
EXAMPLES:
    crashsym MyApp.crash MyApp.app.dSYM             Resolve frames of the crashed executable
    crashsym MyApp.crash MyApp.app                  Use the executable inside an app bundle
    crashsym MyApp.crash MyApp --library libfoo.dylib=build/libfoo.dylib -j 4"
)]
pub struct Args {
    /// Crash report to symbolicate
    #[arg(value_name = "REPORT")]
    pub report: Option<PathBuf>,

    /// Executable, .dSYM bundle or .app bundle of the crashed process
    #[arg(value_name = "SYMBOLS")]
    pub symbols: Option<PathBuf>,

    /// Print resolver progress and parsing details
    #[arg(short, long)]
    pub verbose: bool,

    /// Address resolver program (atos-compatible)
    #[arg(long, value_name = "PROGRAM", env = "CRASHSYM_RESOLVER", default_value = DEFAULT_RESOLVER)]
    pub resolver: String,

    /// Extra symbol file for a library in the report (repeatable)
    #[arg(long = "library", value_name = "NAME=PATH")]
    pub libraries: Vec<String>,

    /// Number of libraries to resolve concurrently
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Skip libraries whose resolution fails instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Also write the parsed report model as JSON
    #[arg(long, value_name = "FILE")]
    pub dump_model: Option<PathBuf>,

    /// Write the symbolicated report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Both required inputs, if given
    #[must_use]
    pub fn inputs(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.report.as_ref().zip(self.symbols.as_ref())
    }
}
