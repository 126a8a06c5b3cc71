//! # crashsym - Main Entry Point
//!
//! Parses the command line, validates inputs, runs the symbolication pipeline
//! and maps failures to exit statuses.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::info;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use crashsym::cli::Args;
use crashsym::domain::{InputError, ResolveError};
use crashsym::export::export_model_to_file;
use crashsym::pipeline::{build_symbol_paths, symbolicate};
use crashsym::preflight::run_preflight_checks;
use crashsym::symbolization::{AtosResolver, ResolveOptions};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_REPORT_NOT_FOUND: i32 = 3;
const EXIT_SYMBOLS_NOT_FOUND: i32 = 4;
const EXIT_RESOLVER_FAILED: i32 = 5;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version render through the error path too
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            e.print().ok();
            std::process::exit(code);
        }
    };
    init_logging(args.verbose);

    std::process::exit(match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` overrides both
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        match cause.downcast_ref::<InputError>() {
            Some(InputError::ReportNotFound(_)) => return EXIT_REPORT_NOT_FOUND,
            Some(InputError::SymbolsNotFound(_)) => return EXIT_SYMBOLS_NOT_FOUND,
            Some(InputError::InvalidSymbolMapping(_)) => return EXIT_ERROR,
            None => {}
        }
        if cause.downcast_ref::<ResolveError>().is_some() {
            return EXIT_RESOLVER_FAILED;
        }
    }
    EXIT_ERROR
}

fn run(args: &Args) -> Result<()> {
    // Missing inputs are treated as a request for help
    let Some((report_path, symbols_path)) = args.inputs() else {
        Args::command().print_help()?;
        println!();
        return Ok(());
    };

    run_preflight_checks(report_path, symbols_path)?;

    let bytes = fs::read(report_path)
        .with_context(|| format!("Failed to read crash report {}", report_path.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let resolver = AtosResolver::new(args.resolver.as_str());
    let options = ResolveOptions { jobs: usize::from(args.jobs), keep_going: args.keep_going };

    info!("symbolicating {} with {}", report_path.display(), symbols_path.display());
    let result = symbolicate(
        &text,
        |model| build_symbol_paths(model, symbols_path, &args.libraries),
        &resolver,
        options,
    )?;

    if let Some(ref model_path) = args.dump_model {
        export_model_to_file(&result.model, model_path)?;
        info!("saved report model: {}", model_path.display());
    }

    let mut writer: Box<dyn Write> = match args.output {
        Some(ref path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for line in &result.lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush().context("Failed to write symbolicated report")?;

    Ok(())
}
