//! JSON export of the parsed report model
//!
//! Writes the process info, threads and binary images exactly as the parser
//! saw them, for inspection or for feeding into other tooling.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ReportModel;

#[derive(Serialize)]
struct ModelDocument<'a> {
    crashed_thread: Option<u32>,
    frame_count: usize,
    #[serde(flatten)]
    model: &'a ReportModel,
}

/// Serialize `model` as pretty-printed JSON into `writer`
///
/// # Errors
/// Returns an error if serialization or the write fails
pub fn export_model<W: Write>(model: &ReportModel, mut writer: W) -> Result<()> {
    let doc = ModelDocument {
        crashed_thread: model.crashed_thread().map(|t| t.number),
        frame_count: model.frame_count(),
        model,
    };
    serde_json::to_writer_pretty(&mut writer, &doc).context("Failed to serialize report model")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the model to `path`
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn export_model_to_file(model: &ReportModel, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create model file {}", path.display()))?;
    export_model(model, BufWriter::new(file))
}
