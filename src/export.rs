//! Export types for handing a finished cycle to external stores.
//!
//! A [`CycleRecord`] summarizes one program run against a context. On disk
//! it travels as a [`CycleExport`]: the record under `cycle`, the context's
//! FAIR+CARE metadata under `metadata`, as pretty-printed JSON.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::context::{Context, FairCareMetadata};
use crate::value::Value;

/// Errors from writing export files.
#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("failed to write export file {path}")]
    #[diagnostic(
        code(logos::export::io),
        help("Check that the parent directory exists and is writable.")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export: {message}")]
    #[diagnostic(
        code(logos::export::serialize),
        help("This is a bug: every exported type should serialize to JSON.")
    )]
    Serialize { message: String },
}

/// Result type for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Summary of one program cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    /// `cycle_{seconds}_{n}`.
    pub cycle_id: String,
    /// Seconds since the UNIX epoch at cycle start.
    pub timestamp: u64,
    pub expressions_evaluated: usize,
    /// Results that are not error markers.
    pub successful_evaluations: usize,
    pub results: Vec<Value>,
    pub final_coherence: f64,
    pub dialogue_count: usize,
    /// Scores of the last ten dialogues, oldest first.
    pub recent_dialogue_scores: Vec<f64>,
    pub operator_id: Option<String>,
    pub fair_care_enabled: bool,
}

/// A cycle together with the context's provenance metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CycleExport<'a> {
    pub cycle: &'a CycleRecord,
    pub metadata: FairCareMetadata,
}

impl<'a> CycleExport<'a> {
    /// Pair a cycle with fresh metadata from `context`.
    pub fn new(cycle: &'a CycleRecord, context: &mut Context) -> Self {
        Self {
            cycle,
            metadata: context.fair_care_metadata(),
        }
    }
}

/// Write any exportable value as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> ExportResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ExportError::Serialize {
        message: e.to_string(),
    })?;
    fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "export written");
    Ok(())
}

/// Write a cycle record, with fresh metadata from `context`, as pretty JSON.
pub fn export_cycle(cycle: &CycleRecord, context: &mut Context, path: &Path) -> ExportResult<()> {
    write_json(&CycleExport::new(cycle, context), path)
}
