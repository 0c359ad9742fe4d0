//! Error types for the expression and record pipeline.
//!
//! Only [`PipelineError`] aborts a run. [`LookupError`] is scoped to a single
//! row and ends up in that row's output cell.

use std::path::PathBuf;
use thiserror::Error;

/// File-level failures. Raised before any row is processed, or while reading
/// and writing the tables themselves.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required column not found in the input header.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Input file has no header line.
    #[error("input file is empty: {path}")]
    EmptyInput { path: PathBuf },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read or write TSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failures raised by a [`crate::transport::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("failed reading response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// Per-row lookup failures.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no target code in row")]
    MissingTargetCode,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{status} status for url ({url})")]
    Status { status: u16, url: String, body: String },

    #[error("invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed but lacks a field the authoring-form contract requires.
    #[error("malformed concept graph: missing or invalid '{path}'")]
    MalformedGraph { path: String },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
