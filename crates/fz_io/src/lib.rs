//! crates/fz_io/src/lib.rs
//! I/O boundary of the workspace.
//!
//! - Table loading: CSV (encoding detected) and workbooks (xlsx/xlsm/xls/xlsb/ods).
//! - Parameter files (JSON, defaults for every field, domain-validated).
//! - Canonical JSON and atomic file writes.
//! - SHA-256 digests (lowercase hex).
//!
//! Shared error type (`IoError`) lives here; details live in submodules.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for fz_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Opening or reading an input file.
    #[error("read error: {0}")]
    Read(std::io::Error),

    /// Creating directories or writing an artifact.
    #[error("write error: {0}")]
    Write(std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook could not be opened or a sheet could not be read.
    #[error("workbook error: {0}")]
    Workbook(String),

    /// JSON serialization/deserialization errors with a JSON Pointer hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    #[error("unsupported input format: {0:?} (expected csv, xlsx, xlsm, xls, xlsb or ods)")]
    UnsupportedFormat(String),

    #[error("missing required column: {0:?}")]
    MissingColumn(String),

    #[error("sheet not found: {0:?}")]
    MissingSheet(String),

    /// Parameters parsed but failed domain validation.
    #[error("invalid parameters: {0}")]
    Params(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps no pointer; report root with line/column in the message.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

impl From<calamine::Error> for IoError {
    fn from(e: calamine::Error) -> Self {
        IoError::Workbook(e.to_string())
    }
}

impl From<fz_core::errors::CoreError> for IoError {
    fn from(e: fz_core::errors::CoreError) -> Self {
        IoError::Params(e.to_string())
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod params;
pub mod table;
