//! fz_pipeline: deterministic run surface (load → classify → stratify → allocate → assemble → summary).
//! Tables, hashing and canonical JSON go through `fz_io`; quota math lives in `fz_algo`;
//! the section model and sheet layout come from `fz_report`. Writing artifacts is the caller's job.

#![forbid(unsafe_code)]

use core::fmt;
use std::path::Path;

use fz_core::params::validate_domains;
use fz_core::SelectionParams;
use fz_report::{ReportError, ReportModel, SheetLayout};
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod allocate;
pub mod build_summary;
pub mod load;

pub use allocate::StrataCounts;
pub use build_summary::{build_summary, SectionSummary, SelectionSummary};
pub use load::{load_input, validate_input, LoadedInput};

/// Engine identifiers echoed into every run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub vendor: String,
    pub name: String,
    pub version: String,
    pub build: String,
}

/// Pipeline context: the input is already loaded; params are validated on entry.
#[derive(Debug)]
pub struct PipelineCtx {
    pub input: LoadedInput,
    pub params: SelectionParams,
    pub engine_meta: EngineMeta,
}

/// Everything a caller needs to render and record a run.
#[derive(Debug)]
pub struct PipelineOutputs {
    pub report: ReportModel,
    pub layout: SheetLayout,
    pub summary: SelectionSummary,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug)]
pub enum PipelineError {
    /// File system trouble reading inputs.
    Io(String),
    /// Input table unusable (format, sheet, columns, CSV syntax).
    Input(String),
    /// Parameter file or overrides invalid.
    Params(String),
    /// Report model or summary could not be built.
    Build(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(m) => write!(f, "io: {m}"),
            PipelineError::Input(m) => write!(f, "input: {m}"),
            PipelineError::Params(m) => write!(f, "params: {m}"),
            PipelineError::Build(m) => write!(f, "build: {m}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<fz_io::IoError> for PipelineError {
    fn from(e: fz_io::IoError) -> Self {
        use fz_io::IoError;
        use PipelineError::*;
        match e {
            IoError::Read(e) => Io(format!("read: {e}")),
            IoError::Write(e) => Io(format!("write: {e}")),
            IoError::Csv(e) => Input(format!("csv: {e}")),
            IoError::Workbook(m) => Input(format!("workbook: {m}")),
            IoError::UnsupportedFormat(ext) => {
                Input(format!("unsupported format {ext:?} (expected csv, xlsx, xlsm, xls, xlsb or ods)"))
            }
            IoError::MissingColumn(c) => Input(format!("missing required column {c:?}")),
            IoError::MissingSheet(s) => Input(format!("sheet not found: {s:?}")),
            IoError::Json { pointer, msg } => Params(format!("json {pointer}: {msg}")),
            IoError::Params(m) => Params(m),
        }
    }
}

impl From<ReportError> for PipelineError {
    fn from(e: ReportError) -> Self {
        PipelineError::Build(e.to_string())
    }
}

impl From<fz_core::errors::CoreError> for PipelineError {
    fn from(e: fz_core::errors::CoreError) -> Self {
        PipelineError::Params(e.to_string())
    }
}

// -------------------------------------- Public API --------------------------------------

/// Run the selection over a preloaded input.
pub fn run_with_ctx(ctx: PipelineCtx) -> Result<PipelineOutputs, PipelineError> {
    validate_domains(&ctx.params)?;

    // --- CLASSIFY ---
    let records = ctx.input.table.to_records(&ctx.params.columns)?;
    let classifier = ctx.params.classifier();
    let classified = classifier.classify_all(&records);

    // --- STRATIFY + ALLOCATE ---
    let strata = fz_algo::stratify(&classified);
    let alloc = allocate::allocate(&strata, &ctx.params);

    // --- ASSEMBLE ---
    let report = fz_report::assemble(&alloc, &ctx.input.table.headers)?;
    let layout = fz_report::layout(&report);

    // --- SUMMARY ---
    let summary = build_summary(&ctx, &strata, &alloc, records.len())?;
    info!(
        selected = summary.selected,
        shortfall = summary.shortfall,
        sections = report.sections.len(),
        "run complete"
    );

    Ok(PipelineOutputs { report, layout, summary })
}

/// Convenience entry: load the table at `path` (optionally a named sheet), then run.
pub fn run_from_path<P: AsRef<Path>>(
    path: P,
    sheet: Option<&str>,
    params: SelectionParams,
) -> Result<PipelineOutputs, PipelineError> {
    let input = load_input(path.as_ref(), sheet)?;
    run_with_ctx(PipelineCtx { input, params, engine_meta: engine_identifiers() })
}

pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        vendor: "fz".to_string(),
        name: "freeze_select".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: "dev".to_string(),
    }
}
