// crates/fz_cli/src/main.rs
//
// Exit codes, typed error mapping, and the run path:
// params → overrides → load → (validate-only | pipeline → workbook → optional summary).

mod args;
mod logging;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Usage, input table or parameter problems.
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    /// Report model or workbook could not be built.
    pub const BUILD: i32 = 5;
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args};
use fz_core::SelectionParams;
use fz_io::canonical_json::{write_bytes_atomic, write_canonical_file};
use fz_pipeline::{engine_identifiers, load_input, run_with_ctx, validate_input, PipelineCtx, PipelineError};
use fz_report::ReportError;
use tracing::{error, info, warn};

pub const OUTPUT_PREFIX: &str = "bact_to_freeze__";
pub const SUMMARY_FILE: &str = "selection_summary.json";

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
    Build(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Io(m) | MainError::Build(m) => f.write_str(m),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("fz: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    let stamp = chrono::Local::now().format("%y%m%d_%H%M%S").to_string();
    let log_opts = logging::LogOptions {
        quiet: args.quiet,
        dir: (!args.no_log_file).then_some(args.log_dir.as_path()),
        stamp: &stamp,
    };
    match logging::init(&log_opts) {
        Ok(Some(path)) => info!(path = %path.display(), "logging to file"),
        Ok(None) => {}
        Err(e) => {
            eprintln!("fz: error: log file in {}: {e}", args.log_dir.display());
            return ExitCode::from(exitcodes::IO as u8);
        }
    }

    let rc = match run_once(&args, &stamp) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            error!("{e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Build(_) => BUILD,
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    use PipelineError::*;
    match e {
        Input(m) => MainError::Validation(format!("input: {m}")),
        Params(m) => MainError::Validation(format!("params: {m}")),
        Io(m) => MainError::Io(m),
        Build(m) => MainError::Build(m),
    }
}

fn map_io_err(e: fz_io::IoError) -> MainError {
    map_pipeline_err(PipelineError::from(e))
}

fn map_report_err(e: ReportError) -> MainError {
    MainError::Build(format!("render: {e}"))
}

/// Parameter file (or defaults) with the CLI overrides applied.
fn resolve_params(args: &Args) -> Result<SelectionParams, MainError> {
    let mut params = match &args.params {
        Some(p) => fz_io::params::load_params(p).map_err(map_io_err)?,
        None => SelectionParams::default(),
    };
    if let Some(n) = args.num_of_specimen {
        params.target_total = n;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    Ok(params)
}

fn run_once(args: &Args, stamp: &str) -> Result<(), MainError> {
    let params = resolve_params(args)?;
    info!(
        input = %args.input_file.display(),
        target = params.target_total,
        seed = params.seed,
        "starting selection"
    );

    let input = load_input(&args.input_file, args.sheetname.as_deref()).map_err(map_pipeline_err)?;

    if args.validate_only {
        let rows = validate_input(&input, &params).map_err(map_pipeline_err)?;
        info!(rows, "validate-only: inputs OK");
        return Ok(());
    }

    let outs = run_with_ctx(PipelineCtx { input, params, engine_meta: engine_identifiers() })
        .map_err(map_pipeline_err)?;
    if outs.summary.shortfall > 0 {
        warn!(
            shortfall = outs.summary.shortfall,
            selected = outs.summary.selected,
            "fewer specimens than requested"
        );
    }

    let bytes = fz_report::render_xlsx(&outs.layout).map_err(map_report_err)?;
    let path = write_outputs(&args.out, stamp, &bytes, args.summary.then_some(&outs.summary))?;
    info!(path = %path.display(), records = outs.report.record_count(), "workbook saved");
    if !args.quiet {
        println!("{}", path.display());
    }
    Ok(())
}

fn write_outputs(
    out_dir: &Path,
    stamp: &str,
    workbook: &[u8],
    summary: Option<&fz_pipeline::SelectionSummary>,
) -> Result<PathBuf, MainError> {
    fs::create_dir_all(out_dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    let path = out_dir.join(format!("{OUTPUT_PREFIX}{stamp}.xlsx"));
    write_bytes_atomic(&path, workbook).map_err(|e| MainError::Io(format!("write {}: {e}", path.display())))?;

    if let Some(s) = summary {
        let sp = out_dir.join(SUMMARY_FILE);
        write_canonical_file(&sp, s).map_err(|e| MainError::Io(format!("write {SUMMARY_FILE}: {e}")))?;
        info!(path = %sp.display(), "summary saved");
    }
    Ok(path)
}
