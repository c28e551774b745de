// crates/fz_cli/src/args.rs
//
// Offline CLI argument surface: types, parsing, local-path and domain checks.
//
// Rules:
// - Local paths only (reject any scheme:// like http/https/file)
// - --input-file must exist as a regular file; so must --params when given
// - --num-of-specimen must be at least 1
// - Seed override accepts decimal u64 or 0x-hex up to 16 nybbles
// - Underscore spellings (--input_file, --num_of_specimen, ...) are accepted as aliases

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::Parser;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "fz",
    version,
    disable_help_subcommand = true,
    about = "Select specimens to freeze by category quotas and write an annotated workbook"
)]
pub struct Args {
    // --- Inputs ---
    /// Specimen table (csv, xlsx, xlsm, xls, xlsb or ods).
    #[arg(long = "input-file", visible_alias = "input_file")]
    pub input_file: PathBuf,
    /// Worksheet to read (workbooks only; default: first sheet).
    #[arg(long = "sheetname", visible_alias = "sheet-name")]
    pub sheetname: Option<String>,
    /// Selection parameters JSON (every field optional).
    #[arg(long)]
    pub params: Option<PathBuf>,

    // --- Selection ---
    /// Target number of specimens (overrides the parameter file; default 30).
    #[arg(short = 'n', long = "num-of-specimen", visible_alias = "num_of_specimen")]
    pub num_of_specimen: Option<u32>,
    /// Sampling seed override. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    // --- Output ---
    /// Output directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Also write selection_summary.json (canonical JSON) next to the workbook.
    #[arg(long)]
    pub summary: bool,

    // --- Control ---
    /// Check inputs and parameters only; select nothing, write nothing.
    #[arg(long = "validate-only", visible_alias = "validate_only")]
    pub validate_only: bool,
    /// Only warnings and errors on the console.
    #[arg(long)]
    pub quiet: bool,
    /// Directory for the run log file.
    #[arg(long = "log-dir", default_value = "logs")]
    pub log_dir: PathBuf,
    /// Do not write a log file.
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadValue(&'static str),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadValue(s) => write!(f, "invalid value: {s}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Checks and normalization applied after clap parsing.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }
    ensure_local_exists(&args.input_file, "--input-file")?;
    if let Some(p) = &args.params {
        ensure_local_exists(p, "--params")?;
    }
    if args.num_of_specimen == Some(0) {
        return Err(CliError::BadValue("--num-of-specimen must be at least 1"));
    }
    if matches!(&args.sheetname, Some(s) if s.trim().is_empty()) {
        return Err(CliError::BadValue("--sheetname must not be empty"));
    }

    args.input_file = normalize_path(&args.input_file);
    args.params = args.params.take().map(|p| normalize_path(&p));
    // Output and log directories may not exist yet.
    args.out = normalize_path(&args.out);
    args.log_dir = normalize_path(&args.log_dir);
    Ok(args)
}

/// Seed: decimal u64, or `0x`-prefixed hex of 1..=16 digits.
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if (1..=16).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u64::from_str_radix(hex, 16).map_err(|e| e.to_string())
        }
        Some(_) => Err("hex seed must be 1..16 hex digits".into()),
        None if s.is_empty() => Err("empty seed".into()),
        None => s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into()),
    }
}

/// Paths must be plain local paths: no `scheme://` and no `http:`/`https:`/`file:` prefix.
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    let Some(s) = p.to_str() else { return Ok(()) };
    let lower = s.trim().to_ascii_lowercase();
    let remote = lower.contains("://") || ["http:", "https:", "file:"].iter().any(|pre| lower.starts_with(pre));
    if remote {
        return Err(CliError::NonLocalPath(s.to_string()));
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        Some(args.input_file.as_path()),
        args.params.as_deref(),
        Some(args.out.as_path()),
        Some(args.log_dir.as_path()),
    ]
    .into_iter()
    .flatten()
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    match fs::metadata(p) {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(CliError::NotFound(format!("{label} {}", p.display()))),
    }
}

/// Absolute form of `p`: canonical when it exists, otherwise joined onto the CWD.
fn normalize_path(p: &Path) -> PathBuf {
    if let Ok(c) = fs::canonicalize(p) {
        return c;
    }
    if p.is_absolute() {
        return p.to_path_buf();
    }
    env::current_dir().map(|d| d.join(p)).unwrap_or_else(|_| p.to_path_buf())
}
