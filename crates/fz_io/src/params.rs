//! Parameter file loading: JSON → `SelectionParams`, then domain validation.

use std::fs;
use std::path::Path;

use fz_core::params::{validate_domains, SelectionParams};
use tracing::debug;

use crate::{IoError, IoResult};

/// Read and validate a parameter file. Missing fields take their defaults.
pub fn load_params(path: &Path) -> IoResult<SelectionParams> {
    let bytes = fs::read(path).map_err(IoError::Read)?;
    let params = parse_params(&bytes)?;
    debug!(path = %path.display(), target = params.target_total, seed = params.seed, "params loaded");
    Ok(params)
}

pub fn parse_params(bytes: &[u8]) -> IoResult<SelectionParams> {
    let params: SelectionParams = serde_json::from_slice(bytes)?;
    validate_domains(&params)?;
    Ok(params)
}
