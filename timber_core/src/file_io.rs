//! # File I/O Module
//!
//! Reads the JSON data files (property tables, section catalogs) and writes
//! design reports.
//!
//! Reports are saved atomically: the JSON is written to a `.tmp` sibling,
//! synced, then renamed over the target so an interrupted write never leaves a
//! truncated report behind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use timber_core::file_io::{load_report, save_report};
//! use timber_core::calculations::utilisation::{DesignReport, UtilisationResult};
//! use std::path::Path;
//!
//! let report = DesignReport::new(63.0, 175.0, UtilisationResult {
//!     bending_ur: 0.69,
//!     shear_ur: 0.36,
//!     ltb_ur: None,
//!     deflection_ur: 0.85,
//! });
//! save_report(&report, Path::new("b1.json"))?;
//! let loaded = load_report(Path::new("b1.json"))?;
//! assert_eq!(loaded.breadth, 63.0);
//! # Ok::<(), timber_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::calculations::utilisation::DesignReport;
use crate::errors::{CalcError, CalcResult};

/// Read and parse a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let mut file = File::open(path).map_err(|e| {
        CalcError::file_error("open", path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        CalcError::file_error("read", path.display().to_string(), e.to_string())
    })?;

    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Serialize `value` as pretty JSON and write it atomically to `path`.
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Save a utilisation report as JSON.
pub fn save_report(report: &DesignReport, path: &Path) -> CalcResult<()> {
    write_json_atomic(report, path)
}

/// Load a utilisation report saved with [`save_report`].
pub fn load_report(path: &Path) -> CalcResult<DesignReport> {
    read_json_file(path)
}
