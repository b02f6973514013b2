//! # timber_core - Timber Beam Design Engine
//!
//! `timber_core` checks rectangular timber beams to EN 1995-1-1 (Eurocode 5)
//! with the UK National Annex and searches for the smallest standard section
//! that passes. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Validated state**: setters reject bad values before mutating, and
//!   derived values (area, effective length) are refreshed on every change
//! - **JSON-First**: material tables, section catalogs and reports are JSON
//! - **Rich Errors**: structured [`CalcError`] values, never panics
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use timber_core::calculations::{auto_size, DesignInput, TimberBeam};
//! use timber_core::materials::TimberMaterial;
//! use timber_core::section::TimberSection;
//!
//! let c24 = Arc::new(TimberMaterial::new("softwood", "C24", 1)?);
//! let mut beam = TimberBeam::new(TimberSection::new(47.0, 100.0, c24)?, 3000.0, 1.0)?;
//!
//! let input = DesignInput::new(1.0, 1.0, 12.0);
//! let sized = auto_size::size_from_standard_catalog(&mut beam, &input)?;
//! println!("{}", serde_json::to_string_pretty(&sized.report).unwrap());
//! # Ok::<(), timber_core::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`materials`] - Material types, property tables, resolved materials
//! - [`ec5_factors`] - Modification factors (k_mod, k_h, k_crit, ...)
//! - [`section`] - Rectangular section geometry
//! - [`calculations`] - Beam formulas, utilisation checks, auto-sizing, joists
//! - [`errors`] - Structured error types
//! - [`file_io`] - JSON loading and atomic report saves

pub mod calculations;
pub mod ec5_factors;
pub mod errors;
pub mod file_io;
pub mod materials;
pub mod section;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_report, save_report};
pub use materials::{MaterialType, TimberMaterial};
pub use section::{Axis, TimberSection};
