//! # Structural Calculations
//!
//! Each calculation works on a [`beam::TimberBeam`] and a JSON-serializable
//! input, and returns a JSON-serializable result:
//!
//! - [`beam`] - Simply-supported beam: actions, stresses, strengths, deflections
//! - [`utilisation`] - Bending, shear, lateral-torsional buckling and deflection checks
//! - [`auto_size`] - Catalog, height and breadth sizing searches
//! - [`joist`] - Floor vibration and trimmer spans for softwood joists

pub mod auto_size;
pub mod beam;
pub mod joist;
pub mod utilisation;

// Re-export commonly used types
pub use auto_size::{IncrementalSearch, SearchOutcome, SectionCatalog, SectionCatalogs, SizingResult};
pub use beam::{LoadFactors, TimberBeam};
pub use joist::TimberJoist;
pub use utilisation::{CheckKind, DesignInput, DesignReport, UtilisationResult};
