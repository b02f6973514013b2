//! # Section Auto-Sizing
//!
//! Searches that drive a beam's geometry toward the smallest section passing
//! every utilisation check:
//!
//! - [`size_from_catalog`] - standard breadth/height lists per material,
//!   heights ascending (outer) then breadths ascending (inner)
//! - [`size_by_height`] - fixed breadth, height grown in steps up to a cap;
//!   stops early if lateral-torsional buckling gets worse
//! - [`size_by_breadth`] - fixed height, breadth grown in steps up to a cap
//!
//! Each evaluation adds the beam's self-weight to the permanent load. The beam
//! is left at the size reported in the result, or at its entry size when the
//! search returns an error. Running out of sizes is a degraded
//! [`SizingResult`], not an error.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use timber_core::calculations::auto_size::{size_from_catalog, SearchOutcome, SectionCatalogs};
//! use timber_core::calculations::beam::TimberBeam;
//! use timber_core::calculations::utilisation::DesignInput;
//! use timber_core::materials::TimberMaterial;
//! use timber_core::section::TimberSection;
//!
//! let c24 = Arc::new(TimberMaterial::new("softwood", "C24", 1).unwrap());
//! let mut beam = TimberBeam::new(TimberSection::new(38.0, 75.0, c24).unwrap(), 3000.0, 1.0).unwrap();
//!
//! let input = DesignInput::new(1.0, 1.0, 12.0);
//! let sized = size_from_catalog(&mut beam, &input, SectionCatalogs::builtin().unwrap()).unwrap();
//! assert_eq!(sized.outcome, SearchOutcome::Passed);
//! assert_eq!((sized.report.breadth, sized.report.height), (63.0, 175.0));
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::beam::TimberBeam;
use super::utilisation::{check, DesignInput, DesignReport, UtilisationResult};
use crate::errors::{is_positive, CalcError, CalcResult};
use crate::file_io::read_json_file;
use crate::materials::MaterialType;

const SECTION_CATALOGS: &str = include_str!("../../data/section_catalogs.json");

static BUILTIN: Lazy<CalcResult<SectionCatalogs>> = Lazy::new(|| SectionCatalogs::from_json(SECTION_CATALOGS));

/// Standard breadths and heights for one material type (mm, ascending)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCatalog {
    pub breadths: Vec<f64>,
    pub heights: Vec<f64>,
}

impl SectionCatalog {
    pub fn validate(&self, material_type: MaterialType) -> CalcResult<()> {
        for (name, sizes) in [("breadths", &self.breadths), ("heights", &self.heights)] {
            let field = format!("{}.{}", material_type.code(), name);
            if sizes.is_empty() {
                return Err(CalcError::invalid_input(field, "[]", "Catalog size list cannot be empty"));
            }
            if let Some(bad) = sizes.iter().find(|&&size| !is_positive(size)) {
                return Err(CalcError::invalid_input(field, bad.to_string(), "Catalog sizes must be positive"));
            }
            if sizes.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(CalcError::invalid_input(
                    field,
                    format!("{:?}", sizes),
                    "Catalog sizes must be strictly ascending",
                ));
            }
        }
        Ok(())
    }

    /// Number of (breadth, height) combinations
    pub fn len(&self) -> usize {
        self.breadths.len() * self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Section catalogs keyed by material type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionCatalogs {
    catalogs: BTreeMap<MaterialType, SectionCatalog>,
}

impl SectionCatalogs {
    /// The embedded standard catalogs.
    pub fn builtin() -> CalcResult<&'static SectionCatalogs> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Parse and validate catalogs from a JSON string.
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let catalogs: SectionCatalogs =
            serde_json::from_str(json).map_err(|e| CalcError::serialization(format!("section catalogs: {}", e)))?;
        catalogs.validate()?;
        Ok(catalogs)
    }

    /// Load and validate catalogs from a JSON file.
    pub fn from_file(path: &Path) -> CalcResult<Self> {
        let catalogs: SectionCatalogs = read_json_file(path)?;
        catalogs.validate()?;
        debug!(path = %path.display(), materials = catalogs.catalogs.len(), "loaded section catalogs");
        Ok(catalogs)
    }

    pub fn validate(&self) -> CalcResult<()> {
        for (material_type, catalog) in &self.catalogs {
            catalog.validate(*material_type)?;
        }
        Ok(())
    }

    /// Insert or replace the catalog for a material type.
    pub fn insert(&mut self, material_type: MaterialType, catalog: SectionCatalog) -> CalcResult<()> {
        catalog.validate(material_type)?;
        self.catalogs.insert(material_type, catalog);
        Ok(())
    }

    /// Catalog for a material type
    pub fn get(&self, material_type: MaterialType) -> CalcResult<&SectionCatalog> {
        self.catalogs
            .get(&material_type)
            .ok_or_else(|| CalcError::unsupported_material_type(material_type.code()))
    }
}

/// Why a search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A section passing every check was found
    Passed,
    /// No catalog section passes; the largest one is reported
    CatalogExhausted,
    /// The size cap was evaluated and still fails
    CapReached,
    /// Growing the height made lateral-torsional buckling worse; the
    /// previous size is reported
    BucklingWorsened,
}

impl SearchOutcome {
    pub fn display_name(&self) -> &'static str {
        match self {
            SearchOutcome::Passed => "Passed",
            SearchOutcome::CatalogExhausted => "No catalog section passes",
            SearchOutcome::CapReached => "Size cap reached",
            SearchOutcome::BucklingWorsened => "Increasing height worsens lateral-torsional buckling",
        }
    }
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Result of an auto-sizing search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub report: DesignReport,
    pub outcome: SearchOutcome,
    /// Number of sections evaluated
    pub evaluations: usize,
}

impl SizingResult {
    pub fn passes(&self) -> bool {
        self.outcome == SearchOutcome::Passed
    }
}

/// Start, step and cap of an incremental search (mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncrementalSearch {
    pub start: f64,
    pub step: f64,
    pub cap: f64,
}

impl IncrementalSearch {
    /// Height search: 100 mm upwards in 5 mm steps, capped at 600 mm
    pub fn height() -> Self {
        Self { start: 100.0, step: 5.0, cap: 600.0 }
    }

    /// Breadth search: 40 mm upwards in 5 mm steps, capped at 300 mm
    pub fn breadth() -> Self {
        Self { start: 40.0, step: 5.0, cap: 300.0 }
    }

    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_cap(mut self, cap: f64) -> Self {
        self.cap = cap;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("start", self.start), ("step", self.step), ("cap", self.cap)] {
            if !is_positive(value) || !value.is_finite() {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Search start, step and cap must be positive",
                ));
            }
        }
        if self.start > self.cap {
            return Err(CalcError::invalid_input(
                "start",
                self.start.to_string(),
                format!("Search start exceeds the cap of {}mm", self.cap),
            ));
        }
        // a step that cannot move the cap cannot move any smaller size either
        if self.start + self.step <= self.start || self.cap + self.step <= self.cap {
            return Err(CalcError::invalid_input(
                "step",
                self.step.to_string(),
                "Search step is too small to change the size",
            ));
        }
        Ok(())
    }

    /// Sections a full search evaluates, start and cap included
    pub fn max_evaluations(&self) -> usize {
        ((self.cap - self.start) / self.step).ceil() as usize + 1
    }
}

/// Utilisation of the beam's current geometry with self-weight included
fn evaluate(beam: &TimberBeam, input: &DesignInput) -> CalcResult<UtilisationResult> {
    let loaded = input.with_additional_permanent(beam.selfweight_per_m());
    let result = check(beam, &loaded)?;
    debug!(
        breadth = beam.breadth(),
        height = beam.height(),
        governing = result.governing_unity(),
        passes = result.passes(),
        "evaluated section"
    );
    Ok(result)
}

fn finish(
    beam: &TimberBeam,
    utilisation: UtilisationResult,
    outcome: SearchOutcome,
    evaluations: usize,
) -> SizingResult {
    let report = DesignReport::new(beam.breadth(), beam.height(), utilisation);
    match outcome {
        SearchOutcome::Passed => info!(breadth = report.breadth, height = report.height, evaluations, "section passes"),
        _ => warn!(
            breadth = report.breadth,
            height = report.height,
            evaluations,
            outcome = %outcome,
            "no passing section found"
        ),
    }
    SizingResult { report, outcome, evaluations }
}

/// Size the beam from a list of standard sections.
///
/// Returns the first passing (height, breadth) pair, smallest height first.
/// If none passes, the beam is left at the largest section and its failing
/// report is returned with [`SearchOutcome::CatalogExhausted`].
///
/// # Errors
///
/// [`CalcError::UnsupportedMaterialType`] when `catalogs` has no entry for the
/// beam's material; the beam is not modified.
pub fn size_from_catalog(
    beam: &mut TimberBeam,
    input: &DesignInput,
    catalogs: &SectionCatalogs,
) -> CalcResult<SizingResult> {
    input.validate()?;
    let catalog = catalogs.get(beam.material().material_type())?;
    restoring_on_error(beam, |beam| catalog_search(beam, input, catalog))
}

fn catalog_search(beam: &mut TimberBeam, input: &DesignInput, catalog: &SectionCatalog) -> CalcResult<SizingResult> {
    let mut evaluations = 0;
    let mut last = None;
    for &height in &catalog.heights {
        for &breadth in &catalog.breadths {
            beam.set_dimensions(breadth, height)?;
            let result = evaluate(beam, input)?;
            evaluations += 1;
            if result.passes() {
                return Ok(finish(beam, result, SearchOutcome::Passed, evaluations));
            }
            last = Some(result);
        }
    }

    match last {
        Some(result) => Ok(finish(beam, result, SearchOutcome::CatalogExhausted, evaluations)),
        None => Err(CalcError::invalid_input(
            "section_catalog",
            beam.material().material_type().code(),
            "Section catalog is empty",
        )),
    }
}

/// Size the beam with the standard catalogs for its material.
pub fn size_from_standard_catalog(beam: &mut TimberBeam, input: &DesignInput) -> CalcResult<SizingResult> {
    size_from_catalog(beam, input, SectionCatalogs::builtin()?)
}

/// Run a search, putting the beam back to its entry size if it fails.
fn restoring_on_error(
    beam: &mut TimberBeam,
    search: impl FnOnce(&mut TimberBeam) -> CalcResult<SizingResult>,
) -> CalcResult<SizingResult> {
    let (breadth, height) = (beam.breadth(), beam.height());
    let result = search(beam);
    if result.is_err() {
        // the entry size was accepted once, so setting it again succeeds
        let _ = beam.set_dimensions(breadth, height);
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Breadth,
    Height,
}

impl Dimension {
    fn get(self, beam: &TimberBeam) -> f64 {
        match self {
            Dimension::Breadth => beam.breadth(),
            Dimension::Height => beam.height(),
        }
    }

    fn set(self, beam: &mut TimberBeam, value: f64) -> CalcResult<()> {
        match self {
            Dimension::Breadth => beam.set_breadth(value),
            Dimension::Height => beam.set_height(value),
        }
    }
}

fn incremental_search(
    beam: &mut TimberBeam,
    input: &DesignInput,
    search: &IncrementalSearch,
    dimension: Dimension,
) -> CalcResult<SizingResult> {
    input.validate()?;
    search.validate()?;
    restoring_on_error(beam, |beam| step_search(beam, input, search, dimension))
}

fn step_search(
    beam: &mut TimberBeam,
    input: &DesignInput,
    search: &IncrementalSearch,
    dimension: Dimension,
) -> CalcResult<SizingResult> {
    dimension.set(beam, search.start)?;
    let mut result = evaluate(beam, input)?;
    let mut evaluations = 1;
    let max_evaluations = search.max_evaluations();

    let outcome = loop {
        if result.passes() {
            break SearchOutcome::Passed;
        }
        let current = dimension.get(beam);
        let next = (current + search.step).min(search.cap);
        // one spare evaluation absorbs rounding accumulated in current + step
        if current >= search.cap || next <= current || evaluations > max_evaluations {
            break SearchOutcome::CapReached;
        }

        dimension.set(beam, next)?;
        let candidate = evaluate(beam, input)?;
        evaluations += 1;

        if dimension == Dimension::Height {
            if let (Some(previous_ltb), Some(ltb)) = (result.ltb_ur, candidate.ltb_ur) {
                if ltb > previous_ltb {
                    warn!(
                        height = next,
                        previous_ltb,
                        ltb,
                        "increasing height is making lateral torsional buckling worse"
                    );
                    dimension.set(beam, current)?;
                    break SearchOutcome::BucklingWorsened;
                }
            }
        }
        result = candidate;
    };

    Ok(finish(beam, result, outcome, evaluations))
}

/// Grow the height at fixed breadth until every check passes.
///
/// The height runs from `search.start` in `search.step` increments; the last
/// step is clamped to `search.cap`. If the LTB ratio rises between two
/// iterations the search stops and reports the previous height.
pub fn size_by_height(
    beam: &mut TimberBeam,
    input: &DesignInput,
    search: &IncrementalSearch,
) -> CalcResult<SizingResult> {
    incremental_search(beam, input, search, Dimension::Height)
}

/// Grow the breadth at fixed height until every check passes.
pub fn size_by_breadth(
    beam: &mut TimberBeam,
    input: &DesignInput,
    search: &IncrementalSearch,
) -> CalcResult<SizingResult> {
    incremental_search(beam, input, search, Dimension::Breadth)
}
