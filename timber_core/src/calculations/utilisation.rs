//! # Utilisation Checks
//!
//! Ultimate and serviceability checks of a [`TimberBeam`] under permanent and
//! imposed line loads, expressed as utilisation ratios (demand / capacity).
//!
//! | Check       | Ratio                                   |
//! |-------------|-----------------------------------------|
//! | Bending     | σ_m,d / f_m,d                           |
//! | Shear       | τ_d / f_v,d                             |
//! | LTB         | σ_m,d / (k_crit·f_m,d), unless restrained or b ≥ h |
//! | Deflection  | w_fin / w_limit                         |
//!
//! A ratio above 1 is a failing check, not an error. The design moment and
//! shear come from the caller's loads; self-weight is only added by the
//! auto-sizing searches.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use timber_core::calculations::beam::TimberBeam;
//! use timber_core::calculations::utilisation::{check, DesignInput};
//! use timber_core::materials::TimberMaterial;
//! use timber_core::section::TimberSection;
//!
//! let c24 = Arc::new(TimberMaterial::new("softwood", "C24", 1).unwrap());
//! let beam = TimberBeam::new(TimberSection::new(63.0, 175.0, c24).unwrap(), 3000.0, 1.0).unwrap();
//!
//! let input = DesignInput::new(1.0, 1.0, 12.0).with_psi_2(0.3);
//! let result = check(&beam, &input).unwrap();
//! assert!(result.passes());
//! assert_eq!(result.ltb_ur, None);
//! ```

use serde::{Deserialize, Serialize};

use super::beam::{LoadFactors, TimberBeam};
use crate::ec5_factors::{LoadDuration, Notch, SupportCondition};
use crate::errors::{is_positive, CalcError, CalcResult};

/// Design situation for a utilisation check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "permanent_udl": 1.0,
///   "imposed_udl": 1.5,
///   "load_factors": { "permanent": 1.35, "variable": 1.5 },
///   "load_duration": "medium_term",
///   "is_load_sharing": true,
///   "is_restrained": true,
///   "deflection_limit": 12.0,
///   "psi_2": 0.3,
///   "include_creep": true
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignInput {
    /// Permanent line load g_k excluding self-weight (kN/m)
    pub permanent_udl: f64,
    /// Imposed line load q_k (kN/m)
    pub imposed_udl: f64,
    #[serde(default)]
    pub load_factors: LoadFactors,
    #[serde(default)]
    pub load_duration: LoadDuration,
    /// Member is part of a load-sharing system (k_sys = 1.1)
    #[serde(default)]
    pub is_load_sharing: bool,
    /// Compression edge is laterally restrained along its length
    #[serde(default = "default_true")]
    pub is_restrained: bool,
    /// Allowable final deflection (mm)
    pub deflection_limit: f64,
    /// Quasi-permanent combination factor ψ2 for the imposed load
    #[serde(default = "default_psi_2")]
    pub psi_2: f64,
    /// Include creep (k_def) in the final deflection
    #[serde(default = "default_true")]
    pub include_creep: bool,
}

fn default_true() -> bool {
    true
}

fn default_psi_2() -> f64 {
    0.3
}

impl DesignInput {
    /// New design input with medium-term loading, no load sharing, a
    /// restrained compression edge, ψ2 = 0.3 and creep included.
    pub fn new(permanent_udl: f64, imposed_udl: f64, deflection_limit: f64) -> Self {
        Self {
            permanent_udl,
            imposed_udl,
            load_factors: LoadFactors::default(),
            load_duration: LoadDuration::default(),
            is_load_sharing: false,
            is_restrained: true,
            deflection_limit,
            psi_2: default_psi_2(),
            include_creep: true,
        }
    }

    pub fn with_load_factors(mut self, load_factors: LoadFactors) -> Self {
        self.load_factors = load_factors;
        self
    }

    pub fn with_load_duration(mut self, load_duration: LoadDuration) -> Self {
        self.load_duration = load_duration;
        self
    }

    pub fn with_load_sharing(mut self, is_load_sharing: bool) -> Self {
        self.is_load_sharing = is_load_sharing;
        self
    }

    pub fn with_restraint(mut self, is_restrained: bool) -> Self {
        self.is_restrained = is_restrained;
        self
    }

    pub fn with_psi_2(mut self, psi_2: f64) -> Self {
        self.psi_2 = psi_2;
        self
    }

    pub fn with_creep(mut self, include_creep: bool) -> Self {
        self.include_creep = include_creep;
        self
    }

    /// Same input with `extra` kN/m added to the permanent load
    pub fn with_additional_permanent(mut self, extra: f64) -> Self {
        self.permanent_udl += extra;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("permanent_udl", self.permanent_udl), ("imposed_udl", self.imposed_udl)] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Line loads must be finite and non-negative",
                ));
            }
        }
        self.load_factors.validate()?;
        if !is_positive(self.deflection_limit) {
            return Err(CalcError::invalid_input(
                "deflection_limit",
                self.deflection_limit.to_string(),
                "Deflection limit must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.psi_2) {
            return Err(CalcError::invalid_input(
                "psi_2",
                self.psi_2.to_string(),
                "Combination factor must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// One of the four utilisation checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    Bending,
    Shear,
    LateralTorsionalBuckling,
    Deflection,
}

impl CheckKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            CheckKind::Bending => "Bending",
            CheckKind::Shear => "Shear",
            CheckKind::LateralTorsionalBuckling => "Lateral-torsional buckling",
            CheckKind::Deflection => "Deflection",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The four utilisation ratios of one beam.
///
/// `ltb_ur` is `None` when lateral-torsional buckling does not apply; it is
/// written as `"not applicable"` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilisationResult {
    #[serde(rename = "bending_UR")]
    pub bending_ur: f64,
    #[serde(rename = "shear_UR")]
    pub shear_ur: f64,
    #[serde(rename = "LTB_UR", with = "not_applicable")]
    pub ltb_ur: Option<f64>,
    #[serde(rename = "deflection_UR")]
    pub deflection_ur: f64,
}

impl UtilisationResult {
    /// Every applicable ratio with its check
    pub fn ratios(&self) -> impl Iterator<Item = (CheckKind, f64)> {
        [
            (CheckKind::Bending, Some(self.bending_ur)),
            (CheckKind::Shear, Some(self.shear_ur)),
            (CheckKind::LateralTorsionalBuckling, self.ltb_ur),
            (CheckKind::Deflection, Some(self.deflection_ur)),
        ]
        .into_iter()
        .filter_map(|(kind, ratio)| ratio.map(|r| (kind, r)))
    }

    /// Check if every applicable ratio is ≤ 1.0
    pub fn passes(&self) -> bool {
        self.ratios().all(|(_, ratio)| ratio <= 1.0)
    }

    /// Get the governing (highest) utilisation ratio
    pub fn governing_unity(&self) -> f64 {
        self.governing_check().1
    }

    /// Get the check that governs the design and its ratio
    pub fn governing_check(&self) -> (CheckKind, f64) {
        self.ratios()
            .fold((CheckKind::Bending, f64::NEG_INFINITY), |best, current| {
                if current.1 > best.1 {
                    current
                } else {
                    best
                }
            })
    }
}

/// Utilisation report for one section: its size and its ratios.
///
/// ```json
/// { "breadth": 63.0, "height": 175.0, "bending_UR": 0.69, "shear_UR": 0.36,
///   "LTB_UR": "not applicable", "deflection_UR": 0.85 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignReport {
    /// Section breadth (mm)
    pub breadth: f64,
    /// Section height (mm)
    pub height: f64,
    #[serde(flatten)]
    pub utilisation: UtilisationResult,
}

impl DesignReport {
    pub fn new(breadth: f64, height: f64, utilisation: UtilisationResult) -> Self {
        Self { breadth, height, utilisation }
    }

    pub fn passes(&self) -> bool {
        self.utilisation.passes()
    }
}

/// σ_m,d / f_m,d
pub fn bending_utilisation(beam: &TimberBeam, input: &DesignInput) -> f64 {
    let moment = beam.design_bending_moment(input.permanent_udl, input.imposed_udl, &input.load_factors);
    beam.bending_stress(moment) / beam.bending_strength(input.load_duration, input.is_load_sharing)
}

/// τ_d / f_v,d
pub fn shear_utilisation(beam: &TimberBeam, input: &DesignInput) -> f64 {
    let shear = beam.design_shear_force(input.permanent_udl, input.imposed_udl, &input.load_factors);
    beam.shear_stress(shear) / beam.shear_strength(input.load_duration, input.is_load_sharing)
}

/// σ_m,d / (k_crit·f_m,d), or `None` if the beam is restrained or b ≥ h
pub fn lateral_torsional_buckling_utilisation(beam: &TimberBeam, input: &DesignInput) -> CalcResult<Option<f64>> {
    if input.is_restrained || beam.breadth() >= beam.height() {
        return Ok(None);
    }
    let moment = beam.design_bending_moment(input.permanent_udl, input.imposed_udl, &input.load_factors);
    let buckling_strength = beam.buckling_strength(input.load_duration, input.is_load_sharing)?;
    Ok(Some(beam.bending_stress(moment) / buckling_strength))
}

/// w_fin / w_limit
pub fn deflection_utilisation(beam: &TimberBeam, input: &DesignInput) -> f64 {
    beam.final_deflection(input.permanent_udl, input.imposed_udl, input.psi_2, input.include_creep)
        / input.deflection_limit
}

/// Bearing stress over bearing strength at one support.
///
/// Not part of the four-ratio report.
pub fn bearing_utilisation(
    beam: &TimberBeam,
    input: &DesignInput,
    bearing_length: f64,
    support: SupportCondition,
) -> CalcResult<f64> {
    input.validate()?;
    if !is_positive(bearing_length) {
        return Err(CalcError::non_positive_dimension("bearing_length", bearing_length));
    }
    let shear = beam.design_shear_force(input.permanent_udl, input.imposed_udl, &input.load_factors);
    Ok(beam.bearing_stress(bearing_length, shear) / beam.bearing_strength(input.load_duration, support))
}

/// Shear at a notched support, τ_d / (k_v·f_v,d).
///
/// The shear stress acts on the effective height at the notch; the notch
/// height must match the beam's height. Not part of the four-ratio report.
pub fn notched_shear_utilisation(beam: &TimberBeam, input: &DesignInput, notch: &Notch) -> CalcResult<f64> {
    input.validate()?;
    if notch.height != beam.height() {
        return Err(CalcError::invalid_input(
            "notch.height",
            notch.height.to_string(),
            format!("Notch height must equal the beam height of {}mm", beam.height()),
        ));
    }
    let k_v = beam.material().k_v(notch)?;
    let shear = beam.design_shear_force(input.permanent_udl, input.imposed_udl, &input.load_factors);
    let stress = beam.shear_stress(shear) * beam.height() / notch.effective_height();
    Ok(stress / (k_v * beam.shear_strength(input.load_duration, input.is_load_sharing)))
}

/// Run all four checks.
///
/// # Errors
///
/// Fails on invalid input, or when the LTB check applies and G_0,05 is
/// neither declared nor derivable for the material.
pub fn check(beam: &TimberBeam, input: &DesignInput) -> CalcResult<UtilisationResult> {
    input.validate()?;
    Ok(UtilisationResult {
        bending_ur: bending_utilisation(beam, input),
        shear_ur: shear_utilisation(beam, input),
        ltb_ur: lateral_torsional_buckling_utilisation(beam, input)?,
        deflection_ur: deflection_utilisation(beam, input),
    })
}

/// Serde adapter writing `None` as the string "not applicable"
mod not_applicable {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    const NOT_APPLICABLE: &str = "not applicable";

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ratio) => serializer.serialize_f64(*ratio),
            None => serializer.serialize_str(NOT_APPLICABLE),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        deserializer.deserialize_any(RatioVisitor)
    }

    struct RatioVisitor;

    impl<'de> Visitor<'de> for RatioVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a number, null or \"{}\"", NOT_APPLICABLE)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            if v.eq_ignore_ascii_case(NOT_APPLICABLE) {
                Ok(None)
            } else {
                Err(E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::TimberMaterial;
    use crate::section::TimberSection;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn c24_beam(breadth: f64, height: f64, length: f64) -> TimberBeam {
        let c24 = Arc::new(TimberMaterial::new("softwood", "C24", 1).unwrap());
        TimberBeam::new(TimberSection::new(breadth, height, c24).unwrap(), length, 1.0).unwrap()
    }

    #[test]
    fn test_individual_checks() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        let input = DesignInput::new(1.0, 1.0, 12.0);

        assert_relative_eq!(
            bending_utilisation(&beam, &input),
            10.23271276595745 / 14.76923076923077,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            shear_utilisation(&beam, &input),
            1.018180374722134 / 2.4615384615384617,
            max_relative = 1e-12
        );
        assert_relative_eq!(deflection_utilisation(&beam, &input), 9.085491390547473 / 12.0, max_relative = 1e-12);
    }

    #[test]
    fn test_ltb_applies_when_unrestrained() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        let input = DesignInput::new(1.0, 1.0, 12.0).with_restraint(false);
        let ltb = lateral_torsional_buckling_utilisation(&beam, &input).unwrap().unwrap();
        assert_relative_eq!(ltb, 10.23271276595745 / 11.268296404886767, max_relative = 1e-9);

        let result = check(&beam, &input).unwrap();
        assert_eq!(result.governing_check().0, CheckKind::LateralTorsionalBuckling);
    }

    #[test]
    fn test_ltb_not_applicable_for_wide_sections() {
        for restrained in [true, false] {
            let input = DesignInput::new(1.0, 1.0, 12.0).with_restraint(restrained);
            for (b, h) in [(200.0, 200.0), (200.0, 100.0)] {
                let beam = c24_beam(b, h, 3000.0);
                assert_eq!(check(&beam, &input).unwrap().ltb_ur, None);
            }
        }
    }

    #[test]
    fn test_passes_ignores_not_applicable() {
        let result = UtilisationResult {
            bending_ur: 0.5,
            shear_ur: 0.2,
            ltb_ur: None,
            deflection_ur: 1.0,
        };
        assert!(result.passes());
        assert_eq!(result.governing_check(), (CheckKind::Deflection, 1.0));

        let failing = UtilisationResult {
            ltb_ur: Some(1.01),
            ..result
        };
        assert!(!failing.passes());
        assert_eq!(failing.governing_unity(), 1.01);
    }

    #[test]
    fn test_bearing_utilisation() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        let input = DesignInput::new(1.0, 1.0, 12.0);
        let ur = bearing_utilisation(&beam, &input, 100.0, SupportCondition::Continuous).unwrap();
        assert_relative_eq!(ur, 0.9095744680851063 / 1.923076923076923, max_relative = 1e-12);
        assert!(bearing_utilisation(&beam, &input, 0.0, SupportCondition::Continuous).is_err());
    }

    #[test]
    fn test_notched_shear_utilisation() {
        use crate::ec5_factors::NotchPosition;

        let beam = c24_beam(47.0, 200.0, 3000.0);
        let input = DesignInput::new(1.0, 1.0, 12.0);
        let plain = shear_utilisation(&beam, &input);

        let top = Notch::square(200.0, 50.0, 100.0, 20.0, NotchPosition::Top);
        let ur = notched_shear_utilisation(&beam, &input, &top).unwrap();
        assert_relative_eq!(ur, plain * 200.0 / 150.0, max_relative = 1e-12);

        let bottom = Notch::square(200.0, 50.0, 100.0, 20.0, NotchPosition::Bottom);
        let ur = notched_shear_utilisation(&beam, &input, &bottom).unwrap();
        assert_relative_eq!(ur, plain * 200.0 / 150.0 / 0.5208163675792168, max_relative = 1e-9);

        let wrong_height = Notch::square(225.0, 50.0, 100.0, 20.0, NotchPosition::Bottom);
        assert!(notched_shear_utilisation(&beam, &input, &wrong_height).is_err());
    }

    #[test]
    fn test_invalid_input_rejected() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        assert!(check(&beam, &DesignInput::new(1.0, 1.0, 0.0)).is_err());
        assert!(check(&beam, &DesignInput::new(-1.0, 1.0, 12.0)).is_err());
        assert!(check(&beam, &DesignInput::new(1.0, 1.0, 12.0).with_psi_2(1.5)).is_err());
        let bad_factors = LoadFactors { permanent: 0.0, variable: 1.5 };
        assert!(check(&beam, &DesignInput::new(1.0, 1.0, 12.0).with_load_factors(bad_factors)).is_err());
    }

    #[test]
    fn test_report_json_keys() {
        let report = DesignReport::new(
            63.0,
            175.0,
            UtilisationResult {
                bending_ur: 0.5,
                shear_ur: 0.25,
                ltb_ur: None,
                deflection_ur: 0.75,
            },
        );
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["breadth"], 63.0);
        assert_eq!(json["bending_UR"], 0.5);
        assert_eq!(json["LTB_UR"], "not applicable");
        assert_eq!(json["deflection_UR"], 0.75);

        let loaded: DesignReport = serde_json::from_value(json).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_report_reads_numeric_ltb() {
        let json = r#"{ "breadth": 47, "height": 200, "bending_UR": 0.7, "shear_UR": 0.4,
                        "LTB_UR": 0.9, "deflection_UR": 0.8 }"#;
        let report: DesignReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.utilisation.ltb_ur, Some(0.9));
        assert_eq!(report.breadth, 47.0);
    }

    #[test]
    fn test_design_input_defaults_from_json() {
        let json = r#"{ "permanent_udl": 1.0, "imposed_udl": 1.5, "deflection_limit": 12.0 }"#;
        let input: DesignInput = serde_json::from_str(json).unwrap();
        assert_eq!(input, DesignInput::new(1.0, 1.5, 12.0));
    }
}
