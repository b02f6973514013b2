//! # Softwood Floor Joists
//!
//! Floor vibration checks (EC5 7.3 with UK NA 2.7) and empirical trimmer spans
//! for C16/C24 solid softwood joists in service class 1.
//!
//! Floor-level quantities use these units:
//!
//! - mass of floor per unit area `m`: kg/m²
//! - stiffness per metre width (EI/spacing): N·mm²/m
//! - joist stiffness EI: kN·mm² for the point-load deflection
//!
//! ## Example
//!
//! ```rust
//! use timber_core::calculations::joist::TimberJoist;
//!
//! let joist = TimberJoist::new(4500.0, 3600.0, 47.0, 200.0, "C24").unwrap();
//! let a = joist.deflection_limit_for_1kn_point_load();
//! let b = joist.constant_for_unit_impulse_velocity();
//! println!("a = {:.2} mm/kN, b = {:.1}", a, b);
//! ```

use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::beam::TimberBeam;
use crate::ec5_factors::{JoistType, ServiceClass};
use crate::errors::{is_positive, CalcError, CalcResult};
use crate::materials::{MaterialType, PropertyStore, TimberMaterial};
use crate::section::TimberSection;

/// Strength grades covered by the trimmer span tables
pub const JOIST_GRADES: [&str; 2] = ["C16", "C24"];

/// Span multiplier for C24 in the trimmer span formulas
const C24_SPAN_COEFFICIENT: f64 = 1.075;

/// A solid softwood floor joist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimberJoist {
    beam: TimberBeam,
    floor_width: f64,
}

impl TimberJoist {
    /// Create a joist of the given span, floor width and section (all mm).
    ///
    /// # Errors
    ///
    /// Non-positive dimensions, or a grade other than C16/C24.
    pub fn new(length: f64, floor_width: f64, breadth: f64, height: f64, softwood_grade: &str) -> CalcResult<Self> {
        if !JOIST_GRADES.contains(&softwood_grade) {
            return Err(CalcError::InvalidStrengthGrade {
                material_type: MaterialType::Softwood.code().to_string(),
                strength_grade: softwood_grade.to_string(),
                available: JOIST_GRADES.iter().map(|g| g.to_string()).collect(),
            });
        }
        check_floor_width(floor_width)?;
        let material = TimberMaterial::from_store(
            PropertyStore::builtin()?,
            MaterialType::Softwood,
            softwood_grade,
            ServiceClass::One,
        )?;
        let section = TimberSection::new(breadth, height, Arc::new(material))?;
        Ok(Self {
            beam: TimberBeam::new(section, length, 1.0)?,
            floor_width,
        })
    }

    pub fn beam(&self) -> &TimberBeam {
        &self.beam
    }

    /// Mutable beam, e.g. to run an auto-sizing search on the joist
    pub fn beam_mut(&mut self) -> &mut TimberBeam {
        &mut self.beam
    }

    /// Floor width B perpendicular to the joists (mm)
    pub fn floor_width(&self) -> f64 {
        self.floor_width
    }

    pub fn set_floor_width(&mut self, floor_width: f64) -> CalcResult<()> {
        check_floor_width(floor_width)?;
        self.floor_width = floor_width;
        Ok(())
    }

    fn span_m(&self) -> f64 {
        self.beam.length() / 1000.0
    }

    fn grade_coefficient(&self) -> f64 {
        if self.beam.material().strength_grade() == "C24" {
            C24_SPAN_COEFFICIENT
        } else {
            1.0
        }
    }

    /// Limit `a` on the instantaneous deflection under a 1 kN point load
    /// (mm/kN, UK NA Table NA.6)
    pub fn deflection_limit_for_1kn_point_load(&self) -> f64 {
        let length = self.beam.length();
        if length <= 4000.0 {
            1.8
        } else {
            16500.0 / length.powf(1.1)
        }
    }

    /// Constant `b` for the unit impulse velocity limit (EC5 Figure 7.2, UK NA)
    pub fn constant_for_unit_impulse_velocity(&self) -> f64 {
        let a = self.deflection_limit_for_1kn_point_load();
        if a <= 1.0 {
            180.0 - 60.0 * a
        } else {
            160.0 - 40.0 * a
        }
    }

    /// Fundamental frequency f1 (Hz, EC5 eq 7.5)
    ///
    /// `joist_stiffness_per_metre` is EI/spacing of the joists alone (N·mm²/m);
    /// `floor_mass` includes joists, boarding and ceiling (kg/m²).
    pub fn fundamental_frequency(&self, joist_stiffness_per_metre: f64, floor_mass: f64) -> f64 {
        let span = self.span_m();
        PI / (2.0 * span.powi(2)) * ((joist_stiffness_per_metre / 1e6) / floor_mass).sqrt()
    }

    /// Limit on the unit impulse velocity response, b^(f1·ζ - 1) (m/Ns²)
    pub fn impulse_velocity_limit(&self, fundamental_frequency: f64, modal_damping_ratio: f64) -> f64 {
        self.constant_for_unit_impulse_velocity().powf(fundamental_frequency * modal_damping_ratio - 1.0)
    }

    /// Unit impulse velocity response v (m/Ns², EC5 eq 7.6)
    pub fn impulse_velocity_response(&self, n_40: f64, floor_mass: f64) -> f64 {
        let width = self.floor_width / 1000.0;
        4.0 * (0.4 + 0.6 * n_40) / (floor_mass * width * self.span_m() + 200.0)
    }

    /// Instantaneous deflection under a 1 kN point load (mm)
    ///
    /// `equivalent_length` in mm, `joist_stiffness` EI in kN·mm².
    pub fn instantaneous_deflection_under_point_load(
        &self,
        k_dist: f64,
        k_amp: f64,
        equivalent_length: f64,
        joist_stiffness: f64,
    ) -> f64 {
        1000.0 * k_dist * equivalent_length.powi(3) * k_amp / (48.0 * joist_stiffness)
    }

    /// Number of first-order modes below 40 Hz, n_40 (EC5 eq 7.7)
    ///
    /// `floor_stiffness_per_metre` is the floor plate stiffness perpendicular
    /// to the joists (N·mm²/m).
    pub fn number_of_first_order_modes(
        &self,
        floor_mass: f64,
        floor_stiffness_per_metre: f64,
        joist_stiffness_per_metre: f64,
    ) -> f64 {
        let f1 = self.fundamental_frequency(joist_stiffness_per_metre, floor_mass);
        let width = self.floor_width / 1000.0;
        let aspect = width / self.span_m();
        (((40.0 / f1).powi(2) - 1.0) * aspect.powi(4) * (joist_stiffness_per_metre / floor_stiffness_per_metre))
            .powf(0.25)
    }

    /// Proportion of a point load carried by the loaded joist (UK NA 2.7.2)
    pub fn k_dist(&self, floor_stiffness_per_metre: f64, joist_spacing: f64, is_strutted: bool) -> f64 {
        let k_strut = TimberMaterial::k_strut(is_strutted);
        let k_dist = k_strut * (0.38 - 0.08 * (14.0 * floor_stiffness_per_metre / joist_spacing.powi(4)).ln());
        k_dist.max(0.3)
    }

    /// Amplification factor for shear deflection or joint slip
    pub fn k_amp(joist_type: JoistType) -> f64 {
        TimberMaterial::k_amp(joist_type)
    }

    /// Maximum span of a doubled trimmer (mm).
    ///
    /// Breadth is that of one ply; the trimmer is two joists side by side.
    pub fn max_trimmer_span(&self, span_of_joists_onto_trimmer: f64) -> f64 {
        0.165
            * (-0.308 * span_of_joists_onto_trimmer / 1000.0 + 3.38)
            * (0.0214 * self.beam.breadth() + 1.12)
            * (0.0149 * self.beam.height() - 0.073)
            * 1000.0
            * self.grade_coefficient()
    }

    /// Maximum span of a doubled trimming joist carrying a trimmer (mm).
    pub fn max_trimming_joist_span(&self, span_of_trimmed_joists: f64, span_of_supported_trimmer: f64) -> f64 {
        0.032
            * (-0.31 * span_of_supported_trimmer / 1000.0 + 3.8)
            * (-1.52 * span_of_trimmed_joists / self.beam.length() + 3.93)
            * (0.022 * self.beam.breadth() + 1.79)
            * (0.0196 * self.beam.height() - 0.16)
            * 1000.0
            * self.grade_coefficient()
    }
}

fn check_floor_width(floor_width: f64) -> CalcResult<()> {
    if !is_positive(floor_width) {
        return Err(CalcError::non_positive_dimension("floor_width", floor_width));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Axis;
    use approx::assert_relative_eq;

    fn joist() -> TimberJoist {
        TimberJoist::new(4500.0, 3600.0, 47.0, 200.0, "C24").unwrap()
    }

    fn joist_stiffness(joist: &TimberJoist) -> f64 {
        joist.beam().material().properties().e_0_mean * joist.beam().section().second_moment_of_area(Axis::Major)
    }

    #[test]
    fn test_grade_restricted() {
        assert!(TimberJoist::new(4500.0, 3600.0, 47.0, 200.0, "C16").is_ok());
        match TimberJoist::new(4500.0, 3600.0, 47.0, 200.0, "C30") {
            Err(CalcError::InvalidStrengthGrade { available, .. }) => assert_eq!(available, vec!["C16", "C24"]),
            other => panic!("expected InvalidStrengthGrade, got {:?}", other),
        }
        assert!(TimberJoist::new(4500.0, 0.0, 47.0, 200.0, "C24").is_err());
    }

    #[test]
    fn test_floor_width_setter() {
        let mut j = joist();
        assert!(j.set_floor_width(-1.0).is_err());
        assert_eq!(j.floor_width(), 3600.0);
        j.set_floor_width(4000.0).unwrap();
        assert_eq!(j.floor_width(), 4000.0);
    }

    #[test]
    fn test_vibration_constants() {
        let j = joist();
        assert_relative_eq!(j.deflection_limit_for_1kn_point_load(), 1.5810666537201148, max_relative = 1e-12);
        assert_relative_eq!(j.constant_for_unit_impulse_velocity(), 96.75733385119541, max_relative = 1e-12);

        let short = TimberJoist::new(3600.0, 3600.0, 47.0, 200.0, "C24").unwrap();
        assert_eq!(short.deflection_limit_for_1kn_point_load(), 1.8);
        assert_relative_eq!(short.constant_for_unit_impulse_velocity(), 88.0);
    }

    #[test]
    fn test_floor_response() {
        let j = joist();
        let stiffness_per_metre = joist_stiffness(&j) / 0.4;
        let f1 = j.fundamental_frequency(stiffness_per_metre, 40.0);
        assert_relative_eq!(f1, 11.385038410692566, max_relative = 1e-12);

        let n_40 = j.number_of_first_order_modes(40.0, 0.05 * stiffness_per_metre, stiffness_per_metre);
        assert_relative_eq!(n_40, 3.1048290917304753, max_relative = 1e-12);
        assert_relative_eq!(j.impulse_velocity_response(n_40, 40.0), 0.010674044599237193, max_relative = 1e-12);
        assert_relative_eq!(j.impulse_velocity_limit(f1, 0.02), 0.029272367911424003, max_relative = 1e-12);
    }

    #[test]
    fn test_point_load_deflection() {
        let j = joist();
        let stiffness_per_metre = joist_stiffness(&j) / 0.4;
        assert_eq!(j.k_dist(0.05 * stiffness_per_metre, 400.0, true), 0.3);
        assert_relative_eq!(j.k_dist(1e7, 400.0, true), 0.7727955241298079, max_relative = 1e-12);

        let k_amp = TimberJoist::k_amp(JoistType::SolidTimber);
        assert_eq!(k_amp, 1.05);
        let deflection = j.instantaneous_deflection_under_point_load(0.4, k_amp, 4500.0, joist_stiffness(&j) * 1e-3);
        assert_relative_eq!(deflection, 2313.3764506769826, max_relative = 1e-12);
    }

    #[test]
    fn test_trimmer_spans() {
        let j = joist();
        assert_relative_eq!(j.max_trimmer_span(3000.0), 2692.0815114797997, max_relative = 1e-12);
        assert_relative_eq!(j.max_trimming_joist_span(3000.0, 2000.0), 3387.8556543999994, max_relative = 1e-12);

        let c16 = TimberJoist::new(4500.0, 3600.0, 47.0, 200.0, "C16").unwrap();
        assert_relative_eq!(c16.max_trimmer_span(3000.0) * 1.075, j.max_trimmer_span(3000.0), max_relative = 1e-12);
    }
}
