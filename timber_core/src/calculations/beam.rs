//! # Simply-Supported Timber Beam
//!
//! A [`TimberSection`] bound to a span and an effective-length factor, with the
//! stress, strength and deflection formulas of EN 1995-1-1.
//!
//! ## Units
//!
//! - Dimensions and span: mm
//! - Line loads: kN/m (numerically equal to N/mm)
//! - Moments: kNm, shear forces: kN
//! - Stresses and strengths: N/mm²
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use timber_core::calculations::beam::{LoadFactors, TimberBeam};
//! use timber_core::ec5_factors::LoadDuration;
//! use timber_core::materials::TimberMaterial;
//! use timber_core::section::TimberSection;
//!
//! let c24 = Arc::new(TimberMaterial::new("softwood", "C24", 1).unwrap());
//! let section = TimberSection::new(47.0, 200.0, c24).unwrap();
//! let beam = TimberBeam::new(section, 3000.0, 1.0).unwrap();
//!
//! let m = beam.design_bending_moment(1.0, 1.0, &LoadFactors::default());
//! let sigma = beam.bending_stress(m);
//! let f_m_d = beam.bending_strength(LoadDuration::MediumTerm, false);
//! println!("σ_m = {:.2} N/mm², f_m,d = {:.2} N/mm²", sigma, f_m_d);
//! assert!(sigma < f_m_d);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::ec5_factors::{LoadDuration, ServiceClass, SupportCondition};
use crate::errors::{is_positive, CalcError, CalcResult};
use crate::materials::TimberMaterial;
use crate::section::{Axis, TimberSection};

/// Gravitational acceleration used for self-weight (m/s²)
const GRAVITY: f64 = 9.81;

/// Partial factors for actions (UK NA to EN 1990, equation 6.10)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadFactors {
    /// γ_G, applied to permanent actions
    pub permanent: f64,
    /// γ_Q, applied to variable actions
    pub variable: f64,
}

impl Default for LoadFactors {
    fn default() -> Self {
        Self { permanent: 1.35, variable: 1.5 }
    }
}

impl LoadFactors {
    pub fn validate(&self) -> CalcResult<()> {
        if !is_positive(self.permanent) {
            return Err(CalcError::non_positive_value("permanent_load_factor", self.permanent));
        }
        if !is_positive(self.variable) {
            return Err(CalcError::non_positive_value("variable_load_factor", self.variable));
        }
        Ok(())
    }

    /// Factored line load γ_G·g + γ_Q·q (kN/m)
    pub fn factored_udl(&self, permanent_udl: f64, variable_udl: f64) -> f64 {
        self.permanent * permanent_udl + self.variable * variable_udl
    }
}

/// Simply-supported beam of rectangular timber section.
///
/// `effective_length = length × effective_length_factor` is held as its own
/// field and refreshed whenever either input changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BeamDefinition")]
pub struct TimberBeam {
    section: TimberSection,
    length: f64,
    effective_length_factor: f64,
    effective_length: f64,
}

impl TimberBeam {
    pub fn new(section: TimberSection, length: f64, effective_length_factor: f64) -> CalcResult<Self> {
        check_value("length", length)?;
        check_value("effective_length_factor", effective_length_factor)?;
        Ok(Self {
            section,
            length,
            effective_length_factor,
            effective_length: length * effective_length_factor,
        })
    }

    pub fn section(&self) -> &TimberSection {
        &self.section
    }

    pub fn material(&self) -> &TimberMaterial {
        self.section.material()
    }

    pub fn breadth(&self) -> f64 {
        self.section.breadth()
    }

    pub fn height(&self) -> f64 {
        self.section.height()
    }

    pub fn set_breadth(&mut self, breadth: f64) -> CalcResult<()> {
        self.section.set_breadth(breadth)
    }

    pub fn set_height(&mut self, height: f64) -> CalcResult<()> {
        self.section.set_height(height)
    }

    pub fn set_dimensions(&mut self, breadth: f64, height: f64) -> CalcResult<()> {
        self.section.set_dimensions(breadth, height)
    }

    /// Span (mm)
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn effective_length_factor(&self) -> f64 {
        self.effective_length_factor
    }

    /// Effective length for lateral-torsional buckling (mm)
    pub fn effective_length(&self) -> f64 {
        self.effective_length
    }

    pub fn set_length(&mut self, length: f64) -> CalcResult<()> {
        check_value("length", length)?;
        self.length = length;
        self.effective_length = self.length * self.effective_length_factor;
        Ok(())
    }

    pub fn set_effective_length_factor(&mut self, factor: f64) -> CalcResult<()> {
        check_value("effective_length_factor", factor)?;
        self.effective_length_factor = factor;
        self.effective_length = self.length * self.effective_length_factor;
        Ok(())
    }

    /// Reassign the service class of this beam's material.
    ///
    /// Other holders of the same shared material are unaffected.
    pub fn set_service_class(&mut self, service_class: u8) -> CalcResult<()> {
        let service_class = ServiceClass::try_from(service_class)?;
        if self.material().service_class() != service_class {
            self.section.material_mut().set_service_class(service_class.number())?;
        }
        Ok(())
    }

    // === Actions ===

    /// Self-weight line load (kN/m)
    pub fn selfweight_per_m(&self) -> f64 {
        self.material().properties().density_mean
            * (self.breadth() / 1000.0)
            * (self.height() / 1000.0)
            * (GRAVITY / 1000.0)
    }

    /// Midspan design moment M_d = w·L²/8 (kNm)
    pub fn design_bending_moment(&self, permanent_udl: f64, variable_udl: f64, factors: &LoadFactors) -> f64 {
        let span_m = self.length / 1000.0;
        factors.factored_udl(permanent_udl, variable_udl) * span_m.powi(2) / 8.0
    }

    /// Support design shear V_d = w·L/2 (kN)
    pub fn design_shear_force(&self, permanent_udl: f64, variable_udl: f64, factors: &LoadFactors) -> f64 {
        let span_m = self.length / 1000.0;
        factors.factored_udl(permanent_udl, variable_udl) * span_m / 2.0
    }

    // === Shear ===

    /// Shear stress τ_d = 3V/(2·b_ef·h) with b_ef = k_cr·b (N/mm²)
    pub fn shear_stress(&self, shear_force: f64) -> f64 {
        3.0 * shear_force * 1e3 / (2.0 * self.section.area() * self.material().k_cr())
    }

    /// Design shear strength f_v,d (N/mm²)
    pub fn shear_strength(&self, duration: LoadDuration, is_load_sharing: bool) -> f64 {
        let material = self.material();
        material.k_mod(duration) * TimberMaterial::k_sys(is_load_sharing) * material.properties().f_v_k
            / material.gamma_m()
    }

    // === Bending ===

    /// Bending stress σ_m,d = M/W_y (N/mm²)
    pub fn bending_stress(&self, bending_moment: f64) -> f64 {
        bending_moment * 1e6 / self.section.elastic_section_modulus(Axis::Major)
    }

    /// Design bending strength f_m,d (N/mm²)
    pub fn bending_strength(&self, duration: LoadDuration, is_load_sharing: bool) -> f64 {
        let material = self.material();
        material.k_h(self.height())
            * material.k_mod(duration)
            * TimberMaterial::k_sys(is_load_sharing)
            * material.properties().f_m_y_k
            / material.gamma_m()
    }

    /// Critical bending stress σ_m,crit (EC5 eq 6.31)
    pub fn critical_bending_stress(&self) -> CalcResult<f64> {
        let g_005 = self.section.shear_modulus_005()?;
        let e_005 = self.material().properties().e_005;
        let stiffness = e_005
            * self.section.second_moment_of_area(Axis::Minor)
            * g_005
            * self.section.torsional_moment_of_inertia();
        Ok(PI / (self.effective_length * self.section.elastic_section_modulus(Axis::Major)) * stiffness.sqrt())
    }

    /// Relative slenderness for bending λ_rel,m (EC5 eq 6.30)
    pub fn relative_slenderness(&self) -> CalcResult<f64> {
        let sigma_crit = self.critical_bending_stress()?;
        Ok((self.material().properties().f_m_y_k / sigma_crit).sqrt())
    }

    /// Lateral-torsional buckling strength k_crit·f_m,d (N/mm²)
    pub fn buckling_strength(&self, duration: LoadDuration, is_load_sharing: bool) -> CalcResult<f64> {
        let k_crit = TimberMaterial::k_crit(self.relative_slenderness()?);
        Ok(k_crit * self.bending_strength(duration, is_load_sharing))
    }

    // === Bearing ===

    /// Bearing stress σ_c,90,d over a support of the given length (N/mm²)
    pub fn bearing_stress(&self, bearing_length: f64, shear_force: f64) -> f64 {
        shear_force * 1000.0 / (self.breadth() * bearing_length)
    }

    /// Design bearing strength k_c,90·f_c,90,d (N/mm²)
    pub fn bearing_strength(&self, duration: LoadDuration, support: SupportCondition) -> f64 {
        let material = self.material();
        material.k_c_90(support) * material.k_mod(duration) * material.properties().f_c_90_k / material.gamma_m()
    }

    // === Deflection ===

    /// Creep multiplier 1 + ψ2·k_def, or 1 when creep is ignored
    fn creep_multiplier(&self, psi_2: f64, include_creep: bool) -> f64 {
        let k_def = if include_creep { self.material().k_def() } else { 0.0 };
        1.0 + psi_2 * k_def
    }

    /// Bending deflection under a line load, 5wL⁴/(384EI) (mm)
    pub fn flexural_deflection(&self, udl: f64, psi_2: f64, include_creep: bool) -> f64 {
        let e_mean = self.material().properties().e_0_mean;
        let i = self.section.second_moment_of_area(Axis::Major);
        5.0 * udl * self.length.powi(4) / (384.0 * e_mean * i) * self.creep_multiplier(psi_2, include_creep)
    }

    /// Shear deflection under a line load, k_form·wL²/(8GA) (mm)
    pub fn shear_deflection(&self, udl: f64, psi_2: f64, include_creep: bool) -> f64 {
        let material = self.material();
        material.k_form() * udl * self.length.powi(2)
            / (8.0 * material.properties().g_mean * self.section.area())
            * self.creep_multiplier(psi_2, include_creep)
    }

    /// Final deflection: permanent load at full creep, variable load at ψ2 creep (mm)
    pub fn final_deflection(&self, permanent_udl: f64, variable_udl: f64, psi_2: f64, include_creep: bool) -> f64 {
        self.flexural_deflection(permanent_udl, 1.0, include_creep)
            + self.flexural_deflection(variable_udl, psi_2, include_creep)
            + self.shear_deflection(permanent_udl, 1.0, include_creep)
            + self.shear_deflection(variable_udl, psi_2, include_creep)
    }
}

/// Serialized form; `effective_length` is derived on load.
#[derive(Deserialize)]
struct BeamDefinition {
    section: TimberSection,
    length: f64,
    effective_length_factor: f64,
}

impl TryFrom<BeamDefinition> for TimberBeam {
    type Error = CalcError;

    fn try_from(def: BeamDefinition) -> CalcResult<Self> {
        TimberBeam::new(def.section, def.length, def.effective_length_factor)
    }
}

fn check_value(field: &str, value: f64) -> CalcResult<()> {
    if !is_positive(value) {
        return Err(CalcError::non_positive_value(field, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn c24_beam(breadth: f64, height: f64, length: f64) -> TimberBeam {
        let c24 = Arc::new(TimberMaterial::new("softwood", "C24", 1).unwrap());
        TimberBeam::new(TimberSection::new(breadth, height, c24).unwrap(), length, 1.0).unwrap()
    }

    #[test]
    fn test_design_actions() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        let factors = LoadFactors::default();
        assert_relative_eq!(beam.design_bending_moment(1.0, 1.0, &factors), 3.20625, max_relative = 1e-12);
        assert_relative_eq!(beam.design_shear_force(1.0, 1.0, &factors), 4.275, max_relative = 1e-12);
        assert_relative_eq!(beam.selfweight_per_m(), 0.03872988, max_relative = 1e-9);
    }

    #[test]
    fn test_bending() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        assert_relative_eq!(beam.bending_stress(3.20625), 10.23271276595745, max_relative = 1e-12);
        assert_relative_eq!(
            beam.bending_strength(LoadDuration::MediumTerm, false),
            14.76923076923077,
            max_relative = 1e-12
        );
        // load sharing adds 10%
        assert_relative_eq!(
            beam.bending_strength(LoadDuration::MediumTerm, true),
            14.76923076923077 * 1.1,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_shear() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        assert_relative_eq!(beam.shear_stress(4.275), 1.018180374722134, max_relative = 1e-12);
        assert_relative_eq!(
            beam.shear_strength(LoadDuration::MediumTerm, false),
            2.4615384615384617,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_lateral_torsional_buckling() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        assert_relative_eq!(beam.critical_bending_stress().unwrap(), 21.25058473806897, max_relative = 1e-9);
        assert_relative_eq!(beam.relative_slenderness().unwrap(), 1.0627232412255003, max_relative = 1e-9);
        assert_relative_eq!(
            beam.buckling_strength(LoadDuration::MediumTerm, false).unwrap(),
            11.268296404886767,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_slender_beam_buckling() {
        let beam = c24_beam(20.0, 100.0, 8000.0);
        assert_relative_eq!(beam.critical_bending_stress().unwrap(), 2.8860006434679453, max_relative = 1e-9);
        assert_relative_eq!(beam.relative_slenderness().unwrap(), 2.883748682159386, max_relative = 1e-9);
    }

    #[test]
    fn test_bearing() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        assert_relative_eq!(beam.bearing_stress(100.0, 4.275), 0.9095744680851063, max_relative = 1e-12);
        assert_relative_eq!(
            beam.bearing_strength(LoadDuration::MediumTerm, SupportCondition::Continuous),
            1.923076923076923,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_deflection() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        assert_relative_eq!(beam.flexural_deflection(1.0, 1.0, true), 4.896034816247583, max_relative = 1e-12);
        assert_relative_eq!(beam.shear_deflection(1.0, 1.0, false), 0.20814061054579094, max_relative = 1e-12);
        assert_relative_eq!(beam.final_deflection(1.0, 1.0, 0.3, true), 9.085491390547473, max_relative = 1e-12);
    }

    #[test]
    fn test_creep_ignored() {
        let beam = c24_beam(47.0, 200.0, 3000.0);
        let instantaneous = beam.flexural_deflection(1.0, 0.0, true);
        assert_relative_eq!(beam.flexural_deflection(1.0, 1.0, false), instantaneous);
    }

    #[test]
    fn test_effective_length_tracks_inputs() {
        let mut beam = c24_beam(47.0, 200.0, 3000.0);
        beam.set_effective_length_factor(0.9).unwrap();
        assert_relative_eq!(beam.effective_length(), 2700.0);

        beam.set_length(4000.0).unwrap();
        assert_relative_eq!(beam.effective_length(), 3600.0);
        assert_eq!(beam.effective_length_factor(), 0.9);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let mut beam = c24_beam(47.0, 200.0, 3000.0);
        assert!(matches!(beam.set_length(0.0), Err(CalcError::NonPositiveValue { .. })));
        assert!(matches!(beam.set_length(f64::INFINITY), Err(CalcError::NonPositiveValue { .. })));
        assert!(beam.set_effective_length_factor(-1.0).is_err());
        assert!(matches!(beam.set_height(-5.0), Err(CalcError::NonPositiveDimension { .. })));
        assert_eq!(beam.length(), 3000.0);
        assert_eq!(beam.effective_length(), 3000.0);
        assert_eq!(beam.height(), 200.0);

        let section = beam.section().clone();
        assert!(TimberBeam::new(section, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_set_service_class() {
        let mut beam = c24_beam(47.0, 200.0, 3000.0);
        let shared = beam.section().shared_material();

        beam.set_service_class(3).unwrap();
        assert_eq!(beam.material().service_class(), ServiceClass::Three);
        assert_eq!(shared.service_class(), ServiceClass::One);

        assert!(beam.set_service_class(0).is_err());
        assert_eq!(beam.material().service_class(), ServiceClass::Three);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let beam = c24_beam(63.0, 175.0, 3000.0);
        let json = serde_json::to_string(&beam).unwrap();
        let loaded: TimberBeam = serde_json::from_str(&json).unwrap();
        assert_eq!(beam, loaded);
    }
}
