//! # Rectangular Timber Section
//!
//! Cross-section geometry in mm with derived area, second moments of area,
//! elastic moduli and the torsional constants used by the lateral-torsional
//! buckling check.
//!
//! ```text
//!         b
//!     ┌───────┐   ─┬─
//!     │       │    │
//!     │   ·   │    h     major axis: horizontal through the centroid
//!     │       │    │
//!     └───────┘   ─┴─
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use timber_core::materials::TimberMaterial;
//! use timber_core::section::{Axis, TimberSection};
//!
//! let c24 = Arc::new(TimberMaterial::new("softwood", "C24", 1).unwrap());
//! let mut section = TimberSection::new(47.0, 200.0, c24).unwrap();
//! assert_eq!(section.area(), 9400.0);
//!
//! section.set_height(225.0).unwrap();
//! assert_eq!(section.area(), 47.0 * 225.0);
//! assert!(section.second_moment_of_area(Axis::Major) > section.second_moment_of_area(Axis::Minor));
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{is_positive, CalcError, CalcResult};
use crate::materials::{MaterialType, TimberMaterial};

/// Bending axis of a rectangular section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Strong axis, parallel to the breadth
    #[default]
    Major,
    /// Weak axis, parallel to the height
    Minor,
}

/// Rectangular timber cross-section bound to a shared material.
///
/// `area` is recomputed by every setter; there is no other mutation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SectionDefinition")]
pub struct TimberSection {
    breadth: f64,
    height: f64,
    area: f64,
    material: Arc<TimberMaterial>,
}

impl TimberSection {
    pub fn new(breadth: f64, height: f64, material: Arc<TimberMaterial>) -> CalcResult<Self> {
        check_dimension("breadth", breadth)?;
        check_dimension("height", height)?;
        Ok(Self {
            breadth,
            height,
            area: breadth * height,
            material,
        })
    }

    pub fn breadth(&self) -> f64 {
        self.breadth
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Cross-sectional area (mm²)
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn set_breadth(&mut self, breadth: f64) -> CalcResult<()> {
        check_dimension("breadth", breadth)?;
        self.breadth = breadth;
        self.area = self.breadth * self.height;
        Ok(())
    }

    pub fn set_height(&mut self, height: f64) -> CalcResult<()> {
        check_dimension("height", height)?;
        self.height = height;
        self.area = self.breadth * self.height;
        Ok(())
    }

    /// Set both dimensions; neither changes unless both are valid.
    pub fn set_dimensions(&mut self, breadth: f64, height: f64) -> CalcResult<()> {
        check_dimension("breadth", breadth)?;
        check_dimension("height", height)?;
        self.breadth = breadth;
        self.height = height;
        self.area = breadth * height;
        Ok(())
    }

    pub fn material(&self) -> &TimberMaterial {
        &self.material
    }

    /// Handle to the shared material
    pub fn shared_material(&self) -> Arc<TimberMaterial> {
        Arc::clone(&self.material)
    }

    /// Mutable access to the material; clones it first if it is shared.
    pub fn material_mut(&mut self) -> &mut TimberMaterial {
        Arc::make_mut(&mut self.material)
    }

    /// Second moment of area I (mm⁴)
    pub fn second_moment_of_area(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Major => self.breadth * self.height.powi(3) / 12.0,
            Axis::Minor => self.height * self.breadth.powi(3) / 12.0,
        }
    }

    /// Elastic section modulus W (mm³)
    pub fn elastic_section_modulus(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Major => self.breadth * self.height.powi(2) / 6.0,
            Axis::Minor => self.height * self.breadth.powi(2) / 6.0,
        }
    }

    /// Torsion coefficient β for a solid rectangle
    pub fn torsion_coefficient_beta(&self) -> f64 {
        let long = self.breadth.max(self.height);
        let short = self.breadth.min(self.height);
        1.0 / 3.0 - 0.21 * (short / long) * (1.0 - short.powi(4) / (12.0 * long.powi(4)))
    }

    /// Torsional moment of inertia J = β·l·s³ (mm⁴)
    pub fn torsional_moment_of_inertia(&self) -> f64 {
        let long = self.breadth.max(self.height);
        let short = self.breadth.min(self.height);
        self.torsion_coefficient_beta() * long * short.powi(3)
    }

    /// 5th percentile shear modulus G_0,05 (N/mm²).
    ///
    /// The declared value is used when present. Otherwise it is derived from
    /// E_0,05: `E_005 / ((48 + 2/3)·β)` for softwood, `E_005 / 16` for hardwood
    /// and green oak. Glulam and LVL must declare it.
    pub fn shear_modulus_005(&self) -> CalcResult<f64> {
        let props = self.material.properties();
        if let Some(g_005) = props.g_005 {
            return Ok(g_005);
        }
        match self.material.material_type() {
            MaterialType::Softwood => {
                let alpha = (48.0 + 2.0 / 3.0) * self.torsion_coefficient_beta();
                Ok(props.e_005 / alpha)
            }
            MaterialType::Hardwood | MaterialType::GreenOak => Ok(props.e_005 / 16.0),
            MaterialType::Glulam | MaterialType::Lvl => Err(CalcError::UndefinedShearModulus {
                material_type: self.material.material_type().code().to_string(),
                strength_grade: self.material.strength_grade().to_string(),
            }),
        }
    }
}

/// Serialized form; `area` is derived on load.
#[derive(Deserialize)]
struct SectionDefinition {
    breadth: f64,
    height: f64,
    material: Arc<TimberMaterial>,
}

impl TryFrom<SectionDefinition> for TimberSection {
    type Error = CalcError;

    fn try_from(def: SectionDefinition) -> CalcResult<Self> {
        TimberSection::new(def.breadth, def.height, def.material)
    }
}

fn check_dimension(field: &str, value: f64) -> CalcResult<()> {
    if !is_positive(value) {
        return Err(CalcError::non_positive_dimension(field, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec5_factors::ServiceClass;
    use crate::materials::MaterialProperties;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn c24() -> Arc<TimberMaterial> {
        Arc::new(TimberMaterial::new("softwood", "C24", 1).unwrap())
    }

    fn section(breadth: f64, height: f64) -> TimberSection {
        TimberSection::new(breadth, height, c24()).unwrap()
    }

    #[test]
    fn test_section_properties() {
        let s = section(47.0, 200.0);
        assert_eq!(s.area(), 9400.0);
        assert_relative_eq!(s.second_moment_of_area(Axis::Major), 31_333_333.333333332, max_relative = 1e-12);
        assert_relative_eq!(s.second_moment_of_area(Axis::Minor), 1_730_383.3333333333, max_relative = 1e-12);
        assert_relative_eq!(s.elastic_section_modulus(Axis::Major), 313_333.3333333333, max_relative = 1e-12);
        assert_relative_eq!(s.elastic_section_modulus(Axis::Minor), 73_633.33333333333, max_relative = 1e-12);
    }

    #[test]
    fn test_torsion_constants() {
        let s = section(47.0, 200.0);
        assert_relative_eq!(s.torsion_coefficient_beta(), 0.2839958756384036, max_relative = 1e-12);
        assert_relative_eq!(s.torsional_moment_of_inertia(), 5_897_060.759281196, max_relative = 1e-12);

        // β depends only on the aspect ratio, not on orientation
        let rotated = section(200.0, 47.0);
        assert_relative_eq!(rotated.torsion_coefficient_beta(), s.torsion_coefficient_beta());
        assert_relative_eq!(rotated.torsional_moment_of_inertia(), s.torsional_moment_of_inertia());
    }

    #[test]
    fn test_softwood_shear_modulus_is_derived() {
        assert_relative_eq!(section(47.0, 200.0).shear_modulus_005().unwrap(), 535.4119815252211, max_relative = 1e-12);
        assert_relative_eq!(section(20.0, 100.0).shear_modulus_005().unwrap(), 521.9171800377794, max_relative = 1e-12);
    }

    #[test]
    fn test_hardwood_shear_modulus_is_derived() {
        let d30 = Arc::new(TimberMaterial::new("hardwood", "D30", 1).unwrap());
        let e_005 = d30.properties().e_005;
        let s = TimberSection::new(75.0, 200.0, d30).unwrap();
        assert_relative_eq!(s.shear_modulus_005().unwrap(), e_005 / 16.0);
    }

    #[test]
    fn test_declared_shear_modulus_wins() {
        let gl = Arc::new(TimberMaterial::new("glulam", "GL24h", 1).unwrap());
        let s = TimberSection::new(90.0, 315.0, gl).unwrap();
        assert_eq!(s.shear_modulus_005().unwrap(), 540.0);
    }

    #[test]
    fn test_undeclared_glulam_shear_modulus_fails() {
        let props = *TimberMaterial::new("glulam", "GL24h", 1).unwrap().properties();
        let undeclared = TimberMaterial::with_properties(
            MaterialType::Glulam,
            "GL-custom",
            ServiceClass::One,
            MaterialProperties { g_005: None, ..props },
        )
        .unwrap();
        let s = TimberSection::new(90.0, 315.0, Arc::new(undeclared)).unwrap();
        let err = s.shear_modulus_005().unwrap_err();
        assert_eq!(err.error_code(), "UNDEFINED_SHEAR_MODULUS");
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert!(matches!(TimberSection::new(0.0, 200.0, c24()), Err(CalcError::NonPositiveDimension { .. })));
        assert!(TimberSection::new(47.0, f64::NAN, c24()).is_err());
        assert!(matches!(TimberSection::new(f64::INFINITY, 200.0, c24()), Err(CalcError::NonPositiveDimension { .. })));

        let mut s = section(47.0, 200.0);
        assert!(s.set_breadth(-10.0).is_err());
        assert!(s.set_dimensions(63.0, 0.0).is_err());
        assert_eq!((s.breadth(), s.height(), s.area()), (47.0, 200.0, 9400.0));
    }

    #[test]
    fn test_material_mut_copies_shared_material() {
        let material = c24();
        let mut s = TimberSection::new(47.0, 200.0, Arc::clone(&material)).unwrap();
        s.material_mut().set_service_class(3).unwrap();
        assert_eq!(s.material().service_class(), ServiceClass::Three);
        assert_eq!(material.service_class(), ServiceClass::One);
    }

    #[test]
    fn test_deserialize_recomputes_area() {
        let json = serde_json::to_string(&section(63.0, 175.0)).unwrap();
        let stale = json.replace("\"area\":11025.0", "\"area\":1.0");
        let loaded: TimberSection = serde_json::from_str(&stale).unwrap();
        assert_eq!(loaded.area(), 11025.0);

        let negative = json.replace("\"breadth\":63.0", "\"breadth\":-63.0");
        assert!(serde_json::from_str::<TimberSection>(&negative).is_err());
    }

    proptest! {
        #[test]
        fn prop_area_tracks_dimensions(b in 1.0f64..500.0, h in 1.0f64..1500.0) {
            let mut s = section(10.0, 10.0);
            s.set_breadth(b).unwrap();
            s.set_height(h).unwrap();
            prop_assert_eq!(s.area(), b * h);
        }

        #[test]
        fn prop_setter_order_is_irrelevant(b in 1.0f64..500.0, h in 1.0f64..1500.0) {
            let mut first = section(10.0, 10.0);
            first.set_breadth(b).unwrap();
            first.set_height(h).unwrap();

            let mut second = section(10.0, 10.0);
            second.set_height(h).unwrap();
            second.set_breadth(b).unwrap();

            prop_assert_eq!(first.area(), second.area());
        }

        #[test]
        fn prop_inertia_ratio(b in 1.0f64..500.0, h in 1.0f64..1500.0) {
            let s = section(b, h);
            let ratio = s.second_moment_of_area(Axis::Major) / s.second_moment_of_area(Axis::Minor);
            prop_assert!((ratio - (h / b).powi(2)).abs() <= 1e-9 * (h / b).powi(2));
        }
    }
}
