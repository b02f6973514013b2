//! Timber Material
//!
//! A resolved (material type, strength grade, service class) triple with its
//! characteristic properties and the modification factors that depend on them.
//! One instance is shared by every section and beam of a design.

use serde::{Deserialize, Serialize};

use super::{MaterialProperties, MaterialType, PropertyStore};
use crate::ec5_factors::{self, JoistType, LoadDuration, Notch, ServiceClass, SupportCondition};
use crate::errors::CalcResult;

/// Resolved timber material for one design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimberMaterial {
    material_type: MaterialType,
    strength_grade: String,
    service_class: ServiceClass,
    properties: MaterialProperties,
}

impl TimberMaterial {
    /// Resolve a material from the embedded property tables.
    ///
    /// # Example
    ///
    /// ```rust
    /// use timber_core::materials::TimberMaterial;
    ///
    /// let gl = TimberMaterial::new("glulam", "GL28h", 2).unwrap();
    /// assert_eq!(gl.gamma_m(), 1.25);
    /// assert!(TimberMaterial::new("softwood", "C24", 4).is_err());
    /// ```
    pub fn new(material_type: &str, strength_grade: &str, service_class: u8) -> CalcResult<Self> {
        let service_class = ServiceClass::try_from(service_class)?;
        let material_type = MaterialType::from_str_flexible(material_type)?;
        Self::from_store(PropertyStore::builtin()?, material_type, strength_grade, service_class)
    }

    /// Resolve a material from a specific property store.
    pub fn from_store(
        store: &PropertyStore,
        material_type: MaterialType,
        strength_grade: &str,
        service_class: ServiceClass,
    ) -> CalcResult<Self> {
        let (strength_grade, properties) = store.resolve(material_type, strength_grade)?;
        Ok(Self {
            material_type,
            strength_grade,
            service_class,
            properties,
        })
    }

    /// Build a material from explicit properties, bypassing the store.
    pub fn with_properties(
        material_type: MaterialType,
        strength_grade: impl Into<String>,
        service_class: ServiceClass,
        properties: MaterialProperties,
    ) -> CalcResult<Self> {
        let strength_grade = strength_grade.into();
        properties.validate(&strength_grade)?;
        Ok(Self {
            material_type,
            strength_grade,
            service_class,
            properties,
        })
    }

    pub fn material_type(&self) -> MaterialType {
        self.material_type
    }

    pub fn strength_grade(&self) -> &str {
        &self.strength_grade
    }

    pub fn service_class(&self) -> ServiceClass {
        self.service_class
    }

    pub fn properties(&self) -> &MaterialProperties {
        &self.properties
    }

    /// Reassign the service class; rejected values leave the material unchanged.
    pub fn set_service_class(&mut self, service_class: u8) -> CalcResult<()> {
        self.service_class = ServiceClass::try_from(service_class)?;
        Ok(())
    }

    /// Get display name, e.g. "Softwood C24 (SC1)"
    pub fn display_name(&self) -> String {
        format!("{} {} (SC{})", self.material_type.display_name(), self.strength_grade, self.service_class)
    }

    pub fn gamma_m(&self) -> f64 {
        ec5_factors::gamma_m(self.material_type)
    }

    pub fn k_mod(&self, duration: LoadDuration) -> f64 {
        ec5_factors::k_mod(self.service_class, duration)
    }

    pub fn k_def(&self) -> f64 {
        ec5_factors::k_def(self.material_type, self.service_class)
    }

    /// Depth factor for a member of the given height (mm)
    pub fn k_h(&self, height_mm: f64) -> f64 {
        ec5_factors::k_h(self.material_type, height_mm, self.properties.size_factor)
    }

    pub fn k_crit(relative_slenderness: f64) -> f64 {
        ec5_factors::k_crit(relative_slenderness)
    }

    pub fn k_sys(is_load_sharing: bool) -> f64 {
        ec5_factors::k_sys(is_load_sharing)
    }

    pub fn k_cr(&self) -> f64 {
        ec5_factors::k_cr(self.material_type)
    }

    pub fn k_c_90(&self, support: SupportCondition) -> f64 {
        ec5_factors::k_c_90(self.material_type, support)
    }

    pub fn k_form(&self) -> f64 {
        ec5_factors::K_FORM
    }

    pub fn k_n(&self) -> f64 {
        ec5_factors::k_n(self.material_type)
    }

    pub fn k_strut(is_strutted: bool) -> f64 {
        ec5_factors::k_strut(is_strutted)
    }

    pub fn k_amp(joist_type: JoistType) -> f64 {
        ec5_factors::k_amp(joist_type)
    }

    /// Notched-end shear reduction for this material
    pub fn k_v(&self, notch: &Notch) -> CalcResult<f64> {
        ec5_factors::k_v(self.material_type, notch)
    }
}

impl std::fmt::Display for TimberMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;

    #[test]
    fn test_new_resolves_properties() {
        let mat = TimberMaterial::new("softwood", "C24", 1).unwrap();
        assert_eq!(mat.material_type(), MaterialType::Softwood);
        assert_eq!(mat.strength_grade(), "C24");
        assert_eq!(mat.properties().density_mean, 420.0);
        assert_eq!(mat.display_name(), "Softwood C24 (SC1)");
    }

    #[test]
    fn test_new_rejects_bad_inputs() {
        assert!(matches!(TimberMaterial::new("plywood", "C24", 1), Err(CalcError::InvalidMaterialType { .. })));
        assert!(matches!(TimberMaterial::new("softwood", "D30", 1), Err(CalcError::InvalidStrengthGrade { .. })));
        assert!(matches!(TimberMaterial::new("softwood", "C24", 0), Err(CalcError::InvalidServiceClass { value: 0 })));
    }

    #[test]
    fn test_set_service_class() {
        let mut mat = TimberMaterial::new("softwood", "C24", 1).unwrap();
        assert_eq!(mat.k_mod(LoadDuration::MediumTerm), 0.8);

        mat.set_service_class(3).unwrap();
        assert_eq!(mat.service_class(), ServiceClass::Three);
        assert_eq!(mat.k_mod(LoadDuration::MediumTerm), 0.65);
        assert_eq!(mat.k_def(), 2.0);

        assert!(mat.set_service_class(4).is_err());
        assert_eq!(mat.service_class(), ServiceClass::Three);
    }

    #[test]
    fn test_lvl_size_factor_flows_into_k_h() {
        let declared = TimberMaterial::new("lvl", "LVL 48 P", 1).unwrap();
        let undeclared = TimberMaterial::new("lvl", "LVL 32 P", 1).unwrap();
        assert_eq!(undeclared.properties().size_factor, None);
        assert!((declared.k_h(200.0) - 1.062707361156803).abs() < 1e-12);
        assert!((undeclared.k_h(200.0) - 1.0498589407196788).abs() < 1e-12);
    }

    #[test]
    fn test_material_dependent_factors() {
        let oak = TimberMaterial::new("green_oak", "THA", 2).unwrap();
        assert_eq!(oak.gamma_m(), 1.3);
        assert_eq!(oak.k_def(), 1.8);
        assert_eq!(oak.k_cr(), 0.67);
        assert_eq!(oak.k_n(), 5.0);
        assert_eq!(oak.k_c_90(SupportCondition::Discrete), 1.0);

        let lvl = TimberMaterial::new("lvl", "LVL 44 P", 1).unwrap();
        assert_eq!(lvl.k_cr(), 1.0);
        assert_eq!(lvl.k_n(), 4.5);
        assert_eq!(lvl.k_form(), 1.2);
    }

    #[test]
    fn test_with_properties_validates() {
        let props = *TimberMaterial::new("softwood", "C16", 1).unwrap().properties();
        let bad = MaterialProperties { e_005: -1.0, ..props };
        assert!(TimberMaterial::with_properties(MaterialType::Softwood, "X", ServiceClass::One, bad).is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mat = TimberMaterial::new("hardwood", "D40", 2).unwrap();
        let json = serde_json::to_string(&mat).unwrap();
        assert!(json.contains("\"service_class\":2"));
        let roundtrip: TimberMaterial = serde_json::from_str(&json).unwrap();
        assert_eq!(mat, roundtrip);
    }
}
