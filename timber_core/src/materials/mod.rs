//! # Materials Database
//!
//! Timber material definitions and characteristic property lookups.
//!
//! ## Material Types
//!
//! - **Softwood**: strength classes C14 - C30 (EN 338)
//! - **Hardwood**: strength classes D30 - D60 (EN 338)
//! - **Glulam**: GL24c - GL32h (EN 14080)
//! - **LVL**: laminated veneer lumber, manufacturer declared values
//! - **Green oak**: BS 5756 grades THA, THB, TH1, TH2
//!
//! ## Example
//!
//! ```rust
//! use timber_core::materials::TimberMaterial;
//!
//! let c24 = TimberMaterial::new("softwood", "C24", 1).unwrap();
//! let props = c24.properties();
//! println!("f_m,k = {} N/mm², E_0,mean = {} N/mm²", props.f_m_y_k, props.e_0_mean);
//! ```

pub mod property_store;
pub mod timber_material;

pub use property_store::PropertyStore;
pub use timber_material::TimberMaterial;

use serde::{Deserialize, Serialize};

use crate::errors::{is_positive, CalcError, CalcResult};

/// Timber material family
///
/// Closed set: each variant maps to one property table, one section catalog
/// and one row of every material-dependent modification factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Softwood,
    Hardwood,
    Glulam,
    Lvl,
    GreenOak,
}

impl MaterialType {
    /// All material types for UI selection
    pub const ALL: [MaterialType; 5] = [
        MaterialType::Softwood,
        MaterialType::Hardwood,
        MaterialType::Glulam,
        MaterialType::Lvl,
        MaterialType::GreenOak,
    ];

    /// Snake-case code used for data file names, e.g. "green_oak"
    pub fn code(&self) -> &'static str {
        match self {
            MaterialType::Softwood => "softwood",
            MaterialType::Hardwood => "hardwood",
            MaterialType::Glulam => "glulam",
            MaterialType::Lvl => "lvl",
            MaterialType::GreenOak => "green_oak",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "softwood" => Ok(MaterialType::Softwood),
            "hardwood" => Ok(MaterialType::Hardwood),
            "glulam" => Ok(MaterialType::Glulam),
            "lvl" => Ok(MaterialType::Lvl),
            "green_oak" | "greenoak" => Ok(MaterialType::GreenOak),
            _ => Err(CalcError::invalid_material_type(s)),
        }
    }

    /// Name of the property table file for this material type
    pub fn data_file_name(&self) -> String {
        format!("{}_data.json", self.code())
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialType::Softwood => "Softwood",
            MaterialType::Hardwood => "Hardwood",
            MaterialType::Glulam => "Glulam",
            MaterialType::Lvl => "LVL",
            MaterialType::GreenOak => "Green Oak",
        }
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Characteristic material properties for one strength grade.
///
/// Strengths and moduli in N/mm², density in kg/m³. Field names in JSON follow
/// the Eurocode symbols (`E_0_mean`, `G_005`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Mean density ρ_mean (kg/m³)
    pub density_mean: f64,
    /// Characteristic bending strength f_m,y,k
    pub f_m_y_k: f64,
    /// Characteristic shear strength f_v,k
    pub f_v_k: f64,
    /// Characteristic compression strength perpendicular to grain f_c,90,k
    pub f_c_90_k: f64,
    /// Mean modulus of elasticity parallel to grain E_0,mean
    #[serde(rename = "E_0_mean")]
    pub e_0_mean: f64,
    /// 5th percentile modulus of elasticity E_0,05
    #[serde(rename = "E_005")]
    pub e_005: f64,
    /// Mean shear modulus G_mean
    #[serde(rename = "G_mean")]
    pub g_mean: f64,
    /// 5th percentile shear modulus G_0,05, derived when absent
    #[serde(rename = "G_005", default)]
    pub g_005: Option<f64>,
    /// LVL size-effect exponent s, manufacturer declared
    #[serde(default)]
    pub size_factor: Option<f64>,
}

impl MaterialProperties {
    /// Check that every declared value is positive.
    pub fn validate(&self, strength_grade: &str) -> CalcResult<()> {
        let required = [
            ("density_mean", self.density_mean),
            ("f_m_y_k", self.f_m_y_k),
            ("f_v_k", self.f_v_k),
            ("f_c_90_k", self.f_c_90_k),
            ("E_0_mean", self.e_0_mean),
            ("E_005", self.e_005),
            ("G_mean", self.g_mean),
        ];
        let optional = [("G_005", self.g_005), ("size_factor", self.size_factor)];

        let declared = required
            .into_iter()
            .chain(optional.into_iter().filter_map(|(name, value)| value.map(|v| (name, v))));
        for (name, value) in declared {
            if !is_positive(value) {
                return Err(CalcError::invalid_input(
                    format!("{}.{}", strength_grade, name),
                    value.to_string(),
                    "Material property values must be positive",
                ));
            }
        }
        Ok(())
    }
}
