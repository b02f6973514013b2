//! # Eurocode 5 Modification Factors
//!
//! Modification factors for timber design per EN 1995-1-1 and the UK National
//! Annex.
//!
//! ## Overview
//!
//! Characteristic values (f_m,k, f_v,k, f_c,90,k, E, G) are turned into design
//! values by multiplying by the applicable factors and dividing by γ_M:
//!
//! ```text
//! f_m,d    = k_h × k_mod × k_sys × f_m,y,k / γ_M
//! f_v,d    = k_mod × k_sys × f_v,k / γ_M
//! f_c,90,d = k_c,90 × k_mod × f_c,90,k / γ_M
//! ```
//!
//! ## Factor Summary
//!
//! | Factor  | Description                  | Typical Values |
//! |---------|------------------------------|----------------|
//! | k_mod   | Load duration / moisture     | 0.5 - 1.1      |
//! | k_def   | Creep                        | 0.6 - 2.0      |
//! | k_h     | Depth (size) effect          | 1.0 - 1.3      |
//! | k_crit  | Lateral-torsional buckling   | Calculated     |
//! | k_sys   | Load sharing                 | 1.0 or 1.1     |
//! | k_cr    | Cracking (shear width)       | 0.67 or 1.0    |
//! | k_c,90  | Bearing enhancement          | 1.0 - 1.75     |
//! | k_v     | Notched-end shear reduction  | Calculated     |
//!
//! All functions here are pure: they depend only on their arguments.

use serde::{Deserialize, Serialize};

use crate::errors::{is_positive, CalcError, CalcResult};
use crate::materials::MaterialType;

/// k_mod values indexed by `[service_class - 1][load_duration]` (EC5 Table 3.1).
///
/// Rows for service classes 1 and 2 are identical.
pub const K_MOD: [[f64; 5]; 3] = [
    [0.6, 0.7, 0.8, 0.9, 1.1],
    [0.6, 0.7, 0.8, 0.9, 1.1],
    [0.5, 0.55, 0.65, 0.7, 0.9],
];

/// k_def by service class for solid timber, glulam and LVL (EC5 Table 3.2)
pub const K_DEF: [f64; 3] = [0.6, 0.8, 2.0];

/// k_def by service class for green oak
pub const K_DEF_GREEN_OAK: [f64; 3] = [1.6, 1.8, 2.0];

/// Shear deflection form factor for rectangular sections
pub const K_FORM: f64 = 1.2;

/// LVL size-effect exponent used when the manufacturer declares none
pub const DEFAULT_LVL_SIZE_FACTOR: f64 = 0.12;

/// Load duration class per EC5 Table 2.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadDuration {
    /// More than 10 years (self-weight)
    Permanent,
    /// 6 months - 10 years (storage)
    LongTerm,
    /// 1 week - 6 months (imposed floor load)
    #[default]
    MediumTerm,
    /// Less than 1 week (snow)
    ShortTerm,
    /// Wind, accidental
    Instantaneous,
}

impl LoadDuration {
    /// All load duration classes, shortest column index first
    pub const ALL: [LoadDuration; 5] = [
        LoadDuration::Permanent,
        LoadDuration::LongTerm,
        LoadDuration::MediumTerm,
        LoadDuration::ShortTerm,
        LoadDuration::Instantaneous,
    ];

    /// Column index into [`K_MOD`]
    pub fn index(&self) -> usize {
        match self {
            LoadDuration::Permanent => 0,
            LoadDuration::LongTerm => 1,
            LoadDuration::MediumTerm => 2,
            LoadDuration::ShortTerm => 3,
            LoadDuration::Instantaneous => 4,
        }
    }

    /// Snake-case code, e.g. "medium_term"
    pub fn code(&self) -> &'static str {
        match self {
            LoadDuration::Permanent => "permanent",
            LoadDuration::LongTerm => "long_term",
            LoadDuration::MediumTerm => "medium_term",
            LoadDuration::ShortTerm => "short_term",
            LoadDuration::Instantaneous => "instantaneous",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "permanent" => Ok(LoadDuration::Permanent),
            "long_term" | "longterm" => Ok(LoadDuration::LongTerm),
            "medium_term" | "mediumterm" => Ok(LoadDuration::MediumTerm),
            "short_term" | "shortterm" => Ok(LoadDuration::ShortTerm),
            "instantaneous" => Ok(LoadDuration::Instantaneous),
            _ => Err(CalcError::InvalidLoadDuration {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for LoadDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Service class per EC5 2.3.1.3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum ServiceClass {
    /// Heated interior
    #[default]
    One,
    /// Covered, unheated
    Two,
    /// Exposed
    Three,
}

impl ServiceClass {
    pub const ALL: [ServiceClass; 3] = [ServiceClass::One, ServiceClass::Two, ServiceClass::Three];

    /// Service class number, 1 to 3
    pub fn number(&self) -> u8 {
        match self {
            ServiceClass::One => 1,
            ServiceClass::Two => 2,
            ServiceClass::Three => 3,
        }
    }

    /// Row index into [`K_MOD`] / [`K_DEF`]
    pub fn index(&self) -> usize {
        usize::from(self.number() - 1)
    }
}

impl TryFrom<u8> for ServiceClass {
    type Error = CalcError;

    fn try_from(value: u8) -> CalcResult<Self> {
        match value {
            1 => Ok(ServiceClass::One),
            2 => Ok(ServiceClass::Two),
            3 => Ok(ServiceClass::Three),
            _ => Err(CalcError::InvalidServiceClass {
                value: i64::from(value),
            }),
        }
    }
}

impl From<ServiceClass> for u8 {
    fn from(class: ServiceClass) -> Self {
        class.number()
    }
}

impl std::fmt::Display for ServiceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Bearing support condition for k_c,90 (EC5 6.1.5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum SupportCondition {
    /// No bearing enhancement
    #[default]
    Unenhanced,
    /// Member on continuous supports
    Continuous,
    /// Member on discrete supports
    Discrete,
}

impl TryFrom<u8> for SupportCondition {
    type Error = CalcError;

    fn try_from(value: u8) -> CalcResult<Self> {
        match value {
            0 => Ok(SupportCondition::Unenhanced),
            1 => Ok(SupportCondition::Continuous),
            2 => Ok(SupportCondition::Discrete),
            _ => Err(CalcError::InvalidSupportCondition {
                value: i64::from(value),
            }),
        }
    }
}

impl From<SupportCondition> for u8 {
    fn from(condition: SupportCondition) -> Self {
        match condition {
            SupportCondition::Unenhanced => 0,
            SupportCondition::Continuous => 1,
            SupportCondition::Discrete => 2,
        }
    }
}

/// Floor joist construction, used for k_amp (UK NA 2.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum JoistType {
    #[default]
    SolidTimber,
    GluedThinWebbed,
    MechanicallyJointedTruss,
}

impl TryFrom<u8> for JoistType {
    type Error = CalcError;

    fn try_from(value: u8) -> CalcResult<Self> {
        match value {
            0 => Ok(JoistType::SolidTimber),
            1 => Ok(JoistType::GluedThinWebbed),
            2 => Ok(JoistType::MechanicallyJointedTruss),
            _ => Err(CalcError::InvalidJoistType {
                value: i64::from(value),
            }),
        }
    }
}

impl From<JoistType> for u8 {
    fn from(joist_type: JoistType) -> Self {
        match joist_type {
            JoistType::SolidTimber => 0,
            JoistType::GluedThinWebbed => 1,
            JoistType::MechanicallyJointedTruss => 2,
        }
    }
}

/// Partial factor for material properties γ_M (UK NA Table NA.3)
pub fn gamma_m(material: MaterialType) -> f64 {
    match material {
        MaterialType::Softwood | MaterialType::Hardwood | MaterialType::GreenOak => 1.3,
        MaterialType::Glulam => 1.25,
        MaterialType::Lvl => 1.2,
    }
}

/// Load duration and moisture factor k_mod (EC5 Table 3.1)
pub fn k_mod(service_class: ServiceClass, duration: LoadDuration) -> f64 {
    K_MOD[service_class.index()][duration.index()]
}

/// Creep factor k_def (EC5 Table 3.2)
pub fn k_def(material: MaterialType, service_class: ServiceClass) -> f64 {
    match material {
        MaterialType::GreenOak => K_DEF_GREEN_OAK[service_class.index()],
        MaterialType::Softwood | MaterialType::Hardwood | MaterialType::Glulam | MaterialType::Lvl => {
            K_DEF[service_class.index()]
        }
    }
}

/// Depth factor k_h for bending (EC5 3.2(3), 3.3(3), 3.4(3))
///
/// `size_factor` is the LVL size-effect exponent `s`; it is ignored for other
/// materials and defaults to [`DEFAULT_LVL_SIZE_FACTOR`].
pub fn k_h(material: MaterialType, height_mm: f64, size_factor: Option<f64>) -> f64 {
    match material {
        MaterialType::Softwood | MaterialType::Hardwood | MaterialType::GreenOak => {
            if height_mm <= 150.0 {
                (150.0 / height_mm).powf(0.2).min(1.3)
            } else {
                1.0
            }
        }
        MaterialType::Glulam => {
            if height_mm <= 600.0 {
                (600.0 / height_mm).powf(0.1).min(1.1)
            } else {
                1.0
            }
        }
        MaterialType::Lvl => {
            let s = size_factor.unwrap_or(DEFAULT_LVL_SIZE_FACTOR);
            (300.0 / height_mm).powf(s).min(1.2)
        }
    }
}

/// Lateral-torsional buckling factor k_crit (EC5 Eq 6.34)
///
/// Continuous but not smooth at λ_rel = 0.75 and 1.4.
pub fn k_crit(relative_slenderness: f64) -> f64 {
    if relative_slenderness <= 0.75 {
        1.0
    } else if relative_slenderness <= 1.4 {
        1.56 - 0.75 * relative_slenderness
    } else {
        1.0 / relative_slenderness.powi(2)
    }
}

/// System strength factor k_sys (EC5 6.6)
pub fn k_sys(is_load_sharing: bool) -> f64 {
    if is_load_sharing {
        1.1
    } else {
        1.0
    }
}

/// Crack factor for shear k_cr (EC5 6.1.7(2), UK NA)
pub fn k_cr(material: MaterialType) -> f64 {
    match material {
        MaterialType::Softwood | MaterialType::Hardwood | MaterialType::GreenOak | MaterialType::Glulam => 0.67,
        MaterialType::Lvl => 1.0,
    }
}

/// Bearing enhancement factor k_c,90 (EC5 6.1.5)
///
/// Only softwood and glulam are enhanced.
pub fn k_c_90(material: MaterialType, support: SupportCondition) -> f64 {
    match (material, support) {
        (_, SupportCondition::Unenhanced) => 1.0,
        (MaterialType::Softwood, SupportCondition::Continuous) => 1.25,
        (MaterialType::Softwood, SupportCondition::Discrete) => 1.5,
        (MaterialType::Glulam, SupportCondition::Continuous) => 1.5,
        (MaterialType::Glulam, SupportCondition::Discrete) => 1.75,
        _ => 1.0,
    }
}

/// Notch factor k_n (EC5 Eq 6.63)
pub fn k_n(material: MaterialType) -> f64 {
    match material {
        MaterialType::Softwood | MaterialType::Hardwood | MaterialType::GreenOak => 5.0,
        MaterialType::Glulam => 6.5,
        MaterialType::Lvl => 4.5,
    }
}

/// Strutting factor k_strut for floor joists (UK NA 2.7)
pub fn k_strut(is_strutted: bool) -> f64 {
    if is_strutted {
        0.97
    } else {
        1.0
    }
}

/// Amplification factor k_amp for joist shear deflection or joint slip (UK NA 2.7)
pub fn k_amp(joist_type: JoistType) -> f64 {
    match joist_type {
        JoistType::SolidTimber => 1.05,
        JoistType::GluedThinWebbed => 1.2,
        JoistType::MechanicallyJointedTruss => 1.3,
    }
}

/// Which face of the member is notched at the support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotchPosition {
    /// Notch on the supported face (reduces shear capacity)
    Bottom,
    /// Notch on the opposite face (k_v = 1)
    Top,
}

/// Geometry of a notched member end, all dimensions in mm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Notch {
    /// Full member height h
    pub height: f64,
    /// Depth removed by the notch, h - h_ef
    pub notch_depth: f64,
    /// Bearing length at the support
    pub bearing_length: f64,
    /// Distance from the edge of the support to the notch corner
    pub distance_from_support_edge: f64,
    pub position: NotchPosition,
    /// Horizontal length of a sloped notch, 0 for a square notch
    pub sloping_length: f64,
}

impl Notch {
    /// Square-cornered notch (no slope)
    pub fn square(
        height: f64,
        notch_depth: f64,
        bearing_length: f64,
        distance_from_support_edge: f64,
        position: NotchPosition,
    ) -> Self {
        Self {
            height,
            notch_depth,
            bearing_length,
            distance_from_support_edge,
            position,
            sloping_length: 0.0,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        if !is_positive(self.height) {
            return Err(CalcError::non_positive_dimension("height", self.height));
        }
        if !is_positive(self.notch_depth) || self.notch_depth >= self.height {
            return Err(CalcError::invalid_input(
                "notch_depth",
                self.notch_depth.to_string(),
                "Notch depth must be positive and less than the member height",
            ));
        }
        if !(self.bearing_length >= 0.0) || !(self.distance_from_support_edge >= 0.0) || !(self.sloping_length >= 0.0) {
            return Err(CalcError::invalid_input(
                "notch",
                format!("{:?}", self),
                "Bearing length, notch distance and sloping length cannot be negative",
            ));
        }
        Ok(())
    }

    /// Effective height at the notch, h_ef
    pub fn effective_height(&self) -> f64 {
        self.height - self.notch_depth
    }

    /// Distance x from the support reaction to the notch corner
    pub fn distance_to_notch(&self) -> f64 {
        match self.position {
            NotchPosition::Bottom => self.bearing_length / 2.0 + self.distance_from_support_edge,
            NotchPosition::Top => self.distance_from_support_edge,
        }
    }
}

/// Notch depth ratio α = h_ef / h
pub fn notch_ratio(height: f64, notch_depth: f64) -> f64 {
    (height - notch_depth) / height
}

/// Notched-end shear reduction factor k_v (EC5 Eq 6.62)
pub fn k_v(material: MaterialType, notch: &Notch) -> CalcResult<f64> {
    notch.validate()?;
    if notch.position == NotchPosition::Top {
        return Ok(1.0);
    }

    let h = notch.height;
    let alpha = notch_ratio(h, notch.notch_depth);
    let i = notch.sloping_length / (h - notch.effective_height());
    let x = notch.distance_to_notch();

    let numerator = k_n(material) * (1.0 + 1.1 * i.powf(1.5) / h.sqrt());
    let denominator =
        h.sqrt() * ((alpha * (1.0 - alpha)).sqrt() + 0.8 * x * (1.0 / alpha - alpha.powi(2)).sqrt() / h);
    Ok((numerator / denominator).min(1.0))
}
