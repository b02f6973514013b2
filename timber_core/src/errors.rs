//! # Error Types
//!
//! Structured error types for timber_core. Every failure is raised at the call
//! that received the bad input, so a returned error always means "malformed
//! input or missing data", never "the section is too small". An overstressed
//! section is a normal [`UtilisationResult`](crate::calculations::utilisation::UtilisationResult)
//! with ratios above 1.
//!
//! ## Example
//!
//! ```rust
//! use timber_core::errors::{CalcError, CalcResult, ErrorKind};
//!
//! fn validate_span(length_mm: f64) -> CalcResult<()> {
//!     if !(length_mm > 0.0) {
//!         return Err(CalcError::non_positive_value("length", length_mm));
//!     }
//!     Ok(())
//! }
//!
//! let err = validate_span(-5.0).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for timber_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Broad classification of a [`CalcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed input, rejected at the call that received it
    Validation,
    /// Data that should exist in a table or file could not be found
    Lookup,
}

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, inconsistent, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A section dimension is zero, negative or not a number
    #[error("{field}, {value}mm, must be positive")]
    NonPositiveDimension { field: String, value: f64 },

    /// A beam length or factor is zero, negative or not a number
    #[error("{field}, {value}, must be positive")]
    NonPositiveValue { field: String, value: f64 },

    /// Material type name is not one of the supported timber families
    #[error("Material type '{material_type}' not valid. Valid material types: softwood, hardwood, glulam, lvl, green_oak")]
    InvalidMaterialType { material_type: String },

    /// Strength grade missing from the property table for its material type
    #[error("Strength grade '{strength_grade}' not found for {material_type}. Grades available: {available:?}")]
    InvalidStrengthGrade {
        material_type: String,
        strength_grade: String,
        available: Vec<String>,
    },

    /// Service class outside 1..=3
    #[error("Service class {value} is not valid. Valid service classes: 1, 2, 3")]
    InvalidServiceClass { value: i64 },

    /// Load duration name outside the five Eurocode classes
    #[error("Load duration '{value}' is invalid. Valid load durations: permanent, long_term, medium_term, short_term, instantaneous")]
    InvalidLoadDuration { value: String },

    /// Bearing support condition index outside 0..=2
    #[error("Invalid bearing support condition index {value}. Valid: 0 = no enhancement, 1 = continuous support, 2 = discrete support")]
    InvalidSupportCondition { value: i64 },

    /// Joist type index outside 0..=2
    #[error("Invalid joist type index {value}. Valid: 0 = solid timber, 1 = glued thin-webbed, 2 = mechanically jointed truss")]
    InvalidJoistType { value: i64 },

    /// No section catalog is configured for the material type
    #[error("Unsupported material type for catalog sizing: {material_type}")]
    UnsupportedMaterialType { material_type: String },

    /// G_005 is not declared and cannot be derived for this material
    #[error("G_005 is not given for {material_type} {strength_grade} and cannot be derived")]
    UndefinedShearModulus {
        material_type: String,
        strength_grade: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NonPositiveDimension error
    pub fn non_positive_dimension(field: impl Into<String>, value: f64) -> Self {
        CalcError::NonPositiveDimension { field: field.into(), value }
    }

    /// Create a NonPositiveValue error
    pub fn non_positive_value(field: impl Into<String>, value: f64) -> Self {
        CalcError::NonPositiveValue { field: field.into(), value }
    }

    /// Create an InvalidMaterialType error
    pub fn invalid_material_type(material_type: impl Into<String>) -> Self {
        CalcError::InvalidMaterialType { material_type: material_type.into() }
    }

    /// Create an UnsupportedMaterialType error
    pub fn unsupported_material_type(material_type: impl Into<String>) -> Self {
        CalcError::UnsupportedMaterialType { material_type: material_type.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError { reason: reason.into() }
    }

    /// Classify the error as a validation or lookup failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::InvalidInput { .. }
            | CalcError::NonPositiveDimension { .. }
            | CalcError::NonPositiveValue { .. }
            | CalcError::InvalidMaterialType { .. }
            | CalcError::InvalidStrengthGrade { .. }
            | CalcError::InvalidServiceClass { .. }
            | CalcError::InvalidLoadDuration { .. }
            | CalcError::InvalidSupportCondition { .. }
            | CalcError::InvalidJoistType { .. }
            | CalcError::UnsupportedMaterialType { .. } => ErrorKind::Validation,
            CalcError::UndefinedShearModulus { .. }
            | CalcError::FileError { .. }
            | CalcError::SerializationError { .. } => ErrorKind::Lookup,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::NonPositiveDimension { .. } => "NON_POSITIVE_DIMENSION",
            CalcError::NonPositiveValue { .. } => "NON_POSITIVE_VALUE",
            CalcError::InvalidMaterialType { .. } => "INVALID_MATERIAL_TYPE",
            CalcError::InvalidStrengthGrade { .. } => "INVALID_STRENGTH_GRADE",
            CalcError::InvalidServiceClass { .. } => "INVALID_SERVICE_CLASS",
            CalcError::InvalidLoadDuration { .. } => "INVALID_LOAD_DURATION",
            CalcError::InvalidSupportCondition { .. } => "INVALID_SUPPORT_CONDITION",
            CalcError::InvalidJoistType { .. } => "INVALID_JOIST_TYPE",
            CalcError::UnsupportedMaterialType { .. } => "UNSUPPORTED_MATERIAL_TYPE",
            CalcError::UndefinedShearModulus { .. } => "UNDEFINED_SHEAR_MODULUS",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

/// Reject zero, negative, infinite and NaN values.
pub(crate) fn is_positive(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}
