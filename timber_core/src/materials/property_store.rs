//! Material Property Store
//!
//! One JSON table per material type, mapping strength grade to its
//! [`MaterialProperties`]. The five standard tables are embedded at compile
//! time and parsed once on first use; a directory of user tables can be loaded
//! instead with [`PropertyStore::from_dir`].
//!
//! ```json
//! {
//!   "C24": { "density_mean": 420, "f_m_y_k": 24, "f_v_k": 4.0, "f_c_90_k": 2.5,
//!            "E_0_mean": 11000, "E_005": 7400, "G_mean": 690, "G_005": null }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use tracing::debug;

use super::{MaterialProperties, MaterialType};
use crate::errors::{CalcError, CalcResult};
use crate::file_io::read_json_file;

/// Strength grade → characteristic properties for one material type
pub type PropertyTable = BTreeMap<String, MaterialProperties>;

const SOFTWOOD_DATA: &str = include_str!("../../data/softwood_data.json");
const HARDWOOD_DATA: &str = include_str!("../../data/hardwood_data.json");
const GLULAM_DATA: &str = include_str!("../../data/glulam_data.json");
const LVL_DATA: &str = include_str!("../../data/lvl_data.json");
const GREEN_OAK_DATA: &str = include_str!("../../data/green_oak_data.json");

static BUILTIN: Lazy<CalcResult<PropertyStore>> = Lazy::new(|| {
    let mut store = PropertyStore::default();
    for (material_type, json) in [
        (MaterialType::Softwood, SOFTWOOD_DATA),
        (MaterialType::Hardwood, HARDWOOD_DATA),
        (MaterialType::Glulam, GLULAM_DATA),
        (MaterialType::Lvl, LVL_DATA),
        (MaterialType::GreenOak, GREEN_OAK_DATA),
    ] {
        store.insert_json(material_type, json)?;
    }
    Ok(store)
});

/// Property tables keyed by material type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    tables: BTreeMap<MaterialType, PropertyTable>,
}

impl PropertyStore {
    /// The embedded standard tables.
    pub fn builtin() -> CalcResult<&'static PropertyStore> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Load every `<type>_data.json` present in `dir`.
    ///
    /// Material types without a file are simply absent; resolving one of them
    /// later fails.
    pub fn from_dir(dir: &Path) -> CalcResult<Self> {
        if !dir.is_dir() {
            return Err(CalcError::file_error("read directory", dir.display().to_string(), "Not a directory"));
        }
        let mut store = PropertyStore::default();
        for material_type in MaterialType::ALL {
            let path = dir.join(material_type.data_file_name());
            if path.is_file() {
                store.load_table(material_type, &path)?;
            }
        }
        Ok(store)
    }

    /// Load one table file, replacing any existing table for the type.
    pub fn load_table(&mut self, material_type: MaterialType, path: &Path) -> CalcResult<()> {
        let table: PropertyTable = read_json_file(path)?;
        debug!(
            material = material_type.code(),
            path = %path.display(),
            grades = table.len(),
            "loaded property table"
        );
        self.insert_table(material_type, table)
    }

    /// Parse and insert a table from a JSON string.
    pub fn insert_json(&mut self, material_type: MaterialType, json: &str) -> CalcResult<()> {
        let table: PropertyTable = serde_json::from_str(json).map_err(|e| {
            CalcError::serialization(format!("{} property table: {}", material_type.code(), e))
        })?;
        self.insert_table(material_type, table)
    }

    /// Validate and insert a table.
    pub fn insert_table(&mut self, material_type: MaterialType, table: PropertyTable) -> CalcResult<()> {
        for (grade, props) in &table {
            props.validate(grade)?;
        }
        self.tables.insert(material_type, table);
        Ok(())
    }

    /// Table for a material type
    pub fn table(&self, material_type: MaterialType) -> CalcResult<&PropertyTable> {
        self.tables.get(&material_type).ok_or_else(|| {
            CalcError::file_error(
                "lookup",
                material_type.data_file_name(),
                "No property table loaded for this material type",
            )
        })
    }

    /// Strength grades available for a material type, sorted
    pub fn grades(&self, material_type: MaterialType) -> Vec<&str> {
        self.tables
            .get(&material_type)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Resolve a strength grade to its canonical key and properties.
    ///
    /// An exact key match wins; otherwise the grade is matched ignoring case
    /// and surrounding whitespace ("c24" finds "C24").
    pub fn resolve(
        &self,
        material_type: MaterialType,
        strength_grade: &str,
    ) -> CalcResult<(String, MaterialProperties)> {
        let table = self.table(material_type)?;
        let wanted = strength_grade.trim();

        let found = table.get_key_value(wanted).or_else(|| {
            table
                .iter()
                .find(|(grade, _)| grade.eq_ignore_ascii_case(wanted))
        });

        match found {
            Some((grade, props)) => Ok((grade.clone(), *props)),
            None => Err(CalcError::InvalidStrengthGrade {
                material_type: material_type.code().to_string(),
                strength_grade: strength_grade.to_string(),
                available: table.keys().cloned().collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_builtin_tables_load() {
        let store = PropertyStore::builtin().unwrap();
        for material_type in MaterialType::ALL {
            assert!(!store.grades(material_type).is_empty(), "{} has no grades", material_type);
        }
    }

    #[test]
    fn test_resolve_c24() {
        let store = PropertyStore::builtin().unwrap();
        let (grade, props) = store.resolve(MaterialType::Softwood, "C24").unwrap();
        assert_eq!(grade, "C24");
        assert_eq!(props.f_m_y_k, 24.0);
        assert_eq!(props.e_0_mean, 11000.0);
        assert_eq!(props.g_005, None);
    }

    #[test]
    fn test_resolve_ignores_case() {
        let store = PropertyStore::builtin().unwrap();
        let (grade, _) = store.resolve(MaterialType::Glulam, " gl24H ").unwrap();
        assert_eq!(grade, "GL24h");
    }

    #[test]
    fn test_resolve_missing_grade() {
        let store = PropertyStore::builtin().unwrap();
        match store.resolve(MaterialType::Softwood, "C99") {
            Err(CalcError::InvalidStrengthGrade { available, .. }) => {
                assert!(available.contains(&"C16".to_string()));
            }
            other => panic!("expected InvalidStrengthGrade, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_table() {
        let store = PropertyStore::default();
        let err = store.resolve(MaterialType::Lvl, "LVL 44 P").unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_insert_rejects_non_positive_values() {
        let mut store = PropertyStore::default();
        let json = r#"{ "X1": { "density_mean": 0, "f_m_y_k": 24, "f_v_k": 4.0, "f_c_90_k": 2.5,
                                "E_0_mean": 11000, "E_005": 7400, "G_mean": 690 } }"#;
        assert!(store.insert_json(MaterialType::Softwood, json).is_err());
        assert!(store.grades(MaterialType::Softwood).is_empty());
    }

    #[test]
    fn test_insert_rejects_bad_json() {
        let mut store = PropertyStore::default();
        let err = store.insert_json(MaterialType::Hardwood, "{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_from_dir_loads_present_files() {
        let dir = std::env::temp_dir().join(format!("timber_core_store_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("hardwood_data.json"), HARDWOOD_DATA).unwrap();

        let store = PropertyStore::from_dir(&dir).unwrap();
        assert!(store.resolve(MaterialType::Hardwood, "D30").is_ok());
        assert!(store.resolve(MaterialType::Softwood, "C24").is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_dir_rejects_missing_directory() {
        let err = PropertyStore::from_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
