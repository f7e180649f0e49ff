//! Features Module - Input Schema and Record Assembly
//!
//! Everything the models see passes through here: the authoritative
//! column layout, the typed record, and the builder that fills it.

pub mod layout;
pub mod record;
pub mod builder;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{
    ColumnKind, ColumnSpec, InputSchema, SchemaInfo, SchemaMismatch, FEATURE_COUNT,
    FEATURE_LAYOUT, SCHEMA_VERSION,
};
pub use record::{BuildingType, ConcreteGrade, FeatureRecord, FeatureValue, SteelGrade};
pub use builder::{build, UserInputs};

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Column index by name
pub fn column_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&(n, _)| n == name)
}

/// Column name by index
pub fn column_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).map(|&(name, _)| name)
}

/// The inputs of the reference building (5 storeys, 15 m), shared by tests
#[cfg(test)]
pub fn sample_inputs() -> UserInputs {
    UserInputs {
        building_type: Some("Residential".into()),
        floor_count: Some(5.0),
        total_height_m: Some(15.0),
        plan_aspect_ratio: Some(1.5),
        concrete_grade: Some("M20".into()),
        steel_grade: Some("Fe415".into()),
        dead_load_kpa: Some(5.0),
        live_load_kpa: Some(3.0),
    }
}

#[cfg(test)]
pub fn sample_record() -> FeatureRecord {
    build(&sample_inputs()).expect("sample inputs are valid")
}
