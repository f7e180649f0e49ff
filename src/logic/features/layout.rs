//! Feature Layout - Centralized Input Schema
//!
//! **This file controls the column layout the trained models were fitted on.**
//!
//! ## Rules:
//! 1. Add a column → increment SCHEMA_VERSION
//! 2. Change order → increment SCHEMA_VERSION
//! 3. Rename a column → increment SCHEMA_VERSION
//!
//! The column identifiers are the exact headers of the training frame,
//! units included. They are a hard contract, never inferred.

use std::fmt;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// SCHEMA VERSION
// ============================================================================

/// Current layout version
pub const SCHEMA_VERSION: u8 = 1;

// ============================================================================
// COLUMN IDENTIFIERS
// ============================================================================

pub const BUILDING_TYPE: &str = "Building Type";
pub const FLOOR_COUNT: &str = "No. of Floors";
pub const TOTAL_HEIGHT: &str = "Total Height (m)";
pub const PLAN_ASPECT_RATIO: &str = "Plan Aspect Ratio";
pub const CONCRETE_GRADE: &str = "Concrete Grade";
pub const STEEL_GRADE: &str = "Steel Grade";
pub const DEAD_LOAD: &str = "Dead Load (kN/m²)";
pub const LIVE_LOAD: &str = "Live Load (kN/m²)";

// ============================================================================
// DOMAINS
// ============================================================================

pub const FLOOR_COUNT_RANGE: (f64, f64) = (1.0, 50.0);
pub const TOTAL_HEIGHT_RANGE: (f64, f64) = (3.0, 100.0);
pub const PLAN_ASPECT_RATIO_RANGE: (f64, f64) = (0.5, 3.0);
pub const DEAD_LOAD_RANGE: (f64, f64) = (2.0, 10.0);
pub const LIVE_LOAD_RANGE: (f64, f64) = (1.0, 5.0);

pub const BUILDING_TYPE_LEVELS: &[&str] = &["Residential", "Commercial", "Office"];
pub const CONCRETE_GRADE_LEVELS: &[&str] = &["M20", "M25"];
pub const STEEL_GRADE_LEVELS: &[&str] = &["Fe415", "Fe500", "Fe550"];

// Input form starting values; selects start on their first level.
pub const FLOOR_COUNT_DEFAULT: i64 = 5;
pub const TOTAL_HEIGHT_DEFAULT: f64 = 15.0;
pub const PLAN_ASPECT_RATIO_DEFAULT: f64 = 1.5;
pub const DEAD_LOAD_DEFAULT: f64 = 5.0;
pub const LIVE_LOAD_DEFAULT: f64 = 3.0;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Value kind of a column as the models consume it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Categorical,
    Integer,
    Real,
}

impl ColumnKind {
    fn tag(self) -> u8 {
        match self {
            ColumnKind::Categorical => b'c',
            ColumnKind::Integer => b'i',
            ColumnKind::Real => b'r',
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Real => write!(f, "real"),
        }
    }
}

/// Columns in the exact order the models expect them
pub const FEATURE_LAYOUT: &[(&str, ColumnKind)] = &[
    (BUILDING_TYPE, ColumnKind::Categorical),     // 0
    (FLOOR_COUNT, ColumnKind::Integer),           // 1
    (TOTAL_HEIGHT, ColumnKind::Real),             // 2
    (PLAN_ASPECT_RATIO, ColumnKind::Real),        // 3
    (CONCRETE_GRADE, ColumnKind::Categorical),    // 4
    (STEEL_GRADE, ColumnKind::Categorical),       // 5
    (DEAD_LOAD, ColumnKind::Real),                // 6
    (LIVE_LOAD, ColumnKind::Real),                // 7
];

/// Total number of columns
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 8;

// ============================================================================
// INPUT SCHEMA
// ============================================================================

/// One named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self { name: name.into(), kind }
    }
}

/// Ordered column list, either the one records are built with or the one
/// a loaded model declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSchema {
    columns: Vec<ColumnSpec>,
}

impl InputSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// The layout every `FeatureRecord` is built with
    pub fn current() -> Self {
        Self::new(
            FEATURE_LAYOUT
                .iter()
                .map(|&(name, kind)| ColumnSpec::new(name, kind))
                .collect(),
        )
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// CRC32 fingerprint over the ordered (name, kind) pairs
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = Hasher::new();
        for column in &self.columns {
            hasher.update(column.name.as_bytes());
            hasher.update(&[0, column.kind.tag(), 0]);
        }
        hasher.finalize()
    }

    /// First difference between `self` (what a model expects) and `provided`
    /// (what a record carries). `None` means the schemas are identical.
    pub fn diff(&self, provided: &InputSchema) -> Option<SchemaMismatch> {
        if self.len() != provided.len() {
            return Some(SchemaMismatch::ColumnCount {
                expected: self.len(),
                actual: provided.len(),
            });
        }

        for (position, (expected, actual)) in self.columns.iter().zip(&provided.columns).enumerate() {
            if expected.name != actual.name {
                return Some(SchemaMismatch::ColumnName {
                    position,
                    expected: expected.name.clone(),
                    actual: actual.name.clone(),
                });
            }
            if expected.kind != actual.kind {
                return Some(SchemaMismatch::ColumnKind {
                    position,
                    column: expected.name.clone(),
                    expected: expected.kind,
                    actual: actual.kind,
                });
            }
        }

        None
    }
}

/// Where two schemas first disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaMismatch {
    ColumnCount {
        expected: usize,
        actual: usize,
    },
    ColumnName {
        position: usize,
        expected: String,
        actual: String,
    },
    ColumnKind {
        position: usize,
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },
}

impl fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaMismatch::ColumnCount { expected, actual } => {
                write!(f, "expected {} columns, record has {}", expected, actual)
            }
            SchemaMismatch::ColumnName { position, expected, actual } => write!(
                f,
                "column {} should be '{}', record has '{}'",
                position, expected, actual
            ),
            SchemaMismatch::ColumnKind { position, column, expected, actual } => write!(
                f,
                "column {} ('{}') should be {}, record has {}",
                position, column, expected, actual
            ),
        }
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of version + current layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[SCHEMA_VERSION]);
    hasher.update(&InputSchema::current().fingerprint().to_le_bytes());
    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// SCHEMA INFO (served to clients)
// ============================================================================

/// Allowed values of a column
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ColumnDomain {
    Range { min: f64, max: f64 },
    Levels { levels: Vec<String> },
}

impl ColumnDomain {
    fn range((min, max): (f64, f64)) -> Self {
        ColumnDomain::Range { min, max }
    }

    fn levels(levels: &[&str]) -> Self {
        ColumnDomain::Levels {
            levels: levels.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Starting value of a column's form control
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnDefault {
    Integer(i64),
    Real(f64),
    Level(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub domain: ColumnDomain,
    pub default: ColumnDefault,
}

/// Complete layout information for clients and logging
#[derive(Debug, Clone, Serialize)]
pub struct SchemaInfo {
    pub version: u8,
    pub hash: u32,
    pub column_count: usize,
    pub columns: Vec<ColumnInfo>,
}

impl SchemaInfo {
    pub fn current() -> Self {
        let columns = FEATURE_LAYOUT
            .iter()
            .map(|&(name, kind)| ColumnInfo {
                name: name.to_string(),
                kind,
                domain: column_domain(name),
                default: column_default(name),
            })
            .collect();

        Self {
            version: SCHEMA_VERSION,
            hash: layout_hash(),
            column_count: FEATURE_COUNT,
            columns,
        }
    }
}

fn column_default(name: &str) -> ColumnDefault {
    let first = |levels: &[&str]| ColumnDefault::Level(levels[0].to_string());
    match name {
        BUILDING_TYPE => first(BUILDING_TYPE_LEVELS),
        CONCRETE_GRADE => first(CONCRETE_GRADE_LEVELS),
        STEEL_GRADE => first(STEEL_GRADE_LEVELS),
        FLOOR_COUNT => ColumnDefault::Integer(FLOOR_COUNT_DEFAULT),
        TOTAL_HEIGHT => ColumnDefault::Real(TOTAL_HEIGHT_DEFAULT),
        PLAN_ASPECT_RATIO => ColumnDefault::Real(PLAN_ASPECT_RATIO_DEFAULT),
        DEAD_LOAD => ColumnDefault::Real(DEAD_LOAD_DEFAULT),
        _ => ColumnDefault::Real(LIVE_LOAD_DEFAULT),
    }
}

fn column_domain(name: &str) -> ColumnDomain {
    match name {
        BUILDING_TYPE => ColumnDomain::levels(BUILDING_TYPE_LEVELS),
        CONCRETE_GRADE => ColumnDomain::levels(CONCRETE_GRADE_LEVELS),
        STEEL_GRADE => ColumnDomain::levels(STEEL_GRADE_LEVELS),
        FLOOR_COUNT => ColumnDomain::range(FLOOR_COUNT_RANGE),
        TOTAL_HEIGHT => ColumnDomain::range(TOTAL_HEIGHT_RANGE),
        PLAN_ASPECT_RATIO => ColumnDomain::range(PLAN_ASPECT_RATIO_RANGE),
        DEAD_LOAD => ColumnDomain::range(DEAD_LOAD_RANGE),
        _ => ColumnDomain::range(LIVE_LOAD_RANGE),
    }
}
