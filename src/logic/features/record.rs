//! Feature Record - One validated prediction request
//!
//! Built only through `builder::build`, never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::layout::{
    ColumnKind, ColumnSpec, InputSchema, BUILDING_TYPE_LEVELS, CONCRETE_GRADE_LEVELS,
    FEATURE_COUNT, FEATURE_LAYOUT, STEEL_GRADE_LEVELS,
};

// ============================================================================
// CATEGORICAL LEVELS
// ============================================================================

/// Defines a categorical column: enum, its training-frame labels, and parsing.
macro_rules! categorical {
    ($name:ident, $levels:ident, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn levels() -> &'static [&'static str] {
                $levels
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not one of {}",
                        other,
                        $levels.join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical!(BuildingType, BUILDING_TYPE_LEVELS, {
    Residential => "Residential",
    Commercial => "Commercial",
    Office => "Office",
});

categorical!(ConcreteGrade, CONCRETE_GRADE_LEVELS, {
    M20 => "M20",
    M25 => "M25",
});

categorical!(SteelGrade, STEEL_GRADE_LEVELS, {
    Fe415 => "Fe415",
    Fe500 => "Fe500",
    Fe550 => "Fe550",
});

// ============================================================================
// FEATURE VALUE
// ============================================================================

/// One typed cell of a record, in the form the models consume
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Text(&'static str),
    Integer(i64),
    Real(f64),
}

impl FeatureValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            FeatureValue::Text(_) => ColumnKind::Categorical,
            FeatureValue::Integer(_) => ColumnKind::Integer,
            FeatureValue::Real(_) => ColumnKind::Real,
        }
    }

    /// Numeric view, `None` for text
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FeatureValue::Text(_) => None,
            FeatureValue::Integer(v) => Some(v as f64),
            FeatureValue::Real(v) => Some(v),
        }
    }
}

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// Structural parameters of one building, all within their domains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    building_type: BuildingType,
    floor_count: u32,
    total_height_m: f64,
    plan_aspect_ratio: f64,
    concrete_grade: ConcreteGrade,
    steel_grade: SteelGrade,
    dead_load_kpa: f64,
    live_load_kpa: f64,
}

impl FeatureRecord {
    /// Only the builder assembles records; it has already checked domains.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn assemble(
        building_type: BuildingType,
        floor_count: u32,
        total_height_m: f64,
        plan_aspect_ratio: f64,
        concrete_grade: ConcreteGrade,
        steel_grade: SteelGrade,
        dead_load_kpa: f64,
        live_load_kpa: f64,
    ) -> Self {
        Self {
            building_type,
            floor_count,
            total_height_m,
            plan_aspect_ratio,
            concrete_grade,
            steel_grade,
            dead_load_kpa,
            live_load_kpa,
        }
    }

    pub fn building_type(&self) -> BuildingType {
        self.building_type
    }

    pub fn floor_count(&self) -> u32 {
        self.floor_count
    }

    pub fn total_height_m(&self) -> f64 {
        self.total_height_m
    }

    pub fn plan_aspect_ratio(&self) -> f64 {
        self.plan_aspect_ratio
    }

    pub fn concrete_grade(&self) -> ConcreteGrade {
        self.concrete_grade
    }

    pub fn steel_grade(&self) -> SteelGrade {
        self.steel_grade
    }

    pub fn dead_load_kpa(&self) -> f64 {
        self.dead_load_kpa
    }

    pub fn live_load_kpa(&self) -> f64 {
        self.live_load_kpa
    }

    /// Cells in FEATURE_LAYOUT order
    pub fn values(&self) -> [FeatureValue; FEATURE_COUNT] {
        [
            FeatureValue::Text(self.building_type.as_str()),
            FeatureValue::Integer(i64::from(self.floor_count)),
            FeatureValue::Real(self.total_height_m),
            FeatureValue::Real(self.plan_aspect_ratio),
            FeatureValue::Text(self.concrete_grade.as_str()),
            FeatureValue::Text(self.steel_grade.as_str()),
            FeatureValue::Real(self.dead_load_kpa),
            FeatureValue::Real(self.live_load_kpa),
        ]
    }

    /// Schema this record carries: layout names, kinds of the actual values
    pub fn schema(&self) -> InputSchema {
        InputSchema::new(
            FEATURE_LAYOUT
                .iter()
                .zip(self.values().iter())
                .map(|(&(name, _), value)| ColumnSpec::new(name, value.kind()))
                .collect(),
        )
    }
}
