//! Feature Record Builder
//!
//! Assembles loosely typed request fields into a `FeatureRecord`.
//! The input form already bounds its controls, but the models are
//! undefined outside their training domain, so every field is checked
//! again here and all violations are reported together.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::layout::{
    BUILDING_TYPE, CONCRETE_GRADE, DEAD_LOAD, FEATURE_LAYOUT, FLOOR_COUNT, LIVE_LOAD,
    PLAN_ASPECT_RATIO, STEEL_GRADE, TOTAL_HEIGHT,
};
use super::column_index;
use super::record::{BuildingType, ConcreteGrade, FeatureRecord, SteelGrade};
use crate::logic::error::InvalidInputError;

/// Raw request fields. Every field is optional so that absence is reported
/// as an input error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserInputs {
    #[serde(alias = "Building Type")]
    #[validate(required)]
    pub building_type: Option<String>,

    #[serde(alias = "No. of Floors")]
    #[validate(required, range(min = 1.0, max = 50.0))]
    pub floor_count: Option<f64>,

    #[serde(alias = "Total Height (m)")]
    #[validate(required, range(min = 3.0, max = 100.0))]
    pub total_height_m: Option<f64>,

    #[serde(alias = "Plan Aspect Ratio")]
    #[validate(required, range(min = 0.5, max = 3.0))]
    pub plan_aspect_ratio: Option<f64>,

    #[serde(alias = "Concrete Grade")]
    #[validate(required)]
    pub concrete_grade: Option<String>,

    #[serde(alias = "Steel Grade")]
    #[validate(required)]
    pub steel_grade: Option<String>,

    #[serde(alias = "Dead Load (kN/m²)")]
    #[validate(required, range(min = 2.0, max = 10.0))]
    pub dead_load_kpa: Option<f64>,

    #[serde(alias = "Live Load (kN/m²)")]
    #[validate(required, range(min = 1.0, max = 5.0))]
    pub live_load_kpa: Option<f64>,
}

/// Maps a request field to its layout column
fn column_for_field(field: &str) -> &'static str {
    match field {
        "building_type" => BUILDING_TYPE,
        "floor_count" => FLOOR_COUNT,
        "total_height_m" => TOTAL_HEIGHT,
        "plan_aspect_ratio" => PLAN_ASPECT_RATIO,
        "concrete_grade" => CONCRETE_GRADE,
        "steel_grade" => STEEL_GRADE,
        "dead_load_kpa" => DEAD_LOAD,
        _ => LIVE_LOAD,
    }
}

/// Violations keyed by layout position so they come out in column order
#[derive(Default)]
struct Violations(BTreeMap<usize, String>);

impl Violations {
    fn add(&mut self, column: &'static str, reason: impl Into<String>) {
        let position = column_index(column).unwrap_or(FEATURE_LAYOUT.len());
        self.0
            .entry(position)
            .or_insert_with(|| format!("{}: {}", column, reason.into()));
    }

    fn absorb(&mut self, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            let column = column_for_field(field.as_ref());
            for error in field_errors.iter() {
                let reason = match error.code.as_ref() {
                    "required" => "is missing".to_string(),
                    "range" => match (error.params.get("min"), error.params.get("max")) {
                        (Some(min), Some(max)) => format!("must be between {} and {}", min, max),
                        _ => "is out of range".to_string(),
                    },
                    code => code.to_string(),
                };
                self.add(column, reason);
            }
        }
    }

    fn into_result(self) -> Result<(), InvalidInputError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(InvalidInputError {
                violations: self.0.into_values().collect(),
            })
        }
    }
}

fn check_finite(violations: &mut Violations, column: &'static str, value: Option<f64>) {
    if let Some(v) = value {
        if !v.is_finite() {
            violations.add(column, "must be a finite number");
        }
    }
}

fn parse_level<T>(violations: &mut Violations, column: &'static str, raw: Option<&str>) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    match raw?.parse::<T>() {
        Ok(level) => Some(level),
        Err(reason) => {
            violations.add(column, reason);
            None
        }
    }
}

/// Build a record from raw inputs, or report every invalid field
pub fn build(inputs: &UserInputs) -> Result<FeatureRecord, InvalidInputError> {
    let mut violations = Violations::default();

    // Non-finite values slip through range checks, so they are flagged first.
    check_finite(&mut violations, FLOOR_COUNT, inputs.floor_count);
    check_finite(&mut violations, TOTAL_HEIGHT, inputs.total_height_m);
    check_finite(&mut violations, PLAN_ASPECT_RATIO, inputs.plan_aspect_ratio);
    check_finite(&mut violations, DEAD_LOAD, inputs.dead_load_kpa);
    check_finite(&mut violations, LIVE_LOAD, inputs.live_load_kpa);

    if let Err(errors) = inputs.validate() {
        violations.absorb(&errors);
    }

    if let Some(floors) = inputs.floor_count {
        if floors.fract() != 0.0 {
            violations.add(FLOOR_COUNT, "must be a whole number");
        }
    }

    let building_type =
        parse_level::<BuildingType>(&mut violations, BUILDING_TYPE, inputs.building_type.as_deref());
    let concrete_grade =
        parse_level::<ConcreteGrade>(&mut violations, CONCRETE_GRADE, inputs.concrete_grade.as_deref());
    let steel_grade =
        parse_level::<SteelGrade>(&mut violations, STEEL_GRADE, inputs.steel_grade.as_deref());

    violations.into_result()?;

    // Every field is present and in domain past this point.
    match (
        building_type,
        inputs.floor_count,
        inputs.total_height_m,
        inputs.plan_aspect_ratio,
        concrete_grade,
        steel_grade,
        inputs.dead_load_kpa,
        inputs.live_load_kpa,
    ) {
        (
            Some(building_type),
            Some(floors),
            Some(height),
            Some(aspect),
            Some(concrete_grade),
            Some(steel_grade),
            Some(dead),
            Some(live),
        ) => Ok(FeatureRecord::assemble(
            building_type,
            floors as u32,
            height,
            aspect,
            concrete_grade,
            steel_grade,
            dead,
            live,
        )),
        _ => Err(InvalidInputError::single("incomplete input record")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> UserInputs {
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

    #[test]
    fn test_build_valid() {
        let record = build(&valid()).unwrap();
        assert_eq!(record.building_type(), BuildingType::Residential);
        assert_eq!(record.floor_count(), 5);
        assert_eq!(record.total_height_m(), 15.0);
        assert_eq!(record.steel_grade(), SteelGrade::Fe415);
    }

    #[test]
    fn test_missing_field() {
        let mut inputs = valid();
        inputs.steel_grade = None;

        let err = build(&inputs).unwrap_err();
        assert_eq!(err.violations, vec!["Steel Grade: is missing".to_string()]);
    }

    #[test]
    fn test_domain_bounds_inclusive() {
        let mut inputs = valid();
        inputs.floor_count = Some(50.0);
        inputs.total_height_m = Some(3.0);
        inputs.plan_aspect_ratio = Some(3.0);
        inputs.dead_load_kpa = Some(2.0);
        inputs.live_load_kpa = Some(5.0);
        assert!(build(&inputs).is_ok());
    }

    #[test]
    fn test_out_of_domain() {
        let mut inputs = valid();
        inputs.total_height_m = Some(100.5);

        let err = build(&inputs).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.violations[0].starts_with("Total Height (m): must be between"));
    }

    #[test]
    fn test_zero_floors_rejected() {
        let mut inputs = valid();
        inputs.floor_count = Some(0.0);
        assert!(build(&inputs).is_err());
    }

    #[test]
    fn test_fractional_floors_rejected() {
        let mut inputs = valid();
        inputs.floor_count = Some(4.5);

        let err = build(&inputs).unwrap_err();
        assert_eq!(err.violations, vec!["No. of Floors: must be a whole number".to_string()]);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut inputs = valid();
        inputs.dead_load_kpa = Some(f64::NAN);

        let err = build(&inputs).unwrap_err();
        assert_eq!(err.violations, vec!["Dead Load (kN/m²): must be a finite number".to_string()]);
    }

    #[test]
    fn test_unknown_level() {
        let mut inputs = valid();
        inputs.concrete_grade = Some("M30".into());

        let err = build(&inputs).unwrap_err();
        assert!(err.violations[0].starts_with("Concrete Grade: 'M30' is not one of"));
    }

    #[test]
    fn test_all_violations_in_column_order() {
        let inputs = UserInputs {
            live_load_kpa: Some(9.0),
            ..UserInputs::default()
        };

        let err = build(&inputs).unwrap_err();
        assert_eq!(err.violations.len(), 8);
        assert!(err.violations[0].starts_with("Building Type"));
        assert!(err.violations[7].starts_with("Live Load (kN/m²): must be between"));
    }

    #[test]
    fn test_deserialize_with_column_headers() {
        let json = r#"{
            "Building Type": "Office",
            "No. of Floors": 10,
            "Total Height (m)": 32.5,
            "Plan Aspect Ratio": 2.0,
            "Concrete Grade": "M25",
            "Steel Grade": "Fe550",
            "Dead Load (kN/m²)": 6.0,
            "Live Load (kN/m²)": 2.5
        }"#;
        let inputs: UserInputs = serde_json::from_str(json).unwrap();
        let record = build(&inputs).unwrap();
        assert_eq!(record.floor_count(), 10);
        assert_eq!(record.concrete_grade(), ConcreteGrade::M25);
    }
}
