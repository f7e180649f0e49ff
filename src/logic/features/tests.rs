//! Cross-module tests for the feature layout, record and builder

#[cfg(test)]
mod integration_tests {
    use crate::logic::features::{
        column_index, column_name, layout, sample_inputs, sample_record, ColumnKind,
        FeatureValue, InputSchema, FEATURE_COUNT, FEATURE_LAYOUT, SCHEMA_VERSION,
    };

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 8);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout::compute_layout_hash(), layout::layout_hash());
        assert_ne!(layout::layout_hash(), 0);
    }

    #[test]
    fn test_column_lookup() {
        assert_eq!(column_index("Building Type"), Some(0));
        assert_eq!(column_index("Total Height (m)"), Some(2));
        assert_eq!(column_index("Live Load (kN/m²)"), Some(7));
        assert_eq!(column_index("Height"), None);

        assert_eq!(column_name(1), Some("No. of Floors"));
        assert_eq!(column_name(8), None);
    }

    #[test]
    fn test_built_record_matches_current_schema() {
        let record = sample_record();
        assert_eq!(record.schema(), InputSchema::current());
        assert_eq!(record.schema().diff(&InputSchema::current()), None);
    }

    #[test]
    fn test_record_cells_match_schema_kinds() {
        let record = sample_record();
        let schema = record.schema();
        for (value, column) in record.values().iter().zip(schema.columns()) {
            assert_eq!(value.kind(), column.kind, "column {}", column.name);
        }
    }

    #[test]
    fn test_integer_column_carries_floor_count() {
        let mut inputs = sample_inputs();
        inputs.floor_count = Some(12.0);
        let record = crate::logic::features::build(&inputs).unwrap();

        let idx = column_index("No. of Floors").unwrap();
        assert_eq!(FEATURE_LAYOUT[idx].1, ColumnKind::Integer);
        assert_eq!(record.values()[idx], FeatureValue::Integer(12));
    }

    #[test]
    fn test_schema_info_reflects_layout() {
        let info = layout::SchemaInfo::current();
        assert_eq!(info.version, SCHEMA_VERSION);
        assert_eq!(info.hash, layout::layout_hash());
        let names: Vec<&str> = info.columns.iter().map(|c| c.name.as_str()).collect();
        let expected: Vec<&str> = FEATURE_LAYOUT.iter().map(|&(n, _)| n).collect();
        assert_eq!(names, expected);
    }
}
