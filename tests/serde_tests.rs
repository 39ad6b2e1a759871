mod fixtures;

#[cfg(feature = "serde")]
mod serde_tests {
    use cartesian::{DeriveError, ExpandError, Template, alt, expand};
    use serde_json::json;

    use crate::fixtures::build_matrix;

    #[test]
    #[ntest::timeout(100)]
    fn test_record_serialization_keeps_field_order() {
        let base = Template::object().field("output_option", "-o").build();
        let t = Template::object()
            .field("binary", "gcc")
            .field("flags", Template::seq(["-O2", "-g"]))
            .chain(&base)
            .build();

        let expanded = expand(&t).unwrap();
        let serialized = serde_json::to_string(&expanded).unwrap();
        assert_eq!(
            serialized,
            r#"[{"binary":"gcc","flags":["-O2","-g"],"output_option":"-o"}]"#
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_value_serialization() {
        let expanded = expand(&alt([
            Template::from(1),
            Template::from(2.5),
            Template::from(false),
            Template::from("x"),
            Template::from(cartesian::Value::Null),
        ]))
        .unwrap();

        let serialized = serde_json::to_value(&expanded).unwrap();
        assert_eq!(serialized, json!([1, 2.5, false, "x", null]));
    }

    #[test]
    #[ntest::timeout(1000)]
    fn test_matrix_serialization() {
        let expanded = expand(&build_matrix()).unwrap();
        let serialized = serde_json::to_value(&expanded).unwrap();

        let first = &serialized[0];
        assert_eq!(first["box"]["hostname"], json!("box1"));
        assert_eq!(first["compiler"]["output_option"], json!("-o"));
        assert_eq!(first["cmdline"], json!("gcc frobnicate.c -o frobnicate"));
        assert!(first.get("is").is_none());
        assert_eq!(serialized.as_array().unwrap().len(), 30);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_error_serialization() {
        let error = ExpandError::DerivedField {
            field_name: "cmdline".to_owned(),
            source: DeriveError::missing("compiler"),
        };

        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: ExpandError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, error);

        let cyclic = ExpandError::CyclicChain { links: 3 };
        assert_eq!(
            serde_json::to_value(&cyclic).unwrap(),
            json!({ "CyclicChain": { "links": 3 } })
        );
    }
}
