//! Integration tests for parameter validation and request resolution.

use serde_json::{json, Map, Value};
use profile_spec::{
    check_request, find_operation, parse, validate, CollectionFormat, DataFormat, DataType,
    EnumValues, Method, Parameter, Property, RequestVerdict, Schema,
};

fn integer() -> Property {
    Property::new(DataType::Integer)
}

fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// === Absent Values ===

mod absent_values {
    use super::*;

    #[test]
    fn required_rejects_missing() {
        let p = Parameter::query("serviceId", Property::new(DataType::String)).required(true);
        assert!(!validate(&p, None));
        assert!(!validate(&p, Some(&Value::Null)));
    }

    #[test]
    fn optional_accepts_missing() {
        let p = Parameter::query("serviceId", Property::new(DataType::String));
        assert!(validate(&p, None));
        assert!(validate(&p, Some(&Value::Null)));
    }

    #[test]
    fn optional_still_checks_supplied_value() {
        let p = Parameter::query("count", integer().with_maximum(5));
        assert!(!validate(&p, Some(&json!(6))));
    }
}

// === Integers ===

mod integers {
    use super::*;

    #[test]
    fn enum_accepts_members_only() {
        let p = Parameter::query("level", integer().with_enum(EnumValues::Int32(vec![1, 2, 3])));
        assert!(validate(&p, Some(&json!("2"))));
        assert!(!validate(&p, Some(&json!("4"))));
        assert!(validate(&p, Some(&json!(2))));
    }

    #[test]
    fn enum_skips_bounds() {
        let p = Parameter::query(
            "level",
            integer()
                .with_enum(EnumValues::Int32(vec![1, 20]))
                .with_maximum(10),
        );
        assert!(validate(&p, Some(&json!(20))));
    }

    #[test]
    fn exclusive_maximum() {
        let p = Parameter::query(
            "level",
            integer()
                .with_minimum(0)
                .with_maximum(10)
                .exclusive_maximum(true),
        );
        assert!(!validate(&p, Some(&json!(10))));
        assert!(validate(&p, Some(&json!(9))));
        assert!(!validate(&p, Some(&json!(-1))));
        assert!(validate(&p, Some(&json!(0))));
    }

    #[test]
    fn unparseable_text_is_invalid() {
        let p = Parameter::query("level", integer());
        assert!(!validate(&p, Some(&json!("ten"))));
        assert!(!validate(&p, Some(&json!("1.5"))));
    }

    #[test]
    fn int64_accepts_large_values() {
        let p = Parameter::query("ts", integer().with_format(DataFormat::Int64));
        assert!(validate(&p, Some(&json!("9000000000"))));

        let p = Parameter::query("ts", integer());
        assert!(!validate(&p, Some(&json!("9000000000"))));
    }
}

// === Numbers ===

mod numbers {
    use super::*;

    #[test]
    fn inclusive_bounds() {
        let p = Parameter::query(
            "ratio",
            Property::new(DataType::Number)
                .with_minimum(0)
                .with_maximum(1),
        );
        assert!(validate(&p, Some(&json!("0.5"))));
        assert!(validate(&p, Some(&json!(1))));
        assert!(!validate(&p, Some(&json!(1.5))));
        assert!(!validate(&p, Some(&json!("abc"))));
    }
}

// === Strings ===

mod strings {
    use super::*;

    #[test]
    fn rgb_requires_six_hex_digits() {
        let schema = Schema::from(Property::new(DataType::String).with_format(DataFormat::Rgb));
        assert!(validate(&schema, Some(&json!("aa11bb"))));
        assert!(!validate(&schema, Some(&json!("zz11bb"))));
        assert!(!validate(&schema, Some(&json!("aa11b"))));
    }

    #[test]
    fn text_lengths_are_exclusive() {
        let p = Parameter::query(
            "name",
            Property::new(DataType::String)
                .with_min_length(1)
                .with_max_length(4),
        );
        assert!(!validate(&p, Some(&json!("a"))));
        assert!(validate(&p, Some(&json!("ab"))));
        assert!(validate(&p, Some(&json!("abc"))));
        assert!(!validate(&p, Some(&json!("abcd"))));
    }

    #[test]
    fn enum_skips_length() {
        let p = Parameter::query(
            "mode",
            Property::new(DataType::String)
                .with_enum(EnumValues::String(vec!["continuous".into()]))
                .with_max_length(3),
        );
        assert!(validate(&p, Some(&json!("continuous"))));
        assert!(!validate(&p, Some(&json!("on"))));
    }

    #[test]
    fn date_formats_accept_anything() {
        let p = Parameter::query(
            "since",
            Property::new(DataType::String)
                .with_format(DataFormat::DateTime)
                .with_max_length(2),
        );
        assert!(validate(&p, Some(&json!("not a date at all"))));
    }
}

// === Booleans ===

mod booleans {
    use super::*;

    #[test]
    fn text_is_case_insensitive() {
        let p = Parameter::query("flag", Property::new(DataType::Boolean));
        assert!(validate(&p, Some(&json!("TRUE"))));
        assert!(validate(&p, Some(&json!("false"))));
        assert!(validate(&p, Some(&json!(true))));
        assert!(!validate(&p, Some(&json!("yes"))));
        assert!(!validate(&p, Some(&json!(1))));
    }
}

// === Arrays ===

mod arrays {
    use super::*;

    fn list(format: CollectionFormat) -> Parameter {
        Parameter::query(
            "ids",
            Property::new(DataType::Array)
                .with_items(integer())
                .with_collection_format(format),
        )
    }

    #[test]
    fn csv_checks_every_token() {
        let p = list(CollectionFormat::Csv);
        assert!(validate(&p, Some(&json!("1,2,3"))));
        assert!(!validate(&p, Some(&json!("1,x,3"))));
    }

    #[test]
    fn delimiters() {
        assert!(validate(&list(CollectionFormat::Ssv), Some(&json!("1 2 3"))));
        assert!(validate(&list(CollectionFormat::Tsv), Some(&json!("1\t2\t3"))));
        assert!(!validate(&list(CollectionFormat::Ssv), Some(&json!("1,2,3"))));
    }

    #[test]
    fn pipes_split_on_literal_pipe() {
        let p = list(CollectionFormat::Pipes);
        assert!(validate(&p, Some(&json!("1|2|3"))));
        assert!(!validate(&p, Some(&json!("1|x|3"))));
        // splitting per character would turn "12" into two tokens and "|" into none
        assert!(validate(&p, Some(&json!("12|34"))));
        assert!(!validate(&p, Some(&json!("1,2|3"))));
    }

    #[test]
    fn multi_is_unsupported_for_text() {
        let p = list(CollectionFormat::Multi);
        assert!(!validate(&p, Some(&json!("1"))));
    }

    #[test]
    fn empty_value_needs_allow_empty() {
        let p = list(CollectionFormat::Csv);
        assert!(!validate(&p, Some(&json!(""))));

        let p = Parameter::query(
            "ids",
            Property::new(DataType::Array)
                .with_items(integer())
                .allow_empty_value(true),
        );
        assert!(validate(&p, Some(&json!(""))));
    }

    #[test]
    fn native_arrays() {
        let p = list(CollectionFormat::Csv);
        assert!(validate(&p, Some(&json!([1, 2, 3]))));
        assert!(!validate(&p, Some(&json!([1, "x"]))));
    }
}

// === Permissive Types ===

mod permissive {
    use super::*;

    #[test]
    fn file_and_untyped_accept_anything() {
        let file = Parameter::form_data("data", Property::new(DataType::File));
        assert!(validate(&file, Some(&json!({"any": "thing"}))));

        let untyped = Parameter::query("x", Property::default());
        assert!(validate(&untyped, Some(&json!([1, "two"]))));
    }

    #[test]
    fn body_delegates_to_schema() {
        let body = Parameter::body("level", Schema::from(integer().with_maximum(3)));
        assert!(validate(&body, Some(&json!(3))));
        assert!(!validate(&body, Some(&json!(4))));
    }
}

// === Parse and Resolve ===

mod parse_and_resolve {
    use super::*;

    fn document() -> Value {
        json!({
            "swagger": "2.0",
            "basePath": "/gotapi/light",
            "info": { "title": "Light Profile", "version": "1.0" },
            "paths": {
                "/": {
                    "parameters": [
                        { "name": "serviceId", "in": "query", "required": true, "type": "string" }
                    ],
                    "get": {
                        "x-type": "one-shot",
                        "parameters": [
                            { "name": "serviceId", "in": "query", "required": true, "type": "string" }
                        ],
                        "responses": { "200": { "description": "lights" } }
                    },
                    "post": {
                        "x-type": "one-shot",
                        "parameters": [
                            { "name": "lightId", "in": "formData", "type": "string" },
                            { "name": "brightness", "in": "formData", "type": "number",
                              "minimum": 0, "maximum": 1 },
                            { "name": "color", "in": "formData", "type": "string", "format": "rgb" },
                            { "name": "flashing", "in": "formData", "type": "array",
                              "items": { "type": "integer" } }
                        ],
                        "responses": { "200": { "description": "ok" } }
                    }
                }
            }
        })
    }

    #[test]
    fn declared_parameter_count_survives() {
        let doc = parse(&document()).unwrap();

        let post = find_operation(&doc, Method::Post, "/gotapi/light").unwrap();
        assert_eq!(post.parameters.len(), 4);

        let get = find_operation(&doc, Method::Get, "/GOTAPI/Light/").unwrap();
        assert_eq!(get.parameters.len(), 1);
    }

    #[test]
    fn request_with_valid_values() {
        let doc = parse(&document()).unwrap();
        let supplied = values(&[
            ("serviceId", json!("host")),
            ("brightness", json!("0.5")),
            ("color", json!("ff0000")),
            ("flashing", json!("100,200,100")),
        ]);

        assert_eq!(
            check_request(&doc, Method::Post, "/gotapi/light", &supplied),
            RequestVerdict::Valid
        );
    }

    #[test]
    fn request_reports_invalid_parameters_in_order() {
        let doc = parse(&document()).unwrap();
        let supplied = values(&[
            ("serviceId", json!("host")),
            ("brightness", json!(2)),
            ("color", json!("red")),
        ]);

        let RequestVerdict::Invalid(bad) =
            check_request(&doc, Method::Post, "/gotapi/light", &supplied)
        else {
            panic!("expected invalid verdict");
        };
        let names: Vec<&str> = bad.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["brightness", "color"]);
    }

    #[test]
    fn path_level_parameters_apply() {
        let doc = parse(&document()).unwrap();
        let verdict = check_request(&doc, Method::Post, "/gotapi/light", &Map::new());
        assert!(!verdict.is_valid());
    }

    #[test]
    fn undeclared_request_is_unconstrained() {
        let doc = parse(&document()).unwrap();
        assert_eq!(
            check_request(&doc, Method::Delete, "/gotapi/light", &Map::new()),
            RequestVerdict::Unresolved
        );
        assert_eq!(
            check_request(&doc, Method::Get, "/gotapi/light/group", &Map::new()),
            RequestVerdict::Unresolved
        );
    }
}

// === Parameter Precedence ===

mod parameter_precedence {
    use super::*;

    fn service_id(max_length: u64) -> Value {
        json!({ "name": "serviceId", "in": "query", "required": true,
                "type": "string", "maxLength": max_length })
    }

    fn document(path_level: Option<u64>, operation_level: Option<u64>) -> Value {
        let mut item = json!({ "get": {} });
        if let Some(max) = path_level {
            item["parameters"] = json!([service_id(max)]);
        }
        if let Some(max) = operation_level {
            item["get"]["parameters"] = json!([service_id(max)]);
        }
        json!({
            "swagger": "2.0",
            "basePath": "/gotapi/light",
            "parameters": { "serviceId": service_id(5) },
            "paths": { "/": item }
        })
    }

    fn accepts(doc: &Value, service_id: &str) -> bool {
        let doc = parse(doc).unwrap();
        let supplied = values(&[("serviceId", json!(service_id))]);
        check_request(&doc, Method::Get, "/gotapi/light", &supplied).is_valid()
    }

    #[test]
    fn document_parameters_apply_to_every_operation() {
        let doc = parse(&document(None, None)).unwrap();
        assert!(!check_request(&doc, Method::Get, "/gotapi/light", &Map::new()).is_valid());

        let doc = document(None, None);
        assert!(!accepts(&doc, "01234567890123"));
        assert!(!accepts(&doc, "012345678"));
        assert!(accepts(&doc, "0123"));
    }

    #[test]
    fn path_parameters_override_document_parameters() {
        let doc = document(Some(10), None);
        assert!(!accepts(&doc, "01234567890123"));
        assert!(accepts(&doc, "012345678"));
        assert!(accepts(&doc, "0123"));
    }

    #[test]
    fn operation_parameters_override_both() {
        let doc = document(Some(10), Some(15));
        assert!(accepts(&doc, "01234567890123"));
        assert!(accepts(&doc, "012345678"));
        assert!(accepts(&doc, "0123"));
    }

    #[test]
    fn uppercase_method_key_is_validated() {
        let doc = parse(&json!({
            "basePath": "/gotapi/light",
            "paths": { "/": { "GET": { "parameters": [
                { "name": "n", "in": "query", "type": "integer", "maximum": 3 }
            ] } } }
        }))
        .unwrap();

        let too_big = values(&[("n", json!("99"))]);
        assert!(matches!(
            check_request(&doc, Method::Get, "/gotapi/light", &too_big),
            RequestVerdict::Invalid(_)
        ));
        let fine = values(&[("n", json!("2"))]);
        assert_eq!(
            check_request(&doc, Method::Get, "/gotapi/light", &fine),
            RequestVerdict::Valid
        );
    }
}
