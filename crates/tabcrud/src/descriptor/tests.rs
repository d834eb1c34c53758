use super::*;
use crate::clause::{EqualClause, InClause, RangeClause, UpdateClause};
use serde_json::json;

#[test]
fn test_parse_three_operators() {
    let raw = json!([
        {"field": "field1", "operator": "equals", "values": [123]},
        {"field": "field2", "operator": "in", "values": ["A", "B"]},
        {"field": "field3", "operator": "range", "values": [0, 10]},
    ]);
    let clauses = parse_where(&raw).unwrap();
    assert_eq!(
        clauses,
        vec![
            Clause::Equal(EqualClause {
                field: "field1".into(),
                value: json!(123),
            }),
            Clause::In(InClause {
                field: "field2".into(),
                values: vec![json!("A"), json!("B")],
                exclude: false,
            }),
            Clause::Range(RangeClause {
                field: "field3".into(),
                min: Some(json!(0)),
                max: Some(json!(10)),
                include_nulls: false,
            }),
        ]
    );
}

#[test]
fn test_parse_optional_flags() {
    let raw = json!([
        {"field": "f", "operator": "in", "values": [], "exclude": true},
        {"field": "g", "operator": "range", "values": [null, 5], "includeNulls": true},
    ]);
    let clauses = parse_where(&raw).unwrap();
    assert_eq!(clauses[0], Clause::in_list("f", vec![], true));
    assert_eq!(clauses[1], Clause::range("g", None, Some(json!(5)), true));
}

#[test]
fn test_parse_empty_list() {
    assert!(parse_where(&json!([])).unwrap().is_empty());
}

#[test]
fn test_where_not_a_list() {
    let err = parse_where(&json!({"field": "f"})).unwrap_err();
    assert!(matches!(err, CrudError::Structural { entry: None, .. }));
}

#[test]
fn test_structural_errors_carry_index() {
    let good = json!({"field": "ok", "operator": "equals", "values": [1]});
    let cases = vec![
        json!("not an object"),
        json!({"operator": "equals", "values": [1]}),
        json!({"field": 5, "operator": "equals", "values": [1]}),
        json!({"field": "f", "values": [1]}),
        json!({"field": "f", "operator": true, "values": [1]}),
        json!({"field": "f", "operator": "equals"}),
        json!({"field": "f", "operator": "equals", "values": 1}),
        json!({"field": "f", "operator": "in", "values": [1], "exclude": "yes"}),
        json!({"field": "f", "operator": "in", "values": [1], "exclude": null}),
        json!({"field": "f", "operator": "range", "values": [1, 2], "includeNulls": 1}),
    ];
    for bad in cases {
        let raw = json!([good.clone(), bad.clone()]);
        let err = parse_where(&raw).unwrap_err();
        assert!(
            matches!(err, CrudError::Structural { entry: Some(2), .. }),
            "{bad}: {err:?}"
        );
    }
}

#[test]
fn test_equals_requires_one_value() {
    let err = parse_where(&json!([{"field": "f", "operator": "equals", "values": [1, 2]}]))
        .unwrap_err();
    assert!(matches!(
        err,
        CrudError::ArityMismatch {
            entry: Some(1),
            expected: 1,
            got: 2,
            ..
        }
    ));

    let err =
        parse_where(&json!([{"field": "f", "operator": "equals", "values": []}])).unwrap_err();
    assert!(err.is_arity_mismatch());
}

#[test]
fn test_range_requires_two_values() {
    for values in [json!([]), json!([1]), json!([1, 2, 3])] {
        let raw = json!([{"field": "f", "operator": "range", "values": values}]);
        let err = parse_where(&raw).unwrap_err();
        assert!(matches!(err, CrudError::ArityMismatch { expected: 2, .. }));
    }
}

#[test]
fn test_range_both_null() {
    let raw = json!([
        {"field": "a", "operator": "equals", "values": [1]},
        {"field": "b", "operator": "equals", "values": [2]},
        {"field": "f", "operator": "range", "values": [null, null]},
    ]);
    let err = parse_where(&raw).unwrap_err();
    assert!(matches!(
        err,
        CrudError::RangeBoundsMissing { entry: Some(3), ref field } if field == "f"
    ));
}

#[test]
fn test_unknown_operator() {
    for op in ["EQUALS", "In", "between", " equals", ""] {
        let raw = json!([{"field": "f", "operator": op, "values": [1]}]);
        let err = parse_where(&raw).unwrap_err();
        match err {
            CrudError::UnknownOperator { entry, operator } => {
                assert_eq!(entry, Some(1));
                assert_eq!(operator, op);
            }
            other => panic!("expected unknown operator, got {other:?}"),
        }
    }
}

#[test]
fn test_parse_update_keeps_insertion_order() {
    let raw: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": "two", "mid": null}"#).unwrap();
    let clauses = parse_update(&raw).unwrap();
    let fields: Vec<&str> = clauses
        .iter()
        .map(|c| match c {
            Clause::Update(UpdateClause { field, .. }) => field.as_str(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(fields, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_parse_update_not_object() {
    let err = parse_update(&json!([1, 2])).unwrap_err();
    assert!(matches!(err, CrudError::Structural { entry: None, .. }));
}

#[test]
fn test_parse_insert() {
    let values = parse_insert(&json!({"values": {"field1": 123, "field2": "some text"}})).unwrap();
    assert_eq!(values.get("field1"), Some(&json!(123)));
    assert_eq!(values.get("field2"), Some(&json!("some text")));

    assert!(parse_insert(&json!({"values": 123})).is_err());
    assert!(parse_insert(&json!({"something": "hello world"})).is_err());
}

#[test]
fn test_parse_update_request() {
    let raw = json!({
        "where": [{"field": "id", "operator": "equals", "values": [1]}],
        "updates": {"field1": 123, "field2": "some text"},
    });
    let params = parse_update_request(&raw).unwrap();
    assert_eq!(params.where_clauses.len(), 1);
    assert_eq!(params.updates.len(), 2);

    let err = parse_update_request(&json!({"where": []})).unwrap_err();
    assert!(err.to_string().contains("'updates'"));
}

#[test]
fn test_parse_delete() {
    let raw = json!({"where": [{"field": "id", "operator": "in", "values": [1, 2]}]});
    assert_eq!(parse_delete(&raw).unwrap().len(), 1);
    assert!(parse_delete(&json!({})).is_err());
}

#[test]
fn test_parse_read() {
    let raw = json!({
        "fields": ["id", "name"],
        "where": [],
        "orderBy": ["id"],
        "pageSize": 25,
        "page": 2.0,
    });
    let params = parse_read(&raw).unwrap();
    assert_eq!(params.fields, vec!["id", "name"]);
    assert_eq!(params.order_by, vec!["id"]);
    assert_eq!(params.page_size, 25);
    assert_eq!(params.page, 2);
}

#[test]
fn test_parse_read_rejects_bad_types() {
    let base = json!({
        "fields": ["id"],
        "where": [],
        "orderBy": ["id"],
        "pageSize": 10,
        "page": 1,
    });
    for (key, bad) in [
        ("fields", json!("id")),
        ("fields", json!(["id", 3])),
        ("orderBy", json!(null)),
        ("pageSize", json!("10")),
        ("page", json!(1.5)),
        ("page", json!(-1)),
    ] {
        let mut raw = base.clone();
        raw[key] = bad;
        assert!(parse_read(&raw).is_err(), "{key}");
    }

    let mut raw = base.clone();
    raw.as_object_mut().unwrap().remove("page");
    let err = parse_read(&raw).unwrap_err();
    assert!(err.to_string().contains("missing 'page' parameter"));
}

#[test]
fn test_parse_fields() {
    let raw = json!({"orderBy": ["b", "a"]});
    assert_eq!(parse_fields(&raw, "orderBy").unwrap(), vec!["b", "a"]);
    assert!(parse_fields(&raw, "fields").is_err());
}
