use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use tabgrid_filter::{create_predicate, FieldKind};
use tabgrid_types::{FilterDescriptor, Row};

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn rows(values: Vec<Value>) -> Vec<Row> {
    values.into_iter().map(row).collect()
}

fn kept(descriptor: &FilterDescriptor, rows: &[Row], field: &str) -> Vec<Value> {
    let predicate = create_predicate(descriptor).expect("predicate");
    predicate
        .apply(rows)
        .into_iter()
        .map(|r| r.get(field).cloned().unwrap_or(Value::Null))
        .collect()
}

fn ages() -> Vec<Row> {
    rows(vec![
        json!({"age": 17}),
        json!({"age": 18}),
        json!({"age": 65}),
        json!({"age": 66}),
    ])
}

// ── Descriptor compilation ──────────────────────────────────────

#[test]
fn no_usable_values_passes_everything() {
    let empty = FilterDescriptor::new("age", "greater", Vec::<String>::new());
    assert!(create_predicate(&empty).is_none());

    let blank = FilterDescriptor::new("age", "=", ["  ", ""]);
    assert!(create_predicate(&blank).is_none());

    let unparsable = FilterDescriptor::new("age", "gt", ["many"]).with_field_type("int");
    assert!(create_predicate(&unparsable).is_none());
}

#[test]
fn missing_field_passes_everything() {
    let descriptor = FilterDescriptor::new(" ", "=", ["x"]);
    assert!(create_predicate(&descriptor).is_none());
}

#[test]
fn valueless_conditions_compile_without_values() {
    for condition in ["empty", "isnull", "null", "notempty", "notnull", "checked", "unchecked"] {
        let descriptor = FilterDescriptor::new("f", condition, Vec::<String>::new());
        assert!(create_predicate(&descriptor).is_some(), "{condition}");
    }
}

#[test]
fn predicate_exposes_field_and_kind() {
    let descriptor = FilterDescriptor::new("price", "<", ["10"]).with_field_type("money");
    let predicate = create_predicate(&descriptor).unwrap();
    assert_eq!(predicate.field(), "price");
    assert_eq!(predicate.kind(), FieldKind::Numeric);
}

// ── Numeric comparisons ─────────────────────────────────────────

#[test]
fn between_keeps_inclusive_range() {
    let descriptor = FilterDescriptor::new("age", "between", ["18", "65"]).with_field_type("int");
    assert_eq!(kept(&descriptor, &ages(), "age"), vec![json!(18), json!(65)]);
}

#[test]
fn between_with_one_bound() {
    let upper_only = FilterDescriptor::new("age", "between", ["", "18"]).with_field_type("int");
    assert_eq!(kept(&upper_only, &ages(), "age"), vec![json!(17), json!(18)]);

    let lower_only = FilterDescriptor::new("age", "between", ["65"]).with_field_type("int");
    assert_eq!(kept(&lower_only, &ages(), "age"), vec![json!(65), json!(66)]);
}

#[test]
fn between_rejects_blank_cells() {
    let data = rows(vec![json!({"age": ""}), json!({"age": null}), json!({})]);
    let descriptor = FilterDescriptor::new("age", "between", ["0", "100"]).with_field_type("int");
    assert!(kept(&descriptor, &data, "age").is_empty());
}

#[test]
fn ordering_conditions() {
    let data = ages();
    let gt = FilterDescriptor::new("age", ">", ["18"]).with_field_type("int");
    assert_eq!(kept(&gt, &data, "age"), vec![json!(65), json!(66)]);

    let gte = FilterDescriptor::new("age", "gte", ["18"]).with_field_type("int");
    assert_eq!(kept(&gte, &data, "age"), vec![json!(18), json!(65), json!(66)]);

    let lt = FilterDescriptor::new("age", "Less", ["18"]).with_field_type("int");
    assert_eq!(kept(&lt, &data, "age"), vec![json!(17)]);

    let lte = FilterDescriptor::new("age", "<=", ["18"]).with_field_type("int");
    assert_eq!(kept(&lte, &data, "age"), vec![json!(17), json!(18)]);
}

#[test]
fn numeric_strings_and_comma_decimals() {
    let data = rows(vec![
        json!({"price": "9,99"}),
        json!({"price": "10.5"}),
        json!({"price": 12}),
        json!({"price": "n/a"}),
    ]);
    let descriptor = FilterDescriptor::new("price", "greater", ["10,0"]).with_field_type("money");
    assert_eq!(kept(&descriptor, &data, "price"), vec![json!("10.5"), json!(12)]);
}

#[test]
fn equality_and_inequality() {
    let data = ages();
    let eq = FilterDescriptor::new("age", "eq", ["65"]).with_field_type("integer");
    assert_eq!(kept(&eq, &data, "age"), vec![json!(65)]);

    let neq = FilterDescriptor::new("age", "!=", ["65"]).with_field_type("integer");
    assert_eq!(kept(&neq, &data, "age"), vec![json!(17), json!(18), json!(66)]);
}

#[test]
fn unparsable_numeric_cells_never_equal() {
    let data = rows(vec![json!({"n": "abc"}), json!({"n": 1})]);
    let eq = FilterDescriptor::new("n", "=", ["1"]).with_field_type("number");
    assert_eq!(kept(&eq, &data, "n"), vec![json!(1)]);
    let neq = FilterDescriptor::new("n", "notequal", ["1"]).with_field_type("number");
    assert_eq!(kept(&neq, &data, "n"), vec![json!("abc")]);
}

#[test]
fn unknown_condition_is_equality() {
    let data = ages();
    let descriptor = FilterDescriptor::new("age", "matches", ["17"]).with_field_type("int");
    assert_eq!(kept(&descriptor, &data, "age"), vec![json!(17)]);
}

// ── Text comparisons ────────────────────────────────────────────

fn names() -> Vec<Row> {
    rows(vec![
        json!({"name": "Alice Smith"}),
        json!({"name": "bob JONES"}),
        json!({"name": ""}),
        json!({"name": {"value": "Carol Smith", "id": 3}}),
        json!({"id": 5}),
    ])
}

#[test]
fn contains_is_case_insensitive() {
    let descriptor = FilterDescriptor::new("name", "like", ["SMITH"]);
    assert_eq!(
        kept(&descriptor, &names(), "name"),
        vec![json!("Alice Smith"), json!({"value": "Carol Smith", "id": 3})]
    );
}

#[test]
fn not_contains_keeps_blank_cells() {
    let descriptor = FilterDescriptor::new("name", "notcontains", ["smith"]);
    assert_eq!(
        kept(&descriptor, &names(), "name"),
        vec![json!("bob JONES"), json!(""), Value::Null]
    );
}

#[test]
fn starts_and_ends_with() {
    let starts = FilterDescriptor::new("name", "begins", ["bob"]);
    assert_eq!(kept(&starts, &names(), "name"), vec![json!("bob JONES")]);

    let ends = FilterDescriptor::new("name", "endswith", ["jones"]);
    assert_eq!(kept(&ends, &names(), "name"), vec![json!("bob JONES")]);
}

#[test]
fn text_equality_ignores_case_and_padding() {
    let data = rows(vec![json!({"code": " ABC "}), json!({"code": "abd"})]);
    let descriptor = FilterDescriptor::new("code", "=", ["abc"]);
    assert_eq!(kept(&descriptor, &data, "code"), vec![json!(" ABC ")]);
}

#[test]
fn in_and_not_in() {
    let data = rows(vec![
        json!({"status": "draft"}),
        json!({"status": "Published"}),
        json!({"status": "archived"}),
        json!({"status": ""}),
    ]);
    let within = FilterDescriptor::new("status", "in", ["draft", "published"]);
    assert_eq!(
        kept(&within, &data, "status"),
        vec![json!("draft"), json!("Published")]
    );

    let outside = FilterDescriptor::new("status", "not in", ["draft", "published"]);
    assert_eq!(kept(&outside, &data, "status"), vec![json!("archived"), json!("")]);
}

// ── Empty and boolean conditions ────────────────────────────────

#[test]
fn empty_and_not_empty() {
    let data = rows(vec![
        json!({"tags": []}),
        json!({"tags": {}}),
        json!({"tags": "  "}),
        json!({"tags": null}),
        json!({}),
        json!({"tags": ["a"]}),
        json!({"tags": 0}),
    ]);
    let empty = FilterDescriptor::new("tags", "isnull", Vec::<String>::new());
    assert_eq!(create_predicate(&empty).unwrap().apply(&data).len(), 5);

    let not_empty = FilterDescriptor::new("tags", "notempty", Vec::<String>::new());
    assert_eq!(
        kept(&not_empty, &data, "tags"),
        vec![json!(["a"]), json!(0)]
    );
}

#[test]
fn checked_and_unchecked() {
    let data = rows(vec![
        json!({"active": "Y"}),
        json!({"active": 1}),
        json!({"active": "0"}),
        json!({"active": false}),
        json!({}),
    ]);
    let checked = FilterDescriptor::new("active", "checked", Vec::<String>::new());
    assert_eq!(kept(&checked, &data, "active"), vec![json!("Y"), json!(1)]);

    let unchecked = FilterDescriptor::new("active", "unchecked", Vec::<String>::new());
    assert_eq!(
        kept(&unchecked, &data, "active"),
        vec![json!("0"), json!(false), Value::Null]
    );
}

#[test]
fn boolean_equality_normalizes_tokens() {
    let data = rows(vec![json!({"active": "yes"}), json!({"active": "N"})]);
    let descriptor = FilterDescriptor::new("active", "=", ["true"]).with_field_type("bool");
    assert_eq!(kept(&descriptor, &data, "active"), vec![json!("yes")]);
}

// ── Dates ───────────────────────────────────────────────────────

#[test]
fn dates_compare_as_instants() {
    let data = rows(vec![
        json!({"created": "2024-01-15"}),
        json!({"created": "2024-02-01 10:00:00"}),
        json!({"created": "2024-03-01T00:00:00Z"}),
    ]);
    let descriptor = FilterDescriptor::new("created", "between", ["2024-01-20", "2024-02-28"])
        .with_field_type("datetime");
    assert_eq!(
        kept(&descriptor, &data, "created"),
        vec![json!("2024-02-01 10:00:00")]
    );

    let after = FilterDescriptor::new("created", ">=", ["2024-02-01"]).with_field_type("date");
    assert_eq!(kept(&after, &data, "created").len(), 2);
}

#[test]
fn unparsable_dates_fall_back_to_text() {
    let data = rows(vec![json!({"d": "someday"}), json!({"d": "2024-01-01"})]);
    let descriptor = FilterDescriptor::new("d", "=", ["SOMEDAY"]).with_field_type("date");
    assert_eq!(kept(&descriptor, &data, "d"), vec![json!("someday")]);
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn between_matches_inclusive_bounds(
        values in proptest::collection::vec(-1000i64..1000, 0..40),
        a in -1000i64..1000,
        b in -1000i64..1000,
    ) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let data: Vec<Row> = values.iter().map(|v| row(json!({"n": v}))).collect();
        let descriptor = FilterDescriptor::new("n", "between", [min.to_string(), max.to_string()])
            .with_field_type("int");
        let predicate = create_predicate(&descriptor).unwrap();

        let expected: Vec<i64> = values.iter().copied().filter(|v| (min..=max).contains(v)).collect();
        let actual: Vec<i64> = predicate
            .apply(&data)
            .into_iter()
            .filter_map(|r| r.get("n").and_then(Value::as_i64))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}
