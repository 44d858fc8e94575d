//! Tests for condition evaluation.

use super::*;
use serde_json::json;

fn payload() -> Value {
    json!({
        "recipient": "Ops@Example.com",
        "subject": "Re: weekly sync",
        "duration_minutes": 30,
        "attendee_count": "4",
        "urgent": false,
        "schedule": {
            "day": "tuesday",
            "slot": { "hour": 14 }
        }
    })
}

// -----------------------------------------------------------------------
// Path resolution
// -----------------------------------------------------------------------

#[test]
fn test_missing_field_is_false_for_every_operator() {
    let data = payload();
    let ops = [
        ConditionOp::Equals(json!("x")),
        ConditionOp::NotEquals(json!("x")),
        ConditionOp::Contains("x".to_string()),
        ConditionOp::StartsWith("x".to_string()),
        ConditionOp::EndsWith("x".to_string()),
        ConditionOp::Gt(0.0),
        ConditionOp::Lt(100.0),
        ConditionOp::In(json!(["x"])),
        ConditionOp::Regex(".*".to_string()),
    ];
    for op in ops {
        let name = op.name();
        assert!(
            !Condition::new("no_such_field", op).matches(&data),
            "operator {name} matched a missing field"
        );
    }
}

#[test]
fn test_nested_path_resolution() {
    let data = payload();
    assert!(Condition::new("schedule.day", ConditionOp::Equals(json!("tuesday"))).matches(&data));
    assert!(Condition::new("schedule.slot.hour", ConditionOp::Equals(json!(14))).matches(&data));
    // Missing at an intermediate segment.
    assert!(!Condition::new("schedule.room.floor", ConditionOp::Equals(json!(1))).matches(&data));
    // Path through a non-object.
    assert!(!Condition::new("subject.length", ConditionOp::Gt(0.0)).matches(&data));
}

// -----------------------------------------------------------------------
// equals / not_equals
// -----------------------------------------------------------------------

#[test]
fn test_equals_is_reflexive() {
    let values = [
        json!("text"),
        json!(30),
        json!(2.5),
        json!(true),
        json!(null),
        json!(["a", "b"]),
    ];
    for v in values {
        let data = json!({ "x": v });
        assert!(
            Condition::new("x", ConditionOp::Equals(v.clone())).matches(&data),
            "equals not reflexive for {v}"
        );
    }
}

#[test]
fn test_equals_native_and_coerced() {
    let data = payload();
    assert!(Condition::new("duration_minutes", ConditionOp::Equals(json!(30))).matches(&data));
    assert!(!Condition::new("duration_minutes", ConditionOp::Equals(json!(31))).matches(&data));
    // Number against its string form: string-equal fallback.
    assert!(Condition::new("duration_minutes", ConditionOp::Equals(json!("30"))).matches(&data));
    assert!(Condition::new("attendee_count", ConditionOp::Equals(json!(4))).matches(&data));
    // Strings compare case-sensitively.
    assert!(!Condition::new("recipient", ConditionOp::Equals(json!("ops@example.com"))).matches(&data));
    assert!(Condition::new("urgent", ConditionOp::Equals(json!(false))).matches(&data));
}

#[test]
fn test_not_equals() {
    let data = payload();
    assert!(Condition::new("duration_minutes", ConditionOp::NotEquals(json!(31))).matches(&data));
    assert!(!Condition::new("duration_minutes", ConditionOp::NotEquals(json!(30))).matches(&data));
    // Undefined stays false even for the negated operator.
    assert!(!Condition::new("missing", ConditionOp::NotEquals(json!(30))).matches(&data));
}

// -----------------------------------------------------------------------
// contains / startsWith / endsWith
// -----------------------------------------------------------------------

#[test]
fn test_contains_is_case_insensitive() {
    let data = payload();
    assert!(Condition::new("recipient", ConditionOp::Contains("example.COM".to_string())).matches(&data));
    assert!(Condition::new("subject", ConditionOp::Contains("Weekly".to_string())).matches(&data));
    assert!(!Condition::new("subject", ConditionOp::Contains("daily".to_string())).matches(&data));
}

#[test]
fn test_contains_on_number_uses_string_form() {
    let data = payload();
    assert!(Condition::new("duration_minutes", ConditionOp::Contains("3".to_string())).matches(&data));
}

#[test]
fn test_starts_with_and_ends_with() {
    let data = payload();
    assert!(Condition::new("recipient", ConditionOp::StartsWith("ops@".to_string())).matches(&data));
    assert!(!Condition::new("recipient", ConditionOp::StartsWith("admin@".to_string())).matches(&data));
    assert!(Condition::new("recipient", ConditionOp::EndsWith(".COM".to_string())).matches(&data));
    assert!(!Condition::new("recipient", ConditionOp::EndsWith(".org".to_string())).matches(&data));
}

// -----------------------------------------------------------------------
// gt / lt
// -----------------------------------------------------------------------

#[test]
fn test_numeric_comparisons() {
    let data = payload();
    assert!(Condition::new("duration_minutes", ConditionOp::Lt(60.0)).matches(&data));
    assert!(!Condition::new("duration_minutes", ConditionOp::Lt(30.0)).matches(&data));
    assert!(Condition::new("duration_minutes", ConditionOp::Gt(15.0)).matches(&data));
    assert!(!Condition::new("duration_minutes", ConditionOp::Gt(30.0)).matches(&data));
}

#[test]
fn test_numeric_string_coerces() {
    let data = payload();
    assert!(Condition::new("attendee_count", ConditionOp::Lt(10.0)).matches(&data));
    assert!(Condition::new("attendee_count", ConditionOp::Gt(3.0)).matches(&data));
}

#[test]
fn test_non_numeric_field_never_compares() {
    let data = payload();
    assert!(!Condition::new("subject", ConditionOp::Gt(0.0)).matches(&data));
    assert!(!Condition::new("subject", ConditionOp::Lt(1000.0)).matches(&data));
    assert!(!Condition::new("urgent", ConditionOp::Gt(0.0)).matches(&data));
}

// -----------------------------------------------------------------------
// in
// -----------------------------------------------------------------------

#[test]
fn test_in_with_array() {
    let data = payload();
    assert!(
        Condition::new("schedule.day", ConditionOp::In(json!(["monday", "tuesday"]))).matches(&data)
    );
    assert!(!Condition::new("schedule.day", ConditionOp::In(json!(["friday"]))).matches(&data));
    assert!(Condition::new("duration_minutes", ConditionOp::In(json!([15, 30, 60]))).matches(&data));
}

#[test]
fn test_in_with_comma_separated_string() {
    let data = payload();
    assert!(
        Condition::new(
            "schedule.day",
            ConditionOp::In(json!("monday, tuesday, wednesday"))
        )
        .matches(&data)
    );
    assert!(Condition::new("duration_minutes", ConditionOp::In(json!("15,30,60"))).matches(&data));
    assert!(!Condition::new("schedule.day", ConditionOp::In(json!("friday, saturday"))).matches(&data));
}

#[test]
fn test_in_with_scalar_set_never_matches() {
    let data = payload();
    assert!(!Condition::new("duration_minutes", ConditionOp::In(json!(30))).matches(&data));
}

// -----------------------------------------------------------------------
// regex
// -----------------------------------------------------------------------

#[test]
fn test_regex_partial_match() {
    let data = payload();
    assert!(Condition::new("subject", ConditionOp::Regex("^Re:".to_string())).matches(&data));
    assert!(Condition::new("recipient", ConditionOp::Regex(r"@\w+\.com$".to_string())).matches(&data));
    assert!(!Condition::new("subject", ConditionOp::Regex("^Fwd:".to_string())).matches(&data));
}

#[test]
fn test_invalid_regex_is_no_match_not_a_crash() {
    let data = payload();
    assert!(!Condition::new("subject", ConditionOp::Regex("(unclosed".to_string())).matches(&data));
}

// -----------------------------------------------------------------------
// Determinism
// -----------------------------------------------------------------------

#[test]
fn test_evaluation_is_repeatable() {
    let data = payload();
    let condition = Condition::new("recipient", ConditionOp::Contains("example".to_string()));
    let first = condition.matches(&data);
    for _ in 0..100 {
        assert_eq!(condition.matches(&data), first);
    }
}

// -----------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------

#[test]
fn test_validate_blank_field() {
    let condition = Condition::new("  ", ConditionOp::Equals(json!(1)));
    assert!(matches!(
        condition.validate(),
        Err(ApprovalError::Validation { ref field, .. }) if field == "field"
    ));
}

#[test]
fn test_validate_bad_regex_rejected_at_construction() {
    let condition = Condition::new("subject", ConditionOp::Regex("(unclosed".to_string()));
    assert!(matches!(
        condition.validate(),
        Err(ApprovalError::Validation { ref field, .. }) if field == "value"
    ));

    let ok = Condition::new("subject", ConditionOp::Regex("^Re:".to_string()));
    assert!(ok.validate().is_ok());
}

// -----------------------------------------------------------------------
// Serialization
// -----------------------------------------------------------------------

#[test]
fn test_wire_format() {
    let condition = Condition::new("duration_minutes", ConditionOp::Lt(60.0));
    let json = serde_json::to_value(&condition).unwrap();
    assert_eq!(json["field"], "duration_minutes");
    assert_eq!(json["op"], "lt");
    assert_eq!(json["value"], 60.0);

    let parsed: Condition = serde_json::from_value(json!({
        "field": "recipient",
        "op": "startsWith",
        "value": "ops@"
    }))
    .unwrap();
    assert_eq!(parsed.op, ConditionOp::StartsWith("ops@".to_string()));
}

#[test]
fn test_unknown_operator_rejected_at_deserialization() {
    let result: Result<Condition, _> = serde_json::from_value(json!({
        "field": "x",
        "op": "almost_equals",
        "value": 1
    }));
    assert!(result.is_err());
}
