//! Condition types and field-predicate evaluation.
//!
//! A [`Condition`] tests one field of an action payload. The operator is a
//! closed enum, so an unknown operator is a deserialization error rather
//! than a silent non-match at evaluation time.
//!
//! Evaluation is pure: no side effects, identical results for identical
//! inputs, safe to call concurrently.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{ApprovalError, ApprovalResult};

/// One field predicate within an auto-approve rule.
///
/// `field` addresses the action payload with a dotted path
/// (`"recipient.domain"`). A path that hits a missing key at any segment
/// resolves to undefined, and every operator evaluates to `false` against
/// undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dotted path into the action payload.
    pub field: String,
    /// Operator and expected value.
    #[serde(flatten)]
    pub op: ConditionOp,
}

impl Condition {
    /// Create a condition.
    #[must_use]
    pub fn new(field: impl Into<String>, op: ConditionOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }

    /// Evaluate this condition against an action payload.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        match resolve_path(data, &self.field) {
            Some(actual) => self.op.matches(actual),
            None => false,
        }
    }

    /// Validate the condition at construction time.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`] when the field path is blank or
    /// a `regex` operator carries a pattern that does not compile. Rules
    /// holding such a condition are rejected before they are persisted.
    pub fn validate(&self) -> ApprovalResult<()> {
        if self.field.trim().is_empty() {
            return Err(ApprovalError::Validation {
                field: "field".to_string(),
                reason: "condition field path must not be empty".to_string(),
            });
        }
        if let ConditionOp::Regex(pattern) = &self.op
            && let Err(err) = Regex::new(pattern)
        {
            return Err(ApprovalError::Validation {
                field: "value".to_string(),
                reason: format!("invalid regex pattern: {err}"),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            ConditionOp::Equals(v) | ConditionOp::NotEquals(v) | ConditionOp::In(v) => {
                write!(f, "{} {} {v}", self.field, self.op.name())
            },
            ConditionOp::Contains(s)
            | ConditionOp::StartsWith(s)
            | ConditionOp::EndsWith(s)
            | ConditionOp::Regex(s) => write!(f, "{} {} {s:?}", self.field, self.op.name()),
            ConditionOp::Gt(n) | ConditionOp::Lt(n) => {
                write!(f, "{} {} {n}", self.field, self.op.name())
            },
        }
    }
}

/// Operator and expected value of a [`Condition`].
///
/// Serialized adjacently tagged, so the wire form of a condition is
/// `{"field": …, "op": …, "value": …}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "value")]
pub enum ConditionOp {
    /// Exact equality, compared natively where the types allow it and by
    /// string form otherwise.
    Equals(Value),
    /// Negation of `equals`.
    NotEquals(Value),
    /// Case-insensitive substring test on the string form of the field.
    Contains(String),
    /// Case-insensitive prefix test on the string form.
    #[serde(rename = "startsWith")]
    StartsWith(String),
    /// Case-insensitive suffix test on the string form.
    #[serde(rename = "endsWith")]
    EndsWith(String),
    /// Numeric greater-than. Non-numeric fields never match.
    Gt(f64),
    /// Numeric less-than. Non-numeric fields never match.
    Lt(f64),
    /// Membership in a literal JSON array or a comma-separated string.
    In(Value),
    /// Partial regex match on the string form. A pattern that fails to
    /// compile is a non-match, never a panic.
    Regex(String),
}

impl ConditionOp {
    /// Evaluate this operator against a resolved field value.
    #[must_use]
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Equals(expected) => values_equal(actual, expected),
            Self::NotEquals(expected) => !values_equal(actual, expected),
            Self::Contains(needle) => string_form(actual)
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::StartsWith(prefix) => string_form(actual)
                .to_lowercase()
                .starts_with(&prefix.to_lowercase()),
            Self::EndsWith(suffix) => string_form(actual)
                .to_lowercase()
                .ends_with(&suffix.to_lowercase()),
            Self::Gt(bound) => numeric_form(actual).is_some_and(|n| n > *bound),
            Self::Lt(bound) => numeric_form(actual).is_some_and(|n| n < *bound),
            Self::In(set) => in_set(actual, set),
            Self::Regex(pattern) => match Regex::new(pattern) {
                Ok(re) => re.is_match(&string_form(actual)),
                Err(err) => {
                    tracing::warn!(%pattern, %err, "regex condition failed to compile");
                    false
                },
            },
        }
    }

    /// The operator's wire name, as stored in rules.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equals(_) => "equals",
            Self::NotEquals(_) => "not_equals",
            Self::Contains(_) => "contains",
            Self::StartsWith(_) => "startsWith",
            Self::EndsWith(_) => "endsWith",
            Self::Gt(_) => "gt",
            Self::Lt(_) => "lt",
            Self::In(_) => "in",
            Self::Regex(_) => "regex",
        }
    }
}

/// Walk a dotted path through nested JSON objects.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object.
fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// String form of a JSON value: strings unquoted, everything else as its
/// JSON text.
fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric form of a JSON value: numbers directly, strings that parse
/// cleanly as a number, nothing else.
fn numeric_form(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Equality with type coercion: native comparison where both sides share a
/// type, string-form comparison otherwise.
#[allow(clippy::float_cmp)] // exact equality is the operator's contract
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => string_form(actual) == string_form(expected),
    }
}

/// Membership test for the `in` operator.
///
/// The expected value is either a literal JSON array (elements compared
/// with `equals` semantics) or a comma-separated string (split and
/// trimmed, compared against the field's string form).
fn in_set(actual: &Value, set: &Value) -> bool {
    match set {
        Value::Array(items) => items.iter().any(|item| values_equal(actual, item)),
        Value::String(csv) => {
            let actual = string_form(actual);
            csv.split(',').map(str::trim).any(|item| item == actual)
        },
        _ => false,
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
