//! Auto-approve rules: records, validation, and matching.
//!
//! A rule binds an ordered set of [`Condition`]s to one action type. When
//! every condition holds for a pending action of that type — and the rule's
//! trust is above the probation threshold — the matcher grants an
//! auto-approval.
//!
//! Rules are created by humans through a guided builder; the engine mutates
//! only their trust counters. There is no automatic rule creation.

mod condition;
mod matcher;

pub use condition::{Condition, ConditionOp};
pub use matcher::find_match;

use greenlight_core::types::{RuleId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{ApprovalError, ApprovalResult};

/// A rule specification as submitted by the rule builder.
///
/// Validated by [`NewRule::validate`] before a record is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRule {
    /// The action type this rule applies to.
    pub action_type: String,
    /// Field predicates, combined with AND. Must not be empty.
    pub conditions: Vec<Condition>,
}

impl NewRule {
    /// Create a rule specification.
    #[must_use]
    pub fn new(action_type: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self {
            action_type: action_type.into(),
            conditions,
        }
    }

    /// Validate the specification.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`] when the action type is blank,
    /// the condition set is empty (such a rule could never match), or any
    /// condition fails its own validation.
    pub fn validate(&self) -> ApprovalResult<()> {
        if self.action_type.trim().is_empty() {
            return Err(ApprovalError::Validation {
                field: "action_type".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.conditions.is_empty() {
            return Err(ApprovalError::Validation {
                field: "conditions".to_string(),
                reason: "a rule needs at least one condition".to_string(),
            });
        }
        for condition in &self.conditions {
            condition.validate()?;
        }
        Ok(())
    }
}

/// An auto-approve rule and its trust state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Unique rule identifier.
    pub id: RuleId,
    /// The action type this rule applies to.
    pub action_type: String,
    /// Field predicates, combined with AND.
    pub conditions: Vec<Condition>,
    /// Disabled rules are skipped entirely by the matcher.
    pub enabled: bool,
    /// How many of this rule's matches have been scored. Moves only
    /// together with `success_rate`, in one atomic update.
    pub times_triggered: u64,
    /// Running average of scored outcomes, in `[0, 1]`. `None` until the
    /// rule has been scored at least once.
    pub success_rate: Option<f64>,
    /// When the rule was created.
    pub created_at: Timestamp,
    /// When the rule last auto-approved an action.
    pub last_triggered_at: Option<Timestamp>,
}

impl RuleRecord {
    /// Create an enabled, unscored record from a validated specification.
    #[must_use]
    pub fn new(spec: NewRule) -> Self {
        Self {
            id: RuleId::new(),
            action_type: spec.action_type,
            conditions: spec.conditions,
            enabled: true,
            times_triggered: 0,
            success_rate: None,
            created_at: Timestamp::now(),
            last_triggered_at: None,
        }
    }

    /// Check if the rule clears the trust threshold.
    ///
    /// An unscored rule is trusted: it has no track record to hold against
    /// it. A scored rule below the threshold is on probation.
    #[must_use]
    pub fn is_trusted(&self, threshold: f64) -> bool {
        self.success_rate.is_none_or(|rate| rate >= threshold)
    }

    /// Evaluate every condition against a payload, with AND semantics.
    ///
    /// An empty condition set never matches.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        !self.conditions.is_empty() && self.conditions.iter().all(|c| c.matches(data))
    }
}

impl fmt::Display for RuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rate = match self.success_rate {
            Some(rate) => format!("{rate:.2}"),
            None => "unscored".to_string(),
        };
        write!(
            f,
            "{} on {} ({} conditions, rate {rate})",
            self.id,
            self.action_type,
            self.conditions.len()
        )
    }
}

/// Filter for rule listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFilter {
    /// Keep only rules for this action type.
    pub action_type: Option<String>,
    /// Keep only rules with this enabled flag.
    pub enabled: Option<bool>,
}

impl RuleFilter {
    /// Filter matching every rule.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter for enabled rules of one action type — the matcher's view.
    #[must_use]
    pub fn enabled_for(action_type: impl Into<String>) -> Self {
        Self {
            action_type: Some(action_type.into()),
            enabled: Some(true),
        }
    }

    /// Check whether a rule passes this filter.
    #[must_use]
    pub fn accepts(&self, rule: &RuleRecord) -> bool {
        if let Some(action_type) = &self.action_type
            && action_type != &rule.action_type
        {
            return false;
        }
        if let Some(enabled) = self.enabled
            && enabled != rule.enabled
        {
            return false;
        }
        true
    }
}
