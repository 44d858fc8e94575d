//! Action records and the review state machine.
//!
//! A proposed action enters the queue as `pending` and leaves it through
//! exactly one review: a human approval, denial, or edit, or a rule-driven
//! auto-approval. All four destinations are terminal — the engine never
//! returns an action to `pending`, and a second review attempt fails with
//! [`ApprovalError::InvalidState`] without touching the record.

use greenlight_core::types::{ActionId, RiskLevel, RuleId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{ApprovalError, ApprovalResult};

/// Review status of a proposed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved by a human.
    Approved,
    /// Denied by a human, with feedback.
    Denied,
    /// Approved by a trusted auto-approve rule.
    AutoApproved,
    /// Approved by a human with a modified payload.
    Edited,
}

impl ActionStatus {
    /// Check if an action in this status still awaits review.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Check if this status represents a completed review.
    #[must_use]
    pub fn is_reviewed(&self) -> bool {
        !self.is_pending()
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Denied => write!(f, "denied"),
            Self::AutoApproved => write!(f, "auto_approved"),
            Self::Edited => write!(f, "edited"),
        }
    }
}

/// A human decision on a pending action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum Decision {
    /// Approve the action as proposed.
    Approve,
    /// Deny the action. Feedback is required.
    Deny {
        /// Why the action was denied.
        feedback: String,
    },
    /// Approve the action with a modified payload.
    Edit {
        /// The payload that replaces `action_data` for execution.
        data: Value,
    },
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Deny { feedback } => write!(f, "deny: {feedback}"),
            Self::Edit { .. } => write!(f, "edit"),
        }
    }
}

/// How a pending action was resolved — a human decision or a rule match.
///
/// This is the value a store applies atomically inside
/// [`ActionStore::transition`](crate::store::ActionStore::transition).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ReviewOutcome {
    /// Human approval, payload unchanged.
    Approved,
    /// Human denial with feedback.
    Denied {
        /// Why the action was denied.
        feedback: String,
    },
    /// Human approval with a replacement payload.
    Edited {
        /// The payload that overrides `action_data`.
        data: Value,
    },
    /// A trusted rule matched and approved the action.
    AutoApproved {
        /// The rule that matched.
        rule_id: RuleId,
    },
}

impl ReviewOutcome {
    /// The status this outcome lands the action in.
    #[must_use]
    pub fn status(&self) -> ActionStatus {
        match self {
            Self::Approved => ActionStatus::Approved,
            Self::Denied { .. } => ActionStatus::Denied,
            Self::Edited { .. } => ActionStatus::Edited,
            Self::AutoApproved { .. } => ActionStatus::AutoApproved,
        }
    }
}

/// A proposed action as submitted by the proposing agent.
///
/// Validated by [`NewAction::validate`] before a record is created; a
/// proposal that fails validation never reaches a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAction {
    /// Category of the proposed side effect (e.g. `email_reply`).
    pub action_type: String,
    /// Risk classification assigned by the proposer.
    pub risk_level: RiskLevel,
    /// Concrete parameters of the action; the surface rules match against.
    pub action_data: Value,
    /// Optional provenance payload. Never matched against.
    pub context_data: Option<Value>,
    /// Proposer's own certainty, in `[0, 1]`.
    pub confidence: Option<f64>,
}

impl NewAction {
    /// Create a proposal with the required fields.
    #[must_use]
    pub fn new(action_type: impl Into<String>, risk_level: RiskLevel, action_data: Value) -> Self {
        Self {
            action_type: action_type.into(),
            risk_level,
            action_data,
            context_data: None,
            confidence: None,
        }
    }

    /// Attach a provenance payload.
    #[must_use]
    pub fn with_context_data(mut self, context_data: Value) -> Self {
        self.context_data = Some(context_data);
        self
    }

    /// Attach the proposer's confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Validate the proposal.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`] when the action type is blank,
    /// a payload is not a JSON object, or the confidence falls outside
    /// `[0, 1]`.
    pub fn validate(&self) -> ApprovalResult<()> {
        if self.action_type.trim().is_empty() {
            return Err(ApprovalError::Validation {
                field: "action_type".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !self.action_data.is_object() {
            return Err(ApprovalError::Validation {
                field: "action_data".to_string(),
                reason: "must be a JSON object".to_string(),
            });
        }
        if let Some(context) = &self.context_data
            && !context.is_object()
        {
            return Err(ApprovalError::Validation {
                field: "context_data".to_string(),
                reason: "must be a JSON object".to_string(),
            });
        }
        if let Some(confidence) = self.confidence
            && !(0.0..=1.0).contains(&confidence)
        {
            return Err(ApprovalError::Validation {
                field: "confidence".to_string(),
                reason: format!("must be within [0, 1], got {confidence}"),
            });
        }
        Ok(())
    }
}

/// A single proposed side effect and its review state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Unique action identifier, immutable once created.
    pub id: ActionId,
    /// Category of the proposed side effect.
    pub action_type: String,
    /// Risk classification assigned by the proposer. Immutable.
    pub risk_level: RiskLevel,
    /// Current review status.
    pub status: ActionStatus,
    /// Concrete parameters of the action.
    pub action_data: Value,
    /// Optional provenance payload. Never matched against.
    pub context_data: Option<Value>,
    /// Proposer's certainty, in `[0, 1]`.
    pub confidence: Option<f64>,
    /// Reviewer feedback. Set on denial.
    pub user_feedback: Option<String>,
    /// Replacement payload. Present iff `status` is `edited`.
    pub edited_data: Option<Value>,
    /// The rule that auto-approved this action, if any.
    pub decided_by_rule: Option<RuleId>,
    /// When the proposer created the action.
    pub generated_at: Timestamp,
    /// When the review completed. `None` iff `status` is `pending`.
    pub reviewed_at: Option<Timestamp>,
    /// When downstream execution completed. Stamped by the executor,
    /// outside this engine.
    pub executed_at: Option<Timestamp>,
}

impl ActionRecord {
    /// Create a pending record from a validated proposal.
    #[must_use]
    pub fn new(proposal: NewAction) -> Self {
        Self {
            id: ActionId::new(),
            action_type: proposal.action_type,
            risk_level: proposal.risk_level,
            status: ActionStatus::Pending,
            action_data: proposal.action_data,
            context_data: proposal.context_data,
            confidence: proposal.confidence,
            user_feedback: None,
            edited_data: None,
            decided_by_rule: None,
            generated_at: Timestamp::now(),
            reviewed_at: None,
            executed_at: None,
        }
    }

    /// Check if the action still awaits review.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// The payload rules match against and executors act on: the edited
    /// payload when present, otherwise the proposed one.
    #[must_use]
    pub fn effective_data(&self) -> &Value {
        self.edited_data.as_ref().unwrap_or(&self.action_data)
    }

    /// Apply a review outcome, the only transition out of `pending`.
    ///
    /// Checks run before any field is written, so a failed call leaves the
    /// record unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`] for a denial with blank
    /// feedback, and [`ApprovalError::InvalidState`] when the action has
    /// already been reviewed.
    pub fn apply_review(&mut self, outcome: ReviewOutcome, at: Timestamp) -> ApprovalResult<()> {
        if let ReviewOutcome::Denied { feedback } = &outcome
            && feedback.trim().is_empty()
        {
            return Err(ApprovalError::Validation {
                field: "feedback".to_string(),
                reason: "denial requires non-empty feedback".to_string(),
            });
        }
        if !self.is_pending() {
            return Err(ApprovalError::InvalidState {
                subject: self.id.to_string(),
                expected: ActionStatus::Pending.to_string(),
                actual: self.status.to_string(),
            });
        }

        self.status = outcome.status();
        match outcome {
            ReviewOutcome::Approved => {},
            ReviewOutcome::Denied { feedback } => self.user_feedback = Some(feedback),
            ReviewOutcome::Edited { data } => self.edited_data = Some(data),
            ReviewOutcome::AutoApproved { rule_id } => self.decided_by_rule = Some(rule_id),
        }
        self.reviewed_at = Some(at);
        Ok(())
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}) - {}",
            self.risk_level, self.action_type, self.id, self.status
        )
    }
}

/// Filter for action listings.
///
/// Filtering is a pure read — it never touches `reviewed_at` or any other
/// field of the records it inspects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionFilter {
    /// Keep only actions in this status.
    pub status: Option<ActionStatus>,
    /// Keep only actions of this type.
    pub action_type: Option<String>,
    /// Keep only actions at this risk level.
    pub risk_level: Option<RiskLevel>,
}

impl ActionFilter {
    /// Filter matching every action.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter for the review inbox: pending actions only.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            status: Some(ActionStatus::Pending),
            ..Self::default()
        }
    }

    /// Check whether an action passes this filter.
    #[must_use]
    pub fn accepts(&self, action: &ActionRecord) -> bool {
        if let Some(status) = self.status
            && status != action.status
        {
            return false;
        }
        if let Some(action_type) = &self.action_type
            && action_type != &action.action_type
        {
            return false;
        }
        if let Some(risk_level) = self.risk_level
            && risk_level != action.risk_level
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending_action() -> ActionRecord {
        ActionRecord::new(NewAction::new(
            "email_reply",
            RiskLevel::Low,
            json!({"recipient": "ops@example.com", "subject": "Re: standup"}),
        ))
    }

    #[test]
    fn test_new_action_lands_pending() {
        let action = pending_action();
        assert_eq!(action.status, ActionStatus::Pending);
        assert!(action.reviewed_at.is_none());
        assert!(action.user_feedback.is_none());
        assert!(action.edited_data.is_none());
        assert!(action.decided_by_rule.is_none());
    }

    #[test]
    fn test_pending_iff_unreviewed() {
        let mut action = pending_action();
        assert_eq!(action.is_pending(), action.reviewed_at.is_none());

        action
            .apply_review(ReviewOutcome::Approved, Timestamp::now())
            .unwrap();
        assert_eq!(action.is_pending(), action.reviewed_at.is_none());
        assert!(action.reviewed_at.is_some());
    }

    #[test]
    fn test_approve() {
        let mut action = pending_action();
        action
            .apply_review(ReviewOutcome::Approved, Timestamp::now())
            .unwrap();
        assert_eq!(action.status, ActionStatus::Approved);
        assert!(action.reviewed_at.is_some());
    }

    #[test]
    fn test_deny_stores_feedback() {
        let mut action = pending_action();
        action
            .apply_review(
                ReviewOutcome::Denied {
                    feedback: "wrong recipient".to_string(),
                },
                Timestamp::now(),
            )
            .unwrap();
        assert_eq!(action.status, ActionStatus::Denied);
        assert_eq!(action.user_feedback.as_deref(), Some("wrong recipient"));
    }

    #[test]
    fn test_deny_blank_feedback_rejected() {
        let mut action = pending_action();
        let err = action
            .apply_review(
                ReviewOutcome::Denied {
                    feedback: "   ".to_string(),
                },
                Timestamp::now(),
            )
            .unwrap_err();
        assert!(matches!(err, ApprovalError::Validation { .. }));
        // Record untouched.
        assert_eq!(action.status, ActionStatus::Pending);
        assert!(action.reviewed_at.is_none());
        assert!(action.user_feedback.is_none());
    }

    #[test]
    fn test_edit_is_terminal_and_stores_payload() {
        let mut action = pending_action();
        let edited = json!({"recipient": "ops@example.com", "subject": "Re: standup (amended)"});
        action
            .apply_review(
                ReviewOutcome::Edited {
                    data: edited.clone(),
                },
                Timestamp::now(),
            )
            .unwrap();
        assert_eq!(action.status, ActionStatus::Edited);
        assert_eq!(action.edited_data, Some(edited.clone()));
        assert_eq!(action.effective_data(), &edited);

        // Edited is terminal — no second review.
        let err = action
            .apply_review(ReviewOutcome::Approved, Timestamp::now())
            .unwrap_err();
        assert!(matches!(err, ApprovalError::InvalidState { .. }));
    }

    #[test]
    fn test_auto_approve_records_rule() {
        let mut action = pending_action();
        let rule_id = RuleId::new();
        action
            .apply_review(
                ReviewOutcome::AutoApproved {
                    rule_id: rule_id.clone(),
                },
                Timestamp::now(),
            )
            .unwrap();
        assert_eq!(action.status, ActionStatus::AutoApproved);
        assert_eq!(action.decided_by_rule, Some(rule_id));
    }

    #[test]
    fn test_second_review_fails_and_preserves_record() {
        let mut action = pending_action();
        action
            .apply_review(ReviewOutcome::Approved, Timestamp::now())
            .unwrap();
        let reviewed_at = action.reviewed_at;

        let err = action
            .apply_review(
                ReviewOutcome::Denied {
                    feedback: "too late".to_string(),
                },
                Timestamp::now(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::InvalidState { ref actual, .. } if actual == "approved"
        ));
        assert_eq!(action.status, ActionStatus::Approved);
        assert_eq!(action.reviewed_at, reviewed_at);
        assert!(action.user_feedback.is_none());
    }

    #[test]
    fn test_effective_data_prefers_edit() {
        let action = pending_action();
        assert_eq!(action.effective_data(), &action.action_data);
    }

    #[test]
    fn test_proposal_validation() {
        let ok = NewAction::new("task_creation", RiskLevel::Low, json!({"title": "x"}))
            .with_confidence(0.75)
            .with_context_data(json!({"source": "planner"}));
        assert!(ok.validate().is_ok());

        let blank_type = NewAction::new("  ", RiskLevel::Low, json!({}));
        assert!(matches!(
            blank_type.validate(),
            Err(ApprovalError::Validation { ref field, .. }) if field == "action_type"
        ));

        let scalar_payload = NewAction::new("task_creation", RiskLevel::Low, json!(42));
        assert!(matches!(
            scalar_payload.validate(),
            Err(ApprovalError::Validation { ref field, .. }) if field == "action_data"
        ));

        let bad_confidence =
            NewAction::new("task_creation", RiskLevel::Low, json!({})).with_confidence(1.2);
        assert!(matches!(
            bad_confidence.validate(),
            Err(ApprovalError::Validation { ref field, .. }) if field == "confidence"
        ));
    }

    #[test]
    fn test_filter() {
        let action = pending_action();
        assert!(ActionFilter::all().accepts(&action));
        assert!(ActionFilter::pending().accepts(&action));

        let by_type = ActionFilter {
            action_type: Some("email_reply".to_string()),
            ..ActionFilter::default()
        };
        assert!(by_type.accepts(&action));

        let wrong_type = ActionFilter {
            action_type: Some("calendar_block".to_string()),
            ..ActionFilter::default()
        };
        assert!(!wrong_type.accepts(&action));

        let high_risk = ActionFilter {
            risk_level: Some(RiskLevel::High),
            ..ActionFilter::default()
        };
        assert!(!high_risk.accepts(&action));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ActionStatus::AutoApproved).unwrap();
        assert_eq!(json, "\"auto_approved\"");
        let status: ActionStatus = serde_json::from_str("\"edited\"").unwrap();
        assert_eq!(status, ActionStatus::Edited);
    }

    #[test]
    fn test_decision_serialization() {
        let decision = Decision::Deny {
            feedback: "not today".to_string(),
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["decision"], "deny");
        assert_eq!(json["feedback"], "not today");

        let roundtrip: Decision = serde_json::from_value(json).unwrap();
        assert!(matches!(roundtrip, Decision::Deny { .. }));
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let action = pending_action();
        let json = serde_json::to_string(&action).unwrap();
        let deserialized: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(action.id, deserialized.id);
        assert_eq!(deserialized.status, ActionStatus::Pending);
    }
}
