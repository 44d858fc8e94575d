//! Read-only statistics over the action queue and rule store.
//!
//! Everything here is a projection: computed from snapshots, mutating
//! nothing. The numbers exist to describe the learning loop — how often
//! humans approve, how much of the load rules have taken over, and how each
//! rule has performed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use greenlight_core::types::RuleId;

use crate::action::{ActionRecord, ActionStatus};
use crate::rule::RuleRecord;

/// Status counts for one action type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    /// Total proposals of this type.
    pub total: u64,
    /// Still awaiting review.
    pub pending: u64,
    /// Approved by a human.
    pub approved: u64,
    /// Denied by a human.
    pub denied: u64,
    /// Approved by a rule.
    pub auto_approved: u64,
    /// Approved with edits.
    pub edited: u64,
}

/// Per-rule effectiveness, straight from the rule's trust state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEffectiveness {
    /// The rule.
    pub rule_id: RuleId,
    /// Action type the rule covers.
    pub action_type: String,
    /// Whether the rule is currently enabled.
    pub enabled: bool,
    /// Scored matches.
    pub times_triggered: u64,
    /// Running success average, `None` while unscored.
    pub success_rate: Option<f64>,
}

/// Aggregated engine statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Actions that have left `pending` (any terminal status).
    pub total_reviewed: u64,
    /// `(approved + auto_approved) / (approved + auto_approved + denied)`.
    /// Zero when nothing has been decided yet.
    pub approval_rate: f64,
    /// `auto_approved / (approved + auto_approved + denied)`, the share of
    /// decisions rules made. Same denominator as `approval_rate`.
    pub auto_approve_rate: f64,
    /// Mean proposer confidence over actions that carried one.
    pub avg_confidence: f64,
    /// Status counts per action type, keyed by type.
    pub by_type: BTreeMap<String, TypeBreakdown>,
    /// Trust state of every rule, in creation order.
    pub rule_effectiveness: Vec<RuleEffectiveness>,
}

impl EngineStats {
    /// Compute statistics from snapshots of the two stores.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // record counts stay far below 2^52
    pub fn compute(actions: &[ActionRecord], rules: &[RuleRecord]) -> Self {
        let mut total_reviewed: u64 = 0;
        let mut approved: u64 = 0;
        let mut denied: u64 = 0;
        let mut auto_approved: u64 = 0;
        let mut confidence_sum = 0.0;
        let mut confidence_count: u64 = 0;
        let mut by_type: BTreeMap<String, TypeBreakdown> = BTreeMap::new();

        for action in actions {
            let entry = by_type.entry(action.action_type.clone()).or_default();
            entry.total = entry.total.saturating_add(1);
            match action.status {
                ActionStatus::Pending => entry.pending = entry.pending.saturating_add(1),
                ActionStatus::Approved => {
                    approved = approved.saturating_add(1);
                    entry.approved = entry.approved.saturating_add(1);
                },
                ActionStatus::Denied => {
                    denied = denied.saturating_add(1);
                    entry.denied = entry.denied.saturating_add(1);
                },
                ActionStatus::AutoApproved => {
                    auto_approved = auto_approved.saturating_add(1);
                    entry.auto_approved = entry.auto_approved.saturating_add(1);
                },
                ActionStatus::Edited => entry.edited = entry.edited.saturating_add(1),
            }
            if action.status.is_reviewed() {
                total_reviewed = total_reviewed.saturating_add(1);
            }
            if let Some(confidence) = action.confidence {
                confidence_sum += confidence;
                confidence_count = confidence_count.saturating_add(1);
            }
        }

        let decided = approved.saturating_add(auto_approved).saturating_add(denied);
        let approval_rate = if decided == 0 {
            0.0
        } else {
            approved.saturating_add(auto_approved) as f64 / decided as f64
        };
        let auto_approve_rate = if decided == 0 {
            0.0
        } else {
            auto_approved as f64 / decided as f64
        };
        let avg_confidence = if confidence_count == 0 {
            0.0
        } else {
            confidence_sum / confidence_count as f64
        };

        let rule_effectiveness = rules
            .iter()
            .map(|rule| RuleEffectiveness {
                rule_id: rule.id.clone(),
                action_type: rule.action_type.clone(),
                enabled: rule.enabled,
                times_triggered: rule.times_triggered,
                success_rate: rule.success_rate,
            })
            .collect();

        Self {
            total_reviewed,
            approval_rate,
            auto_approve_rate,
            avg_confidence,
            by_type,
            rule_effectiveness,
        }
    }
}
