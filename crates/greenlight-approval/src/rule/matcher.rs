//! First-match rule selection for pending actions.

use crate::action::ActionRecord;

use super::RuleRecord;

/// Find the first rule eligible to auto-approve an action.
///
/// Eligibility filters, applied in order:
/// 1. The rule is enabled.
/// 2. The rule's action type equals the action's.
/// 3. The rule clears the trust threshold (unscored rules qualify; scored
///    rules below the threshold are on probation and are skipped).
/// 4. Every condition holds against the action's effective payload (the
///    edited payload when present, otherwise the proposed one).
///
/// The first rule in `rules` passing all four wins. The matcher performs no
/// prioritization of its own — callers wanting a specific precedence must
/// order `rules` before calling. Stores hand rules over in creation order.
///
/// Returning `None` is the normal path for actions that need a human.
#[must_use]
pub fn find_match<'a>(
    action: &ActionRecord,
    rules: &'a [RuleRecord],
    trust_threshold: f64,
) -> Option<&'a RuleRecord> {
    let data = action.effective_data();
    let matched = rules.iter().find(|rule| {
        rule.enabled
            && rule.action_type == action.action_type
            && rule.is_trusted(trust_threshold)
            && rule.matches(data)
    });
    if let Some(rule) = matched {
        tracing::debug!(action = %action.id, rule = %rule.id, "rule matched for auto-approval");
    }
    matched
}
