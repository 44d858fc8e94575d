//! Trust scoring for auto-approve rules.
//!
//! A rule's `success_rate` is a running average of scored outcomes: `1` when
//! the consumer judged an auto-approval correct (the human did not later
//! reverse it), `0` when it was reversed or heavily reworked. What counts as
//! success is the consumer's call — this module only owns the update
//! arithmetic and the invariants between the counters.
//!
//! `success_rate` and `times_triggered` move together in one atomic store
//! update ([`RuleStore::record_outcome`](crate::store::RuleStore::record_outcome)).
//! A record where one moved without the other is corrupt;
//! [`check_integrity`] surfaces it as [`ApprovalError::Integrity`] before
//! any new outcome is folded in.

use crate::error::{ApprovalError, ApprovalResult};
use crate::rule::RuleRecord;

/// Fold one outcome into a rule's running success average.
///
/// The first scored outcome sets the rate outright (`1.0` or `0.0`); each
/// later outcome is weighted into the average:
/// `(rate * n + outcome) / (n + 1)` with `n = times_triggered`.
///
/// Pure arithmetic — the caller applies the result and the paired
/// `times_triggered` increment inside one store transaction.
#[must_use]
#[allow(clippy::cast_precision_loss)] // trigger counts stay far below 2^52
pub fn updated_success_rate(rule: &RuleRecord, was_successful: bool) -> f64 {
    let outcome = if was_successful { 1.0 } else { 0.0 };
    match rule.success_rate {
        None => outcome,
        Some(rate) => {
            let n = rule.times_triggered as f64;
            (rate * n + outcome) / (n + 1.0)
        },
    }
}

/// Verify the invariants between a rule's trust fields.
///
/// # Errors
///
/// Returns [`ApprovalError::Integrity`] when `success_rate` and
/// `times_triggered` have diverged (one moved without the other) or the
/// rate has left `[0, 1]`. Callers log this with `error!` — it means a
/// store's transaction boundary is broken, not that input was bad.
pub fn check_integrity(rule: &RuleRecord) -> ApprovalResult<()> {
    match rule.success_rate {
        Some(rate) if rule.times_triggered == 0 => Err(ApprovalError::Integrity(format!(
            "rule {} has success_rate {rate} but zero triggers",
            rule.id
        ))),
        Some(rate) if !(0.0..=1.0).contains(&rate) => Err(ApprovalError::Integrity(format!(
            "rule {} has success_rate {rate} outside [0, 1]",
            rule.id
        ))),
        None if rule.times_triggered > 0 => Err(ApprovalError::Integrity(format!(
            "rule {} has {} triggers but no success_rate",
            rule.id, rule.times_triggered
        ))),
        _ => Ok(()),
    }
}
