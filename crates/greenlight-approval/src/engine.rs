//! The approval engine — the facade consumers call.
//!
//! [`ApprovalEngine`] coordinates the action queue, the rule matcher, and
//! the trust updater over injected [`ActionStore`]/[`RuleStore`] backends.
//!
//! # Flow
//!
//! 1. A proposer submits an action; it lands `pending`. Nothing is matched
//!    at creation — evaluation is a deliberate second call, so creation
//!    stays side-effect free.
//! 2. [`evaluate_for_auto_approval`](ApprovalEngine::evaluate_for_auto_approval)
//!    consults the enabled rules for the action's type. A trusted match
//!    moves the action to `auto_approved` and stamps the rule's trigger
//!    time; no match leaves it waiting for a human.
//! 3. A human resolves pending actions through
//!    [`decide_action`](ApprovalEngine::decide_action).
//! 4. The consumer reports back how auto-approvals worked out via
//!    [`record_outcome`](ApprovalEngine::record_outcome), which feeds the
//!    rule's trust. Rules that fall below the trust threshold stop
//!    auto-approving until their record recovers.
//!
//! The engine never executes the side effects themselves — an approved
//! action is only marked for an external executor.

use std::sync::Arc;

use greenlight_core::types::{ActionId, RuleId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::action::{ActionFilter, ActionRecord, Decision, NewAction, ReviewOutcome};
use crate::config::EngineConfig;
use crate::error::ApprovalResult;
use crate::rule::{self, NewRule, RuleFilter, RuleRecord};
use crate::stats::EngineStats;
use crate::store::{ActionStore, MemoryActionStore, MemoryRuleStore, Page, RuleStore};

/// Result of an auto-approval evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Whether a rule matched and the action was auto-approved.
    pub matched: bool,
    /// The matching rule, when there was one.
    pub rule_id: Option<RuleId>,
}

impl MatchOutcome {
    /// A successful match by `rule_id`.
    #[must_use]
    pub fn hit(rule_id: RuleId) -> Self {
        Self {
            matched: true,
            rule_id: Some(rule_id),
        }
    }

    /// No rule matched — the action waits for a human.
    #[must_use]
    pub fn miss() -> Self {
        Self {
            matched: false,
            rule_id: None,
        }
    }
}

/// The approval engine facade.
pub struct ApprovalEngine {
    actions: Arc<dyn ActionStore>,
    rules: Arc<dyn RuleStore>,
    config: EngineConfig,
}

impl ApprovalEngine {
    /// Create an engine over the given stores with default configuration.
    #[must_use]
    pub fn new(actions: Arc<dyn ActionStore>, rules: Arc<dyn RuleStore>) -> Self {
        Self {
            actions,
            rules,
            config: EngineConfig::default(),
        }
    }

    /// Create an engine backed by fresh in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryActionStore::new()),
            Arc::new(MemoryRuleStore::new()),
        )
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------

    /// Accept a proposed action into the queue. It lands `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`](crate::error::ApprovalError::Validation)
    /// for a malformed proposal (nothing is persisted), or a storage error.
    pub async fn create_action(&self, proposal: NewAction) -> ApprovalResult<ActionRecord> {
        proposal.validate()?;
        let action = ActionRecord::new(proposal);
        self.actions.insert(action.clone()).await?;
        tracing::debug!(action = %action.id, action_type = %action.action_type, "action queued");
        Ok(action)
    }

    /// Fetch one action.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    pub async fn get_action(&self, id: &ActionId) -> ApprovalResult<ActionRecord> {
        self.actions.get(id).await
    }

    /// List actions passing a filter. The page limit is capped at the
    /// configured maximum.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backend fails.
    pub async fn list_actions(
        &self,
        filter: &ActionFilter,
        page: Page,
    ) -> ApprovalResult<Vec<ActionRecord>> {
        self.actions
            .list(filter, page.clamped(self.config.max_page_size))
            .await
    }

    /// Apply a human decision to a pending action.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`](crate::error::ApprovalError::Validation)
    /// for a denial without feedback or an edit payload that is not an
    /// object (the action stays `pending`),
    /// [`ApprovalError::InvalidState`](crate::error::ApprovalError::InvalidState)
    /// when the action was already decided, and
    /// [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    pub async fn decide_action(
        &self,
        id: &ActionId,
        decision: Decision,
    ) -> ApprovalResult<ActionRecord> {
        let outcome = match decision {
            Decision::Approve => ReviewOutcome::Approved,
            Decision::Deny { feedback } => ReviewOutcome::Denied { feedback },
            Decision::Edit { data } => {
                if !data.is_object() {
                    return Err(crate::error::ApprovalError::Validation {
                        field: "data".to_string(),
                        reason: "edited payload must be a JSON object".to_string(),
                    });
                }
                ReviewOutcome::Edited { data }
            },
        };
        let action = self.actions.transition(id, outcome).await?;
        tracing::debug!(action = %action.id, status = %action.status, "action decided");
        Ok(action)
    }

    /// Run the rule matcher over a pending action and apply a match.
    ///
    /// On a hit the action moves to `auto_approved` and the rule's trigger
    /// time is stamped. A miss changes nothing and is the normal path for
    /// actions that need human review.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id and
    /// [`ApprovalError::InvalidState`](crate::error::ApprovalError::InvalidState)
    /// when the action has already been decided — re-evaluating a decided
    /// action is a caller bug, never a silent overwrite.
    pub async fn evaluate_for_auto_approval(&self, id: &ActionId) -> ApprovalResult<MatchOutcome> {
        let action = self.actions.get(id).await?;
        if !action.is_pending() {
            return Err(crate::error::ApprovalError::InvalidState {
                subject: action.id.to_string(),
                expected: "pending".to_string(),
                actual: action.status.to_string(),
            });
        }

        let candidates = self
            .rules
            .list(&RuleFilter::enabled_for(&action.action_type))
            .await?;
        let Some(matched) = rule::find_match(&action, &candidates, self.config.trust_threshold)
        else {
            return Ok(MatchOutcome::miss());
        };
        let rule_id = matched.id.clone();

        // A concurrent human decision may have landed since the snapshot;
        // the atomic transition then surfaces InvalidState.
        self.actions
            .transition(
                id,
                ReviewOutcome::AutoApproved {
                    rule_id: rule_id.clone(),
                },
            )
            .await?;

        // Log error but keep the approval (the action is already decided).
        if let Err(err) = self.rules.record_trigger(&rule_id, Timestamp::now()).await {
            tracing::warn!(rule = %rule_id, %err, "failed to stamp rule trigger");
        }

        tracing::debug!(action = %id, rule = %rule_id, "action auto-approved");
        Ok(MatchOutcome::hit(rule_id))
    }

    // -------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------

    /// Create an auto-approve rule from a validated specification.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`](crate::error::ApprovalError::Validation)
    /// for a blank action type, an empty condition set, or a condition that
    /// fails its own validation; nothing is persisted on failure.
    pub async fn create_rule(&self, spec: NewRule) -> ApprovalResult<RuleRecord> {
        spec.validate()?;
        let rule = RuleRecord::new(spec);
        self.rules.insert(rule.clone()).await?;
        tracing::debug!(rule = %rule.id, action_type = %rule.action_type, "rule created");
        Ok(rule)
    }

    /// Fetch one rule.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    pub async fn get_rule(&self, id: &RuleId) -> ApprovalResult<RuleRecord> {
        self.rules.get(id).await
    }

    /// List rules passing a filter, in creation order.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backend fails.
    pub async fn list_rules(&self, filter: &RuleFilter) -> ApprovalResult<Vec<RuleRecord>> {
        self.rules.list(filter).await
    }

    /// Enable or disable a rule. Trust counters are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    pub async fn toggle_rule(&self, id: &RuleId, enabled: bool) -> ApprovalResult<()> {
        self.rules.set_enabled(id, enabled).await?;
        tracing::debug!(rule = %id, enabled, "rule toggled");
        Ok(())
    }

    /// Delete a rule.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    pub async fn delete_rule(&self, id: &RuleId) -> ApprovalResult<()> {
        self.rules.delete(id).await?;
        tracing::debug!(rule = %id, "rule deleted");
        Ok(())
    }

    /// Report whether an auto-approval worked out, feeding the rule's
    /// trust. Returns the new success rate.
    ///
    /// What counts as success is the consumer's contract — typically an
    /// auto-approved action the human never reversed. The engine only owns
    /// the arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id and
    /// [`ApprovalError::Integrity`](crate::error::ApprovalError::Integrity)
    /// when the rule's stored counters are corrupt.
    pub async fn record_outcome(&self, id: &RuleId, was_successful: bool) -> ApprovalResult<f64> {
        let new_rate = self.rules.record_outcome(id, was_successful).await?;
        tracing::debug!(rule = %id, was_successful, new_rate, "outcome recorded");
        Ok(new_rate)
    }

    // -------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------

    /// Compute aggregate statistics over the queue and the rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error when either backend fails.
    pub async fn stats(&self) -> ApprovalResult<EngineStats> {
        let actions = self.actions.list(&ActionFilter::all(), Page::all()).await?;
        let rules = self.rules.list(&RuleFilter::all()).await?;
        Ok(EngineStats::compute(&actions, &rules))
    }
}

impl std::fmt::Debug for ApprovalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
