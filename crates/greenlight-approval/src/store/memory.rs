//! In-memory store implementations.
//!
//! Thread-safe via internal [`RwLock`]s. Records live in insertion order,
//! which is what gives listings their creation-order contract. These back
//! tests and single-process deployments; the trait methods run their
//! check-then-write sequences entirely under one lock, which is what makes
//! the transition and outcome updates atomic.

use async_trait::async_trait;
use std::fmt;
use std::sync::RwLock;

use greenlight_core::types::{ActionId, RuleId, Timestamp};

use crate::action::{ActionFilter, ActionRecord, ReviewOutcome};
use crate::error::{ApprovalError, ApprovalResult};
use crate::rule::{RuleFilter, RuleRecord};
use crate::trust;

use super::{ActionStore, Page, RuleStore};

/// In-memory action store.
///
/// # Example
///
/// ```
/// use greenlight_approval::store::MemoryActionStore;
///
/// let store = MemoryActionStore::new();
/// assert_eq!(store.count(), 0);
/// ```
pub struct MemoryActionStore {
    actions: RwLock<Vec<ActionRecord>>,
}

impl MemoryActionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored actions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.actions.read().map(|a| a.len()).unwrap_or(0)
    }
}

impl Default for MemoryActionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryActionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryActionStore")
            .field("count", &self.count())
            .finish()
    }
}

#[async_trait]
impl ActionStore for MemoryActionStore {
    async fn insert(&self, action: ActionRecord) -> ApprovalResult<()> {
        let mut actions = self
            .actions
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        actions.push(action);
        Ok(())
    }

    async fn get(&self, id: &ActionId) -> ApprovalResult<ActionRecord> {
        let actions = self
            .actions
            .read()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        actions
            .iter()
            .find(|a| &a.id == id)
            .cloned()
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))
    }

    async fn list(&self, filter: &ActionFilter, page: Page) -> ApprovalResult<Vec<ActionRecord>> {
        let actions = self
            .actions
            .read()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        Ok(actions
            .iter()
            .filter(|a| filter.accepts(a))
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect())
    }

    async fn transition(
        &self,
        id: &ActionId,
        outcome: ReviewOutcome,
    ) -> ApprovalResult<ActionRecord> {
        // Check and write under one lock: the first decision wins, the
        // loser sees InvalidState from apply_review.
        let mut actions = self
            .actions
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        let action = actions
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;
        action.apply_review(outcome, Timestamp::now())?;
        Ok(action.clone())
    }
}

/// In-memory rule store.
pub struct MemoryRuleStore {
    rules: RwLock<Vec<RuleRecord>>,
}

impl MemoryRuleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored rules.
    #[must_use]
    pub fn count(&self) -> usize {
        self.rules.read().map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for MemoryRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryRuleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRuleStore")
            .field("count", &self.count())
            .finish()
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn insert(&self, rule: RuleRecord) -> ApprovalResult<()> {
        let mut rules = self
            .rules
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        rules.push(rule);
        Ok(())
    }

    async fn get(&self, id: &RuleId) -> ApprovalResult<RuleRecord> {
        let rules = self
            .rules
            .read()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        rules
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))
    }

    async fn list(&self, filter: &RuleFilter) -> ApprovalResult<Vec<RuleRecord>> {
        let rules = self
            .rules
            .read()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        Ok(rules.iter().filter(|r| filter.accepts(r)).cloned().collect())
    }

    async fn set_enabled(&self, id: &RuleId, enabled: bool) -> ApprovalResult<()> {
        let mut rules = self
            .rules
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        let rule = rules
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;
        rule.enabled = enabled;
        Ok(())
    }

    async fn delete(&self, id: &RuleId) -> ApprovalResult<()> {
        let mut rules = self
            .rules
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        let before = rules.len();
        rules.retain(|r| &r.id != id);
        if rules.len() == before {
            return Err(ApprovalError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn record_trigger(&self, id: &RuleId, at: Timestamp) -> ApprovalResult<()> {
        let mut rules = self
            .rules
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        let rule = rules
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;
        rule.last_triggered_at = Some(at);
        Ok(())
    }

    async fn record_outcome(&self, id: &RuleId, was_successful: bool) -> ApprovalResult<f64> {
        // Rate and trigger count move together under one lock; concurrent
        // outcomes for the same rule serialize here.
        let mut rules = self
            .rules
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        let rule = rules
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;

        if let Err(err) = trust::check_integrity(rule) {
            tracing::error!(rule = %rule.id, %err, "trust counters corrupt, refusing outcome");
            return Err(err);
        }

        let new_rate = trust::updated_success_rate(rule, was_successful);
        rule.success_rate = Some(new_rate);
        rule.times_triggered = rule.times_triggered.saturating_add(1);
        Ok(new_rate)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
