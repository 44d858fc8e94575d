//! Storage seams for actions and rules.
//!
//! The engine never owns a database handle; it is handed an
//! [`ActionStore`] and a [`RuleStore`] at construction. The in-memory
//! implementations in this module back tests and single-process
//! deployments; a persistent backend implements the same traits.
//!
//! The traits carry the concurrency contract, not just CRUD:
//!
//! - [`ActionStore::transition`] is the only write that moves an action out
//!   of `pending`, and it must be atomic per action id — of two concurrent
//!   decisions on one action, exactly one wins and the other observes
//!   [`ApprovalError::InvalidState`](crate::error::ApprovalError::InvalidState).
//!   An optimistic check on `status`, never last-write-wins.
//! - [`RuleStore::record_outcome`] must serialize per rule id: the
//!   read-modify-write over `times_triggered`/`success_rate` is not
//!   commutative across concurrent outcomes.

mod memory;

pub use memory::{MemoryActionStore, MemoryRuleStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use greenlight_core::types::{ActionId, RuleId, Timestamp};

use crate::action::{ActionFilter, ActionRecord, ReviewOutcome};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::ApprovalResult;
use crate::rule::{RuleFilter, RuleRecord};

/// A page window for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Records to skip.
    pub offset: usize,
    /// Maximum records to return.
    pub limit: usize,
}

impl Page {
    /// Create a page window.
    #[must_use]
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// A window over everything. Used by read-only projections that need
    /// the full record set.
    #[must_use]
    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: usize::MAX,
        }
    }

    /// This window with its limit capped.
    #[must_use]
    pub fn clamped(self, max_limit: usize) -> Self {
        Self {
            offset: self.offset,
            limit: self.limit.min(max_limit),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Persistence seam for action records.
#[async_trait]
pub trait ActionStore: Send + Sync {
    /// Persist a freshly created (pending) action.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backend rejects the write.
    async fn insert(&self, action: ActionRecord) -> ApprovalResult<()>;

    /// Fetch one action.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    async fn get(&self, id: &ActionId) -> ApprovalResult<ActionRecord>;

    /// List actions passing a filter, windowed by `page`, in creation
    /// order. Read-only.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backend fails.
    async fn list(&self, filter: &ActionFilter, page: Page) -> ApprovalResult<Vec<ActionRecord>>;

    /// Atomically resolve a pending action and return the updated record.
    ///
    /// The status check and the write happen under one unit of isolation
    /// per action id: only the first transition out of `pending` succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id,
    /// [`ApprovalError::InvalidState`](crate::error::ApprovalError::InvalidState)
    /// when the action has already been reviewed, and
    /// [`ApprovalError::Validation`](crate::error::ApprovalError::Validation)
    /// when the outcome itself is malformed (blank denial feedback).
    async fn transition(
        &self,
        id: &ActionId,
        outcome: ReviewOutcome,
    ) -> ApprovalResult<ActionRecord>;
}

/// Persistence seam for auto-approve rules.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Persist a freshly created rule.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backend rejects the write.
    async fn insert(&self, rule: RuleRecord) -> ApprovalResult<()>;

    /// Fetch one rule.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    async fn get(&self, id: &RuleId) -> ApprovalResult<RuleRecord>;

    /// List rules passing a filter, in creation order — the order the
    /// matcher's first-match-wins contract is defined against.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backend fails.
    async fn list(&self, filter: &RuleFilter) -> ApprovalResult<Vec<RuleRecord>>;

    /// Enable or disable a rule. Never touches the trust counters.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    async fn set_enabled(&self, id: &RuleId, enabled: bool) -> ApprovalResult<()>;

    /// Delete a rule.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    async fn delete(&self, id: &RuleId) -> ApprovalResult<()>;

    /// Stamp a rule's `last_triggered_at` after it auto-approved an action.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id.
    async fn record_trigger(&self, id: &RuleId, at: Timestamp) -> ApprovalResult<()>;

    /// Atomically fold one scored outcome into a rule's trust state and
    /// return the new success rate.
    ///
    /// `success_rate` and `times_triggered` move together in this one
    /// update; implementations must serialize concurrent outcomes per rule
    /// id.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`](crate::error::ApprovalError::NotFound)
    /// for an unknown id and
    /// [`ApprovalError::Integrity`](crate::error::ApprovalError::Integrity)
    /// when the stored counters have diverged.
    async fn record_outcome(&self, id: &RuleId, was_successful: bool) -> ApprovalResult<f64>;
}
