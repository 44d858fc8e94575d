//! Greenlight Approval - Human-in-the-loop review for agent-proposed actions.
//!
//! An autonomous agent proposes side-effecting actions (send a message,
//! create a calendar event, update a record). Each proposal waits in a queue
//! for a human decision — approve, deny with feedback, or approve with
//! edits. Auto-approve rules, built by humans from patterns they keep
//! approving, progressively take over the low-risk repetitive decisions:
//! a rule whose conditions all match a pending action approves it on the
//! spot, and every scored outcome feeds the rule's trust. Rules that
//! misfire drop below the trust threshold and stop auto-approving until
//! their record recovers.
//!
//! # Components
//!
//! - **Queue**: [`ActionRecord`], [`ActionStatus`], [`Decision`] — the
//!   review state machine (`pending` to exactly one terminal status).
//! - **Rules**: [`RuleRecord`], [`Condition`], [`ConditionOp`] — typed
//!   field predicates bound to one action type, and
//!   [`find_match`](rule::find_match), the first-match-wins selector.
//! - **Trust**: the running success average and its integrity invariants
//!   ([`trust`]).
//! - **Stores**: [`ActionStore`]/[`RuleStore`] seams with in-memory
//!   implementations ([`store`]).
//! - **Facade**: [`ApprovalEngine`] — the operations a frontend or service
//!   layer calls.
//!
//! # Example
//!
//! ```
//! use greenlight_approval::{ApprovalEngine, Condition, ConditionOp, NewAction, NewRule};
//! use greenlight_core::types::RiskLevel;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> greenlight_approval::ApprovalResult<()> {
//! let engine = ApprovalEngine::in_memory();
//!
//! // A human-built rule: short calendar blocks are fine.
//! engine
//!     .create_rule(NewRule::new(
//!         "calendar_block",
//!         vec![Condition::new("duration_minutes", ConditionOp::Lt(60.0))],
//!     ))
//!     .await?;
//!
//! // An agent proposes a 30-minute block; the rule approves it.
//! let action = engine
//!     .create_action(NewAction::new(
//!         "calendar_block",
//!         RiskLevel::Low,
//!         json!({ "duration_minutes": 30 }),
//!     ))
//!     .await?;
//! let outcome = engine.evaluate_for_auto_approval(&action.id).await?;
//! assert!(outcome.matched);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod action;
pub mod config;
pub mod engine;
/// Error types and results for the approval engine.
pub mod error;
pub mod rule;
pub mod stats;
pub mod store;
pub mod trust;

pub use action::{ActionFilter, ActionRecord, ActionStatus, Decision, NewAction, ReviewOutcome};
pub use config::EngineConfig;
pub use engine::{ApprovalEngine, MatchOutcome};
pub use error::{ApprovalError, ApprovalResult};
pub use rule::{Condition, ConditionOp, NewRule, RuleFilter, RuleRecord, find_match};
pub use stats::{EngineStats, RuleEffectiveness, TypeBreakdown};
pub use store::{ActionStore, MemoryActionStore, MemoryRuleStore, Page, RuleStore};
