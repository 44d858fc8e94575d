//! Prelude module - commonly used types for convenient import.
//!
//! Use `use greenlight_approval::prelude::*;` to import the engine surface.

// Errors
pub use crate::{ApprovalError, ApprovalResult};

// Queue
pub use crate::{ActionFilter, ActionRecord, ActionStatus, Decision, NewAction};

// Rules
pub use crate::{Condition, ConditionOp, NewRule, RuleFilter, RuleRecord};

// Stores
pub use crate::{ActionStore, MemoryActionStore, MemoryRuleStore, Page, RuleStore};

// Facade
pub use crate::{ApprovalEngine, EngineConfig, EngineStats, MatchOutcome};

// Core types
pub use greenlight_core::types::{ActionId, RiskLevel, RuleId, Timestamp};
