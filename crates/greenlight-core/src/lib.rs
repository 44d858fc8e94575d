//! Greenlight Core - Foundation types for the Greenlight action review engine.
//!
//! This crate provides the shared vocabulary used across the workspace:
//! - Newtype identifiers for actions and rules
//! - The [`Timestamp`] wrapper for consistent time handling
//! - The [`RiskLevel`] classification assigned by action proposers

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod types;

pub use types::{ActionId, RiskLevel, RuleId, Timestamp};
