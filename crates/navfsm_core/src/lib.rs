//! navfsm_core: transport-agnostic core of the robot behavior arbiter.
//!
//! Design goals:
//! - Pure, testable logic (no runtime or transport deps).
//! - Closed enums and exhaustive matches instead of lookup tables.
//! - Small, stable public API surface.

pub mod error;

/// States, events, transition table and the state machine core.
pub mod arbiter;
