//! navfsm_roslibrust
//!
//! Runtime layer for the behavior arbiter: serialized event queue, bounded
//! waits, periodic state publishing and (behind the `roslibrust` feature)
//! rosbridge transport, while keeping arbitration semantics in `navfsm_core`.

pub mod error;

pub mod arbiter;
pub mod topics;
pub mod transport;

// Re-export core types that runtime users will commonly need
pub use navfsm_core::arbiter::{Behavior, Event, State, TransitionTable};
pub use navfsm_core::error::{CoreError, Result};
