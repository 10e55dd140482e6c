//! navfsm_core::arbiter
//!
//! Pure (transport-agnostic) behavior arbitration semantics.
//! This module contains **no** async runtime or transport code.
//!
//! Key ideas:
//! - Closed `State` x `Event` enums; the static rules are an exhaustive match
//! - `Timeout` resolves through a validated per-state fallback map
//! - Activation is always "disable all, then enable one"
//! - The runtime layer serializes access to `StateMachine` and owns transport

mod activation;
mod event;
mod gate;
mod graph;
mod machine;
mod state;
mod table;

pub use activation::{
    ActivationController, ActivationRecord, ArbiterOutputs, Behavior, ALL_BEHAVIORS,
};
pub use event::{Event, ALL_EVENTS};
pub use gate::ActivationGate;
pub use graph::{transition_graph, TransitionEdge, TransitionGraph};
pub use machine::{Snapshot, StateChange, StateMachine};
pub use state::{State, ALL_STATES};
pub use table::{next, TransitionTable, TransitionTableBuilder};
