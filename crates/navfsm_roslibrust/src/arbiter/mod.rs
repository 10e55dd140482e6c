//! navfsm_roslibrust::arbiter
//!
//! Runtime host for the core state machine.
//!
//! Serialization model: one unbounded queue, one worker task owning the
//! machine. Event sources and bounded waits are all producers on that queue,
//! so events are applied strictly in acceptance order and a wait never holds
//! the machine while suspended.

pub use navfsm_core::arbiter::{
    ActivationGate, ArbiterOutputs, Behavior, Event, Snapshot, State, StateChange,
    TransitionTable,
};

mod heartbeat;
pub use heartbeat::{StateHeartbeat, DEFAULT_HEARTBEAT_PERIOD};

mod node;
pub use node::ArbiterNode;

mod outputs;
pub use outputs::{run_output_pump, ChannelOutputs, OutboundMsg, PublishLike};

mod signals;
pub use signals::{Signal, SignalChannel};

mod source;
pub use source::EventSource;

mod wait;
pub use wait::{
    BoundedWait, WaitArm, WaitDriver, WaitOutcome, WaitPlan, WaitResolution,
    DEFAULT_WAIT_DEADLINE,
};
