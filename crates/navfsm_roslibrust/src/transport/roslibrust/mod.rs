//! rosbridge adapters
//!
//! Wires roslibrust publishers/subscribers to the arbiter.
//! It contains **no ROS message types**, only transport glue; callers supply
//! message types through the traits below.

mod publisher;
mod subscriber;

pub use publisher::{FlagMessage, RosbridgeOutputs, StateMessage, WheelsMessage};
pub use subscriber::{spawn_subscribers, Stamped, TagMessage};
