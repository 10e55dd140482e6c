//! Inbound boolean signals that bounded waits listen for.

use std::time::SystemTime;

use navfsm_core::arbiter::Behavior;

/// Where a boolean signal came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SignalChannel {
    /// A behavior's "done" channel.
    Completion(Behavior),
    /// Obstacle detector status.
    ObstacleDetection,
    /// AprilTag detector status.
    ApriltagDetection,
}

impl std::fmt::Display for SignalChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalChannel::Completion(b) => write!(f, "{b}/completed"),
            SignalChannel::ObstacleDetection => f.write_str("obstacle_detection/status"),
            SignalChannel::ApriltagDetection => f.write_str("apriltag_detection/status"),
        }
    }
}

/// One boolean message, optionally stamped by its sender.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Signal {
    pub channel: SignalChannel,
    pub value: bool,
    pub stamp: Option<SystemTime>,
}
