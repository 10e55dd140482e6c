//! Channel names used by the transport adapters.

use navfsm_core::arbiter::{Behavior, ALL_BEHAVIORS};

use crate::arbiter::{OutboundMsg, SignalChannel};

pub const DEFAULT_VEHICLE: &str = "pebbles";

pub const TOPIC_CURRENT_STATE: &str = "/current_state";
pub const TOPIC_EVENT: &str = "/event";
pub const TOPIC_OBSTACLE_DETECTION: &str = "/obstacle_detection";
pub const TOPIC_APRILTAG_DETECTION: &str = "/april_tag_detection";

/// Fully resolved channel names for one vehicle.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Topics {
    pub current_state: String,
    pub event: String,
    pub obstacle_detection: String,
    pub apriltag_detection: String,
    pub obstacle_status: String,
    pub apriltag_status: String,
    pub wheels_cmd: String,
    pub joystick_override: String,
    enable: [String; ALL_BEHAVIORS.len()],
    completed: [String; ALL_BEHAVIORS.len()],
}

impl Topics {
    /// Behavior channels are global; detector status and actuation live under
    /// the vehicle namespace.
    pub fn for_vehicle(vehicle: &str) -> Self {
        Self {
            current_state: TOPIC_CURRENT_STATE.to_string(),
            event: TOPIC_EVENT.to_string(),
            obstacle_detection: TOPIC_OBSTACLE_DETECTION.to_string(),
            apriltag_detection: TOPIC_APRILTAG_DETECTION.to_string(),
            obstacle_status: format!("/{vehicle}/obstacle_detection/status"),
            apriltag_status: format!("/{vehicle}/apriltag_detection/status"),
            wheels_cmd: format!("/{vehicle}/wheels_driver_node/wheels_cmd"),
            joystick_override: format!("/{vehicle}/joy_mapper_node/joystick_override"),
            enable: ALL_BEHAVIORS.map(|b| format!("/{}/enable", b.label())),
            completed: ALL_BEHAVIORS.map(|b| format!("/{}/completed", b.label())),
        }
    }

    pub fn enable(&self, behavior: Behavior) -> &str {
        &self.enable[behavior.index()]
    }

    pub fn completed(&self, behavior: Behavior) -> &str {
        &self.completed[behavior.index()]
    }

    /// Where a boolean signal channel is received from.
    pub fn signal(&self, channel: SignalChannel) -> &str {
        match channel {
            SignalChannel::Completion(b) => self.completed(b),
            SignalChannel::ObstacleDetection => &self.obstacle_status,
            SignalChannel::ApriltagDetection => &self.apriltag_status,
        }
    }

    /// Where an outbound message is published.
    pub fn outbound(&self, msg: &OutboundMsg) -> &str {
        match msg {
            OutboundMsg::CurrentState(_) => &self.current_state,
            OutboundMsg::Enable { behavior, .. } => self.enable(*behavior),
            OutboundMsg::JoystickOverride(_) => &self.joystick_override,
            OutboundMsg::WheelsCmd { .. } => &self.wheels_cmd,
        }
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self::for_vehicle(DEFAULT_VEHICLE)
    }
}
