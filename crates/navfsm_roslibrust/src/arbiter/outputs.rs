use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use navfsm_core::arbiter::{ArbiterOutputs, Behavior, State};
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{log_core_error, publish_failed};

/// Transport-agnostic outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMsg {
    CurrentState(State),
    Enable { behavior: Behavior, enabled: bool },
    JoystickOverride(bool),
    WheelsCmd { vel_left: f32, vel_right: f32 },
}

impl OutboundMsg {
    /// Short name of the outbound channel, for logs.
    pub fn channel(&self) -> &'static str {
        match self {
            OutboundMsg::CurrentState(_) => "current_state",
            OutboundMsg::Enable { behavior, .. } => match behavior {
                Behavior::LaneFollowing => "lane_following/enable",
                Behavior::ObstacleAvoidance => "obstacle_avoidance/enable",
                Behavior::Turning => "turning/enable",
                Behavior::Planning => "planning/enable",
            },
            OutboundMsg::JoystickOverride(_) => "joystick_override",
            OutboundMsg::WheelsCmd { .. } => "wheels_cmd",
        }
    }
}

/// `ArbiterOutputs` that queues every message for an async publisher.
///
/// Queuing keeps the machine's critical section free of transport I/O; the
/// receiving half is drained by `run_output_pump`.
#[derive(Clone)]
pub struct ChannelOutputs {
    tx: mpsc::UnboundedSender<OutboundMsg>,
}

impl ChannelOutputs {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn push(&self, msg: OutboundMsg) {
        if self.tx.send(msg).is_err() {
            trace!("outbound queue closed, message dropped");
        }
    }
}

impl ArbiterOutputs for ChannelOutputs {
    fn set_enabled(&self, behavior: Behavior, enabled: bool) {
        self.push(OutboundMsg::Enable { behavior, enabled });
    }

    fn publish_state(&self, state: State) {
        self.push(OutboundMsg::CurrentState(state));
    }

    fn emergency_stop(&self) {
        self.push(OutboundMsg::JoystickOverride(true));
        self.push(OutboundMsg::WheelsCmd {
            vel_left: 0.0,
            vel_right: 0.0,
        });
    }
}

/// Minimal async publish capability.
///
/// Small enough to unit test the pump without a transport, and to adapt
/// rosbridge publishers in the transport layer.
pub trait PublishLike<T>: Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;

    fn publish<'a>(
        &'a self,
        msg: &'a T,
    ) -> Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send + 'a>>;
}

/// Drain queued outbound messages into `publisher`, in order.
///
/// Publish failures are logged and skipped; the pump only stops when every
/// `ChannelOutputs` clone is gone.
pub async fn run_output_pump<P>(mut rx: mpsc::UnboundedReceiver<OutboundMsg>, publisher: Arc<P>)
where
    P: PublishLike<OutboundMsg>,
{
    while let Some(msg) = rx.recv().await {
        if let Err(err) = publisher.publish(&msg).await {
            log_core_error(publish_failed(msg.channel(), err));
        }
    }
}
