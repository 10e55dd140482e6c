use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use navfsm_core::arbiter::{Behavior, ALL_BEHAVIORS};
use roslibrust::rosbridge::{ClientHandle, Publisher};

use crate::arbiter::{OutboundMsg, PublishLike};
use crate::topics::Topics;

/// Downstream provides the concrete message types.
/// This keeps navfsm_* crates independent of generated ROS messages.
pub trait StateMessage: roslibrust::RosMessageType + Send + Sync + 'static {
    fn from_label(label: &str) -> Self;
}

/// Boolean message (e.g. `std_msgs/Bool` or a stamped variant).
pub trait FlagMessage: roslibrust::RosMessageType + Send + Sync + 'static {
    fn from_flag(value: bool) -> Self;
    fn flag(&self) -> bool;
}

/// Wheel velocity command (e.g. `duckietown_msgs/WheelsCmdStamped`).
pub trait WheelsMessage: roslibrust::RosMessageType + Send + Sync + 'static {
    fn from_velocities(vel_left: f32, vel_right: f32) -> Self;
}

/// All outbound rosbridge publishers of one arbiter.
pub struct RosbridgeOutputs<S, F, W>
where
    S: StateMessage,
    F: FlagMessage,
    W: WheelsMessage,
{
    current_state: Publisher<S>,
    enable: Vec<Publisher<F>>,
    joystick_override: Publisher<F>,
    wheels_cmd: Publisher<W>,
}

impl<S, F, W> RosbridgeOutputs<S, F, W>
where
    S: StateMessage,
    F: FlagMessage,
    W: WheelsMessage,
{
    /// Advertise every outbound topic.
    pub async fn advertise(ros: &ClientHandle, topics: &Topics) -> roslibrust::Result<Arc<Self>> {
        let current_state = ros.advertise::<S>(&topics.current_state).await?;
        let mut enable = Vec::with_capacity(ALL_BEHAVIORS.len());
        for behavior in ALL_BEHAVIORS {
            enable.push(ros.advertise::<F>(topics.enable(behavior)).await?);
        }
        let joystick_override = ros.advertise::<F>(&topics.joystick_override).await?;
        let wheels_cmd = ros.advertise::<W>(&topics.wheels_cmd).await?;

        Ok(Arc::new(Self {
            current_state,
            enable,
            joystick_override,
            wheels_cmd,
        }))
    }

    fn enable_publisher(&self, behavior: Behavior) -> &Publisher<F> {
        &self.enable[behavior.index()]
    }
}

impl<S, F, W> PublishLike<OutboundMsg> for RosbridgeOutputs<S, F, W>
where
    S: StateMessage,
    F: FlagMessage,
    W: WheelsMessage,
{
    type Error = roslibrust::Error;

    fn publish<'a>(
        &'a self,
        msg: &'a OutboundMsg,
    ) -> Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send + 'a>> {
        Box::pin(async move {
            match msg {
                OutboundMsg::CurrentState(state) => {
                    self.current_state.publish(&S::from_label(state.label())).await
                }
                OutboundMsg::Enable { behavior, enabled } => {
                    self.enable_publisher(*behavior)
                        .publish(&F::from_flag(*enabled))
                        .await
                }
                OutboundMsg::JoystickOverride(value) => {
                    self.joystick_override.publish(&F::from_flag(*value)).await
                }
                OutboundMsg::WheelsCmd {
                    vel_left,
                    vel_right,
                } => {
                    self.wheels_cmd
                        .publish(&W::from_velocities(*vel_left, *vel_right))
                        .await
                }
            }
        })
    }
}
