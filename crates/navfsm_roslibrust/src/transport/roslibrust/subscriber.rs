use std::time::SystemTime;

use navfsm_core::arbiter::ALL_BEHAVIORS;
use roslibrust::rosbridge::ClientHandle;
use tokio::task::JoinHandle;
use tracing::debug;

use super::FlagMessage;
use crate::arbiter::{EventSource, SignalChannel};
use crate::topics::Topics;

/// String message carrying an event tag (e.g. `std_msgs/String`).
pub trait TagMessage: roslibrust::RosMessageType + Send + Sync + 'static {
    fn tag(&self) -> &str;
}

/// Optional header stamp of a boolean message.
pub trait Stamped {
    fn stamp(&self) -> Option<SystemTime> {
        None
    }
}

/// Subscribe every inbound topic and forward into `source`.
///
/// Each subscription runs in its own task and stops once the arbiter is gone.
pub async fn spawn_subscribers<T, F>(
    ros: &ClientHandle,
    topics: &Topics,
    source: EventSource,
) -> roslibrust::Result<Vec<JoinHandle<()>>>
where
    T: TagMessage,
    F: FlagMessage + Stamped,
{
    let mut handles = Vec::new();

    let sub = ros.subscribe::<T>(&topics.event).await?;
    let src = source.clone();
    handles.push(tokio::spawn(async move {
        loop {
            let msg = sub.next().await;
            if src.deliver_tag(msg.tag()).is_err() {
                break;
            }
        }
    }));

    let sub = ros.subscribe::<T>(&topics.obstacle_detection).await?;
    let src = source.clone();
    handles.push(tokio::spawn(async move {
        loop {
            let msg = sub.next().await;
            if src.obstacle_detection(msg.tag()).is_err() {
                break;
            }
        }
    }));

    let sub = ros.subscribe::<T>(&topics.apriltag_detection).await?;
    let src = source.clone();
    handles.push(tokio::spawn(async move {
        loop {
            let msg = sub.next().await;
            if src.apriltag_detection(msg.tag()).is_err() {
                break;
            }
        }
    }));

    for behavior in ALL_BEHAVIORS {
        let sub = ros.subscribe::<F>(topics.completed(behavior)).await?;
        let src = source.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let msg = sub.next().await;
                if src.completion(behavior, msg.flag(), msg.stamp()).is_err() {
                    break;
                }
            }
        }));
    }

    for channel in [SignalChannel::ObstacleDetection, SignalChannel::ApriltagDetection] {
        let sub = ros.subscribe::<F>(topics.signal(channel)).await?;
        let src = source.clone();
        handles.push(tokio::spawn(async move {
            while !src.is_closed() {
                let msg = sub.next().await;
                src.detector_status(channel, msg.flag(), msg.stamp());
            }
        }));
    }

    debug!(count = handles.len(), "rosbridge subscribers running");
    Ok(handles)
}
