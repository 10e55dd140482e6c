use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::node::Command;

/// Publish rate of the current-state broadcast when nothing changes.
pub const DEFAULT_HEARTBEAT_PERIOD: Duration = Duration::from_millis(100);

/// Periodic republisher of the current state.
///
/// Each tick is queued behind pending events, so a republish always carries
/// the state the worker holds at that point and never trails a newer
/// transition. Holds only a weak handle: the heartbeat does not keep the
/// node's queue open.
pub struct StateHeartbeat {
    commands: mpsc::WeakUnboundedSender<Command>,
    period: Duration,
}

impl StateHeartbeat {
    pub(crate) fn new(commands: mpsc::WeakUnboundedSender<Command>, period: Duration) -> Self {
        Self { commands, period }
    }

    /// Period for a rate in Hz; a zero rate falls back to the default.
    pub fn period_for_hz(hz: u32) -> Duration {
        if hz == 0 {
            DEFAULT_HEARTBEAT_PERIOD
        } else {
            Duration::from_nanos(1_000_000_000 / u64::from(hz))
        }
    }

    /// Tick until the node is gone.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let sent = self
                .commands
                .upgrade()
                .is_some_and(|commands| commands.send(Command::Republish).is_ok());
            if !sent {
                debug!("heartbeat stopping, node gone");
                return;
            }
        }
    }
}
