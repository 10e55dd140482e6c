use std::collections::HashMap;
use std::time::Duration;

use navfsm_core::arbiter::{Behavior, Event, Snapshot, State};
use navfsm_core::error::Result;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info};

use super::node::Command;
use super::{Signal, SignalChannel};
use crate::error::{log_core_error, node_gone};

/// Deadline used when none is configured. Long enough to only catch a
/// collaborator that is gone.
pub const DEFAULT_WAIT_DEADLINE: Duration = Duration::from_secs(1000);

/// One signal a wait listens for, and the event fed back when it fires.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WaitArm {
    pub channel: SignalChannel,
    pub on_signal: Event,
}

/// What a state waits for after it is entered.
///
/// All arms race each other and the deadline; the first `true` signal on any
/// arm's channel decides the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitPlan {
    pub state: State,
    pub arms: Vec<WaitArm>,
    /// Behavior to enable on entry, if the state does not enable it itself.
    pub enable: Option<Behavior>,
    pub deadline: Duration,
}

impl WaitPlan {
    pub fn new(state: State, channel: SignalChannel, on_signal: Event, deadline: Duration) -> Self {
        Self {
            state,
            arms: vec![WaitArm { channel, on_signal }],
            enable: None,
            deadline,
        }
    }

    /// Also resolve on `channel`, feeding `on_signal`.
    pub fn or_on(mut self, channel: SignalChannel, on_signal: Event) -> Self {
        self.arms.push(WaitArm { channel, on_signal });
        self
    }

    pub fn enabling(mut self, behavior: Behavior) -> Self {
        self.enable = Some(behavior);
        self
    }

    /// The per-state executors of the sequential mode.
    ///
    /// LANE_FOLLOWING watches both detectors. An AprilTag status only says a
    /// tag was reached, so it reports `LaneFollowingCompleted`; the turn
    /// itself comes from the raw AprilTag message.
    pub fn defaults(deadline: Duration) -> Vec<WaitPlan> {
        let turning = SignalChannel::Completion(Behavior::Turning);
        vec![
            WaitPlan::new(
                State::Planning,
                SignalChannel::Completion(Behavior::Planning),
                Event::TrajectoryPlanned,
                deadline,
            )
            .enabling(Behavior::Planning),
            WaitPlan::new(
                State::LaneFollowing,
                SignalChannel::ObstacleDetection,
                Event::ObstacleObserved,
                deadline,
            )
            .or_on(SignalChannel::ApriltagDetection, Event::LaneFollowingCompleted),
            WaitPlan::new(
                State::ObstacleAvoidance,
                SignalChannel::Completion(Behavior::ObstacleAvoidance),
                Event::ObstacleAvoidanceCompleted,
                deadline,
            ),
            WaitPlan::new(State::TurningRight, turning, Event::TurningCompleted, deadline),
            WaitPlan::new(State::TurningLeft, turning, Event::TurningCompleted, deadline),
            WaitPlan::new(State::TurningU, turning, Event::TurningCompleted, deadline),
        ]
    }
}

/// Result of one bounded wait.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WaitOutcome {
    Signal(Event),
    TimedOut,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WaitResolution {
    /// The outcome was fed back into the machine's queue.
    Delivered(WaitOutcome),
    /// The machine was not in (or left) the plan's state; nothing was fed back.
    Cancelled,
}

/// Suspends until a completion signal or a deadline, then feeds the result
/// back through the node's queue.
///
/// Never touches the machine directly, so a wait can never block the worker
/// that applies asynchronous events.
#[derive(Clone)]
pub struct BoundedWait {
    commands: mpsc::UnboundedSender<Command>,
    signals: broadcast::Sender<Signal>,
    snapshot: watch::Receiver<Snapshot>,
}

impl BoundedWait {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        signals: broadcast::Sender<Signal>,
        snapshot: watch::Receiver<Snapshot>,
    ) -> Self {
        Self {
            commands,
            signals,
            snapshot,
        }
    }

    /// Run `plan` against the machine's current state.
    pub async fn run(&self, plan: &WaitPlan) -> Result<WaitResolution> {
        let mut snapshot = self.snapshot.clone();
        let entered = *snapshot.borrow_and_update();
        if entered.state != plan.state {
            debug!(state = %entered.state, plan = %plan.state, "wait skipped, not in plan state");
            return Ok(WaitResolution::Cancelled);
        }

        // Subscribe before enabling so a fast completion cannot be missed.
        let mut signals = self.signals.subscribe();
        if let Some(behavior) = plan.enable {
            self.send(Command::EnableForWait {
                behavior,
                epoch: entered.epoch,
            })?;
        }

        debug!(state = %plan.state, arms = ?plan.arms, deadline = ?plan.deadline, "waiting");
        let outcome = tokio::select! {
            biased;
            _ = left_epoch(&mut snapshot, entered.epoch) => {
                debug!(state = %plan.state, "wait cancelled, state left");
                return Ok(WaitResolution::Cancelled);
            }
            res = tokio::time::timeout(plan.deadline, next_true(&mut signals, &plan.arms)) => {
                match res {
                    Ok(event) => WaitOutcome::Signal(event),
                    Err(_) => WaitOutcome::TimedOut,
                }
            }
        };

        // The state may have moved while this task was waking up.
        if self.snapshot.borrow().epoch != entered.epoch {
            debug!(state = %plan.state, ?outcome, "wait result discarded, state left");
            return Ok(WaitResolution::Cancelled);
        }

        let event = match outcome {
            WaitOutcome::Signal(event) => event,
            WaitOutcome::TimedOut => {
                info!(
                    state = %plan.state,
                    arms = ?plan.arms,
                    deadline = ?plan.deadline,
                    "no signal before deadline, applying timeout fallback"
                );
                Event::Timeout
            }
        };
        self.send(Command::AtEpoch {
            event,
            epoch: entered.epoch,
        })?;
        Ok(WaitResolution::Delivered(outcome))
    }

    pub(crate) fn watch_snapshot(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| node_gone("bounded wait"))
    }
}

/// Resolves once the machine's epoch differs from `epoch`.
async fn left_epoch(snapshot: &mut watch::Receiver<Snapshot>, epoch: u64) {
    loop {
        if snapshot.borrow_and_update().epoch != epoch {
            return;
        }
        if snapshot.changed().await.is_err() {
            // Node gone: nothing will move the epoch any more.
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves on the first `true` signal on any arm's channel, with that arm's
/// event.
///
/// A closed signal bus never resolves, so the deadline decides.
async fn next_true(signals: &mut broadcast::Receiver<Signal>, arms: &[WaitArm]) -> Event {
    loop {
        match signals.recv().await {
            Ok(signal) if signal.value => {
                if let Some(arm) = arms.iter().find(|a| a.channel == signal.channel) {
                    return arm.on_signal;
                }
            }
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "signal receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

/// Sequential mode: runs the plan of every newly entered state, once per entry.
pub struct WaitDriver {
    executor: BoundedWait,
    plans: HashMap<State, WaitPlan>,
}

impl WaitDriver {
    /// Later plans replace earlier ones for the same state.
    pub fn new(executor: BoundedWait, plans: impl IntoIterator<Item = WaitPlan>) -> Self {
        let plans = plans.into_iter().map(|p| (p.state, p)).collect();
        Self { executor, plans }
    }

    pub async fn run(self) {
        let mut snapshot = self.executor.watch_snapshot();
        let mut handled: Option<u64> = None;

        loop {
            let current = *snapshot.borrow_and_update();
            if handled != Some(current.epoch) {
                handled = Some(current.epoch);
                if let Some(plan) = self.plans.get(&current.state) {
                    if let Err(err) = self.executor.run(plan).await {
                        log_core_error(err);
                        return;
                    }
                    continue;
                }
            }
            if snapshot.changed().await.is_err() {
                debug!("wait driver stopping, node gone");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_behavior_state() {
        let plans = WaitPlan::defaults(DEFAULT_WAIT_DEADLINE);
        for state in [
            State::Planning,
            State::LaneFollowing,
            State::ObstacleAvoidance,
            State::TurningRight,
            State::TurningLeft,
            State::TurningU,
        ] {
            assert!(plans.iter().any(|p| p.state == state), "no plan for {state}");
        }
        assert!(plans.iter().all(|p| p.deadline == DEFAULT_WAIT_DEADLINE));

        let planning = plans.iter().find(|p| p.state == State::Planning).unwrap();
        assert_eq!(planning.enable, Some(Behavior::Planning));

        let lane = plans.iter().find(|p| p.state == State::LaneFollowing).unwrap();
        let channels: Vec<_> = lane.arms.iter().map(|a| a.channel).collect();
        assert_eq!(
            channels,
            vec![SignalChannel::ObstacleDetection, SignalChannel::ApriltagDetection]
        );
    }

    #[test]
    fn driver_keeps_last_plan_per_state() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (signals, _) = broadcast::channel(4);
        let (_snap_tx, snap_rx) = watch::channel(Snapshot {
            state: State::Initial,
            epoch: 0,
        });
        let executor = BoundedWait::new(tx, signals, snap_rx);

        let short = Duration::from_millis(5);
        let driver = WaitDriver::new(
            executor,
            [
                WaitPlan::new(
                    State::TurningU,
                    SignalChannel::Completion(Behavior::Turning),
                    Event::TurningCompleted,
                    DEFAULT_WAIT_DEADLINE,
                ),
                WaitPlan::new(
                    State::TurningU,
                    SignalChannel::Completion(Behavior::Turning),
                    Event::TurningCompleted,
                    short,
                ),
            ],
        );
        assert_eq!(driver.plans.len(), 1);
        assert_eq!(driver.plans[&State::TurningU].deadline, short);
    }

    #[tokio::test]
    async fn first_true_signal_on_any_arm_wins() {
        let (tx, mut rx) = broadcast::channel(8);
        let arms = [
            WaitArm {
                channel: SignalChannel::ObstacleDetection,
                on_signal: Event::ObstacleObserved,
            },
            WaitArm {
                channel: SignalChannel::ApriltagDetection,
                on_signal: Event::LaneFollowingCompleted,
            },
        ];
        let signal = |channel, value| Signal {
            channel,
            value,
            stamp: None,
        };
        tx.send(signal(SignalChannel::ObstacleDetection, false)).unwrap();
        tx.send(signal(SignalChannel::Completion(Behavior::Turning), true)).unwrap();
        tx.send(signal(SignalChannel::ApriltagDetection, true)).unwrap();

        assert_eq!(next_true(&mut rx, &arms).await, Event::LaneFollowingCompleted);
    }
}
