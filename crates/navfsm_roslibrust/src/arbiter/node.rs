use std::sync::Arc;
use std::time::Duration;

use navfsm_core::arbiter::{
    ActivationGate, ArbiterOutputs, Behavior, Event, Snapshot, State, StateChange,
    StateMachine, TransitionTable, ALL_BEHAVIORS,
};
use navfsm_core::error::Result;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{BoundedWait, EventSource, Signal, StateHeartbeat, WaitDriver, WaitPlan};
use crate::error::node_gone;

/// Work items for the machine's single worker task.
#[derive(Debug)]
pub(crate) enum Command {
    Event(Event),
    Tag(String),
    /// Bounded-wait result, applied only if the machine is still at `epoch`.
    AtEpoch { event: Event, epoch: u64 },
    EnableForWait { behavior: Behavior, epoch: u64 },
    /// Heartbeat tick: publish the current state again.
    Republish,
    /// Replies once every earlier command has been applied.
    Barrier(oneshot::Sender<Snapshot>),
}

/// Runtime host for one `StateMachine`.
///
/// Responsibilities:
/// - Own the machine inside a single worker task (the serialized entry point)
/// - Hand out event sources and bounded-wait executors that feed that queue
/// - Publish snapshots (`watch`) and state changes (`broadcast`) to observers
/// - Expose the activation gates for in-process consumers
///
/// Must be spawned from within a tokio runtime.
pub struct ArbiterNode {
    name: String,
    table: Arc<TransitionTable>,
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<Snapshot>,

    // broadcast is used so:
    // - transitions never block on a slow observer
    // - lagging receivers drop old changes rather than stalling the worker
    changes: broadcast::Sender<StateChange>,
    signals: broadcast::Sender<Signal>,

    gates: [Arc<ActivationGate>; ALL_BEHAVIORS.len()],
    worker: JoinHandle<()>,
}

impl ArbiterNode {
    /// Build the machine (validating `table`) and start its worker.
    pub fn spawn(
        name: impl Into<String>,
        table: Arc<TransitionTable>,
        outputs: Arc<dyn ArbiterOutputs>,
    ) -> Result<Self> {
        let name = name.into();
        let machine = StateMachine::new(Arc::clone(&table), outputs)?;
        let gates = ALL_BEHAVIORS.map(|b| machine.activation().gate(b));

        let (commands, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(machine.snapshot());
        let (changes, _changes_rx) = broadcast::channel(64);
        let (signals, _signals_rx) = broadcast::channel(64);

        let worker = tokio::spawn(run_worker(machine, rx, snapshot_tx, changes.clone()));
        info!(node = %name, "arbiter started in state {}", State::Initial);

        Ok(Self {
            name,
            table,
            commands,
            snapshot,
            changes,
            signals,
            gates,
            worker,
        })
    }

    /// Node name (for logging/introspection).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &Arc<TransitionTable> {
        &self.table
    }

    /// Latest published snapshot.
    ///
    /// Commands still queued are not reflected; use `sync()` to wait for them.
    pub fn snapshot(&self) -> Snapshot {
        *self.snapshot.borrow()
    }

    pub fn state(&self) -> State {
        self.snapshot().state
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    pub fn subscribe_state_changes(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Shared gate for `behavior`.
    pub fn activation_gate(&self, behavior: Behavior) -> Arc<ActivationGate> {
        Arc::clone(&self.gates[behavior.index()])
    }

    /// The behavior currently enabled, as seen by the gates.
    pub fn enabled_behavior(&self) -> Option<Behavior> {
        self.gates
            .iter()
            .find(|g| g.is_enabled())
            .map(|g| g.behavior())
    }

    /// A producer handle for event/signal adapters.
    pub fn source(&self) -> EventSource {
        EventSource::new(self.commands.clone(), self.signals.clone())
    }

    /// A bounded-wait executor bound to this node.
    pub fn bounded_wait(&self) -> BoundedWait {
        BoundedWait::new(
            self.commands.clone(),
            self.signals.clone(),
            self.snapshot.clone(),
        )
    }

    /// Start the sequential driver that runs `plans` on state entry.
    pub fn spawn_wait_driver(&self, plans: impl IntoIterator<Item = WaitPlan>) -> JoinHandle<()> {
        let driver = WaitDriver::new(self.bounded_wait(), plans);
        tokio::spawn(driver.run())
    }

    /// Start republishing the current state every `period`.
    pub fn spawn_heartbeat(&self, period: Duration) -> JoinHandle<()> {
        let heartbeat = StateHeartbeat::new(self.commands.downgrade(), period);
        tokio::spawn(async move { heartbeat.run().await })
    }

    /// Wait until every command queued before this call has been applied.
    pub async fn sync(&self) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Barrier(tx))
            .map_err(|_| node_gone("sync"))?;
        rx.await.map_err(|_| node_gone("sync"))
    }

    /// Stop accepting work from this handle and wait for the worker to drain.
    ///
    /// Event sources and executors still alive keep the queue open; the worker
    /// exits once the last of them is dropped.
    pub async fn shutdown(self) {
        let Self {
            name,
            commands,
            worker,
            ..
        } = self;
        drop(commands);
        let _ = worker.await;
        info!(node = %name, "arbiter stopped");
    }
}

async fn run_worker(
    mut machine: StateMachine,
    mut rx: mpsc::UnboundedReceiver<Command>,
    snapshot: watch::Sender<Snapshot>,
    changes: broadcast::Sender<StateChange>,
) {
    while let Some(command) = rx.recv().await {
        let change = match command {
            Command::Event(event) => machine.handle_event(event),
            Command::Tag(tag) => machine.handle_tag(&tag),
            Command::AtEpoch { event, epoch } => machine.handle_event_at(event, epoch),
            Command::EnableForWait { behavior, epoch } => {
                machine.enable_for_wait(behavior, epoch);
                None
            }
            Command::Republish => {
                machine.republish_state();
                None
            }
            Command::Barrier(reply) => {
                let _ = reply.send(machine.snapshot());
                None
            }
        };

        if let Some(change) = change {
            snapshot.send_replace(machine.snapshot());
            // No receivers is fine.
            let _ = changes.send(change);
        }
    }
    debug!("arbiter command queue closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::{ChannelOutputs, OutboundMsg};

    fn node() -> (ArbiterNode, mpsc::UnboundedReceiver<OutboundMsg>) {
        let (outputs, rx) = ChannelOutputs::new();
        let node = ArbiterNode::spawn(
            "test_arbiter",
            Arc::new(TransitionTable::standard()),
            Arc::new(outputs),
        )
        .unwrap();
        (node, rx)
    }

    #[tokio::test]
    async fn starts_in_initial() {
        let (node, _rx) = node();
        assert_eq!(node.name(), "test_arbiter");
        assert_eq!(node.state(), State::Initial);
        assert_eq!(node.enabled_behavior(), None);
    }

    #[tokio::test]
    async fn events_are_applied_in_queue_order() {
        let (node, _rx) = node();
        let source = node.source();

        source.deliver(Event::GoalReached).unwrap();
        source.deliver(Event::GoalGiven).unwrap();
        source.deliver(Event::ApriltagRight).unwrap();

        let snap = node.sync().await.unwrap();
        assert_eq!(snap.state, State::TurningRight);
        assert_eq!(snap.epoch, 3);
        assert_eq!(node.enabled_behavior(), Some(Behavior::Turning));
    }

    #[tokio::test]
    async fn state_change_emitted_on_transition_only() {
        let (node, _rx) = node();
        let mut changes = node.subscribe_state_changes();
        let source = node.source();

        source.deliver(Event::TurningCompleted).unwrap();
        source.deliver(Event::GoalReached).unwrap();
        node.sync().await.unwrap();

        let change = changes.try_recv().expect("expected state change");
        assert_eq!(change.from, State::Initial);
        assert_eq!(change.to, State::Planning);
        assert_eq!(change.event, Event::GoalReached);
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn shutdown_waits_for_worker() {
        let (node, _rx) = node();
        let source = node.source();
        drop(source);
        node.shutdown().await;
    }
}
