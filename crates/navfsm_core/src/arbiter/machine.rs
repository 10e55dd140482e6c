use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::error::{CoreError, Result};

use super::{
    ActivationController, ActivationRecord, ArbiterOutputs, Behavior, Event, State,
    TransitionTable,
};

/// Emitted after every accepted transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StateChange {
    /// Value of the machine's epoch after this transition.
    pub epoch: u64,
    pub from: State,
    pub to: State,
    pub event: Event,
}

/// Current state plus the number of transitions accepted so far.
///
/// Two snapshots with the same state but different epochs mean the state was
/// left and re-entered in between.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Snapshot {
    pub state: State,
    pub epoch: u64,
}

/// Owns the current state and the activation record.
///
/// Not synchronized by itself: callers serialize access (the runtime crate
/// gives it to a single worker task). Every mutating call either fully
/// commits (state, activation, publish) or changes nothing.
pub struct StateMachine {
    table: Arc<TransitionTable>,
    state: State,
    epoch: u64,
    activation: ActivationController,
    outputs: Arc<dyn ArbiterOutputs>,
}

impl StateMachine {
    /// Build a machine in `Initial` and perform the initial activation.
    ///
    /// Fails when `table` breaks the fallback rules checked by
    /// `TransitionTable::validate`; nothing is published in that case.
    pub fn new(table: Arc<TransitionTable>, outputs: Arc<dyn ArbiterOutputs>) -> Result<Self> {
        table.validate()?;

        let mut machine = Self {
            table,
            state: State::Initial,
            epoch: 0,
            activation: ActivationController::new(Arc::clone(&outputs)),
            outputs,
        };
        machine.activation.activate(State::Initial);
        machine.outputs.publish_state(State::Initial);
        Ok(machine)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            epoch: self.epoch,
        }
    }

    pub fn activation(&self) -> &ActivationRecord {
        self.activation.record()
    }

    pub fn table(&self) -> &Arc<TransitionTable> {
        &self.table
    }

    /// Publish the current state again without changing anything.
    pub fn republish_state(&self) {
        self.outputs.publish_state(self.state);
    }

    /// Apply one event. Returns the change when the state moved.
    pub fn handle_event(&mut self, event: Event) -> Option<StateChange> {
        let from = self.state;
        let to = self.table.next(from, event);
        if to == from {
            trace!(state = %from, event = %event, "event ignored in current state");
            return None;
        }

        self.state = to;
        self.epoch += 1;
        self.activation.activate(to);
        self.outputs.publish_state(to);

        info!(from = %from, to = %to, event = %event, epoch = self.epoch, "state transition");
        Some(StateChange {
            epoch: self.epoch,
            from,
            to,
            event,
        })
    }

    /// Apply a raw event tag; unrecognized tags are dropped.
    pub fn handle_tag(&mut self, tag: &str) -> Option<StateChange> {
        match Event::from_tag(tag) {
            Some(event) => self.handle_event(event),
            None => {
                let err = CoreError::unknown_event(tag);
                trace!(state = %self.state, "{err}");
                None
            }
        }
    }

    /// Apply `event` only if no transition happened since `epoch`.
    ///
    /// Used by bounded waits so a late completion cannot act on a state the
    /// machine already left.
    pub fn handle_event_at(&mut self, event: Event, epoch: u64) -> Option<StateChange> {
        if epoch != self.epoch {
            debug!(
                event = %event,
                waited_epoch = epoch,
                epoch = self.epoch,
                "discarding stale wait result"
            );
            return None;
        }
        self.handle_event(event)
    }

    /// Enable a wait's behavior, provided the machine is still at `epoch`.
    pub fn enable_for_wait(&mut self, behavior: Behavior, epoch: u64) -> bool {
        if epoch != self.epoch {
            debug!(behavior = %behavior, "discarding stale enable request");
            return false;
        }
        self.activation.enable(behavior)
    }
}
