use std::time::SystemTime;

use navfsm_core::arbiter::{Behavior, Event};
use navfsm_core::error::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::trace;

use super::node::Command;
use super::{Signal, SignalChannel};
use crate::error::node_gone;

/// Producer handle given to event adapters (subscribers, consoles, tests).
///
/// Cheap to clone; every clone feeds the same serialized queue, so events from
/// all sources are applied in the order they are accepted here.
#[derive(Clone)]
pub struct EventSource {
    commands: mpsc::UnboundedSender<Command>,
    signals: broadcast::Sender<Signal>,
}

impl EventSource {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        signals: broadcast::Sender<Signal>,
    ) -> Self {
        Self { commands, signals }
    }

    /// Deliver an already-normalized event.
    pub fn deliver(&self, event: Event) -> Result<()> {
        self.send(Command::Event(event))
    }

    /// Deliver a raw tag from the general event channel.
    ///
    /// Unknown tags are still queued so the machine can drop them in order.
    pub fn deliver_tag(&self, tag: &str) -> Result<()> {
        self.send(Command::Tag(tag.to_string()))
    }

    /// Raw obstacle detector message (`obstacle_detected`).
    pub fn obstacle_detection(&self, raw: &str) -> Result<()> {
        match Event::from_obstacle_detection(raw) {
            Some(event) => self.deliver(event),
            None => {
                trace!(raw, "obstacle message ignored");
                Ok(())
            }
        }
    }

    /// Raw AprilTag detector message (`AprilTag_right|left|u`).
    pub fn apriltag_detection(&self, raw: &str) -> Result<()> {
        match Event::from_apriltag_detection(raw) {
            Some(event) => self.deliver(event),
            None => {
                trace!(raw, "apriltag message ignored");
                Ok(())
            }
        }
    }

    /// Boolean "done" message from a behavior.
    ///
    /// Wakes any bounded wait on that channel and, when `done`, also delivers
    /// the matching completion event.
    pub fn completion(&self, behavior: Behavior, done: bool, stamp: Option<SystemTime>) -> Result<()> {
        self.signal(SignalChannel::Completion(behavior), done, stamp);
        match Event::from_completion(behavior, done) {
            Some(event) => self.deliver(event),
            None => Ok(()),
        }
    }

    /// Boolean detector status, consumed only by bounded waits.
    pub fn detector_status(&self, channel: SignalChannel, value: bool, stamp: Option<SystemTime>) {
        self.signal(channel, value, stamp);
    }

    /// True once the arbiter worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn signal(&self, channel: SignalChannel, value: bool, stamp: Option<SystemTime>) {
        // No waiter listening is the normal case.
        let _ = self.signals.send(Signal {
            channel,
            value,
            stamp,
        });
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| node_gone("event source"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_signals_and_delivers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (signals, mut signals_rx) = broadcast::channel(4);
        let source = EventSource::new(tx, signals);

        source.completion(Behavior::Turning, true, None).unwrap();

        let sig = signals_rx.try_recv().unwrap();
        assert_eq!(sig.channel, SignalChannel::Completion(Behavior::Turning));
        assert!(sig.value);
        assert!(matches!(
            rx.try_recv().unwrap(),
            Command::Event(Event::TurningCompleted)
        ));
    }

    #[test]
    fn false_completion_only_signals() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (signals, mut signals_rx) = broadcast::channel(4);
        let source = EventSource::new(tx, signals);

        source.completion(Behavior::ObstacleAvoidance, false, None).unwrap();

        assert!(!signals_rx.try_recv().unwrap().value);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unrecognized_detector_strings_are_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (signals, _) = broadcast::channel(4);
        let source = EventSource::new(tx, signals);

        source.obstacle_detection("nothing").unwrap();
        source.apriltag_detection("AprilTag_goal").unwrap();
        assert!(rx.try_recv().is_err());

        source.apriltag_detection("AprilTag_left").unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            Command::Event(Event::ApriltagLeft)
        ));
    }

    #[test]
    fn closed_queue_is_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (signals, _) = broadcast::channel(4);
        let source = EventSource::new(tx, signals);
        drop(rx);

        assert!(source.deliver(Event::GoalGiven).is_err());
    }
}
