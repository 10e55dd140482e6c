use crate::error::{CoreError, Domain, ErrorKind, Payload, Result};

use super::{Event, State, ALL_STATES};

/// Static transition rules for every event except `Timeout`.
///
/// Total over `State x Event`: any pair not listed is a self-loop.
/// `Timeout` is always a self-loop here; `TransitionTable::next` resolves it
/// through the per-state fallback map.
pub fn next(state: State, event: Event) -> State {
    use Event::*;
    use State::*;

    match (state, event) {
        (Initial, GoalReached) => Planning,

        (Planning, GoalGiven | TrajectoryPlanned) => LaneFollowing,

        (LaneFollowing, ObstacleObserved) => ObstacleAvoidance,
        (LaneFollowing, ApriltagRight) => TurningRight,
        (LaneFollowing, ApriltagLeft) => TurningLeft,
        (LaneFollowing, ApriltagU) => TurningU,

        (ObstacleAvoidance, ObstacleAvoidanceCompleted) => LaneFollowing,

        (TurningRight | TurningLeft | TurningU, TurningCompleted) => LaneFollowing,

        (Stopped, Resume) => LaneFollowing,
        (s, StopRequested) if s != Stopped => Stopped,

        (s, _) => s,
    }
}

/// The immutable transition configuration shared by the machine and its waiters.
///
/// Holds the static rules plus one `Timeout` fallback per state. Outside this
/// module it is built through `standard()` or the validating builder.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionTable {
    pub(super) fallbacks: [State; ALL_STATES.len()],
}

impl TransitionTable {
    /// Default fallbacks: a stalled plan or turn counts as done, everything
    /// else stays put.
    pub fn standard() -> Self {
        let mut fallbacks = ALL_STATES;
        fallbacks[State::Planning.index()] = State::LaneFollowing;
        fallbacks[State::TurningRight.index()] = State::LaneFollowing;
        fallbacks[State::TurningLeft.index()] = State::LaneFollowing;
        fallbacks[State::TurningU.index()] = State::LaneFollowing;
        Self { fallbacks }
    }

    pub fn builder() -> TransitionTableBuilder {
        TransitionTableBuilder::default()
    }

    /// Next state for `event` received while in `state`.
    pub fn next(&self, state: State, event: Event) -> State {
        match event {
            Event::Timeout => self.fallback_for(state),
            _ => next(state, event),
        }
    }

    /// Where a timed-out wait in `state` leads.
    pub fn fallback_for(&self, state: State) -> State {
        self.fallbacks[state.index()]
    }

    /// Check the fallback map against the machine's structural rules:
    /// - `Stopped` is left only by `Resume`, so its fallback is itself
    /// - `Initial` is never re-entered, so no other state falls back to it
    pub fn validate(&self) -> Result<()> {
        for state in ALL_STATES {
            let goal = self.fallback_for(state);
            let reason = match (state, goal) {
                (State::Stopped, g) if g != State::Stopped => "timeout must not leave stopped",
                (s, State::Initial) if s != State::Initial => {
                    "timeout must not re-enter initial"
                }
                _ => continue,
            };
            return Err(CoreError::fatal()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidConfiguration)
                .msgf(format_args!("{reason} (fallback {state} -> {goal})"))
                .payload(Payload::Transition {
                    from_state: state.id(),
                    via_event: Event::Timeout.id(),
                })
                .build());
        }
        Ok(())
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for a custom fallback map. Every state must be given exactly one
/// fallback; `build()` refuses anything else.
#[derive(Debug, Clone, Default)]
pub struct TransitionTableBuilder {
    fallbacks: [Option<State>; ALL_STATES.len()],
    conflict: Option<State>,
}

impl TransitionTableBuilder {
    pub fn fallback(mut self, state: State, target: State) -> Self {
        let slot = &mut self.fallbacks[state.index()];
        if slot.is_some_and(|existing| existing != target) {
            self.conflict.get_or_insert(state);
        } else {
            *slot = Some(target);
        }
        self
    }

    /// Give every state not yet configured a self-loop fallback.
    pub fn remaining_stay(mut self) -> Self {
        for state in ALL_STATES {
            self.fallbacks[state.index()].get_or_insert(state);
        }
        self
    }

    pub fn build(self) -> Result<TransitionTable> {
        if let Some(state) = self.conflict {
            return Err(CoreError::fatal()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidConfiguration)
                .msgf(format_args!(
                    "conflicting timeout fallbacks for state {state}"
                ))
                .payload(Payload::Code(state.id() as u32))
                .build());
        }

        let mut fallbacks = ALL_STATES;
        for state in ALL_STATES {
            fallbacks[state.index()] = self.fallbacks[state.index()]
                .ok_or_else(|| CoreError::incomplete_table(state.label()))?;
        }

        let table = TransitionTable { fallbacks };
        table.validate()?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::ALL_EVENTS;
    use crate::error::Severity;

    #[test]
    fn unsolicited_events_are_self_loops() {
        assert_eq!(next(State::Initial, Event::GoalGiven), State::Initial);
        assert_eq!(
            next(State::ObstacleAvoidance, Event::ObstacleObserved),
            State::ObstacleAvoidance
        );
        assert_eq!(next(State::TurningU, Event::ApriltagLeft), State::TurningU);
        assert_eq!(next(State::Stopped, Event::GoalGiven), State::Stopped);
    }

    #[test]
    fn stopped_only_leaves_on_resume() {
        for event in ALL_EVENTS {
            let goal = next(State::Stopped, event);
            if event == Event::Resume {
                assert_eq!(goal, State::LaneFollowing);
            } else {
                assert_eq!(goal, State::Stopped, "{event} left Stopped");
            }
        }
    }

    #[test]
    fn resume_outside_stopped_is_ignored() {
        assert_eq!(next(State::LaneFollowing, Event::Resume), State::LaneFollowing);
    }

    #[test]
    fn standard_fallbacks() {
        let table = TransitionTable::standard();
        assert_eq!(table.next(State::TurningLeft, Event::Timeout), State::LaneFollowing);
        assert_eq!(table.next(State::Planning, Event::Timeout), State::LaneFollowing);
        assert_eq!(
            table.next(State::LaneFollowing, Event::Timeout),
            State::LaneFollowing
        );
        assert_eq!(
            table.next(State::ObstacleAvoidance, Event::Timeout),
            State::ObstacleAvoidance
        );
        assert_eq!(table.next(State::Stopped, Event::Timeout), State::Stopped);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn builder_rejects_missing_fallback() {
        let err = TransitionTable::builder()
            .fallback(State::Initial, State::Initial)
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncompleteTable);
        assert_eq!(err.severity, Severity::Fatal);
    }

    #[test]
    fn builder_rejects_conflicting_fallbacks() {
        let err = TransitionTable::builder()
            .fallback(State::TurningU, State::LaneFollowing)
            .fallback(State::TurningU, State::Stopped)
            .remaining_stay()
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidConfiguration);
        assert_eq!(err.payload, Payload::Code(State::TurningU.id() as u32));
    }

    #[test]
    fn builder_rejects_timeout_out_of_stopped() {
        let err = TransitionTable::builder()
            .fallback(State::Stopped, State::LaneFollowing)
            .remaining_stay()
            .build()
            .unwrap_err();
        assert_eq!(err.severity, Severity::Fatal);
        assert_eq!(err.kind, ErrorKind::InvalidConfiguration);
        assert_eq!(
            err.payload,
            Payload::Transition {
                from_state: State::Stopped.id(),
                via_event: Event::Timeout.id(),
            }
        );
    }

    #[test]
    fn builder_rejects_fallback_into_initial() {
        let err = TransitionTable::builder()
            .fallback(State::Planning, State::Initial)
            .remaining_stay()
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidConfiguration);
        assert!(err.message.contains("initial"));
    }

    #[test]
    fn timeout_may_enter_stopped() {
        let table = TransitionTable::builder()
            .fallback(State::ObstacleAvoidance, State::Stopped)
            .remaining_stay()
            .build()
            .unwrap();
        assert_eq!(table.next(State::ObstacleAvoidance, Event::Timeout), State::Stopped);
        assert_eq!(table.next(State::Stopped, Event::Timeout), State::Stopped);
    }

    #[test]
    fn builder_accepts_complete_map() {
        let table = TransitionTable::builder()
            .fallback(State::ObstacleAvoidance, State::LaneFollowing)
            .remaining_stay()
            .build()
            .unwrap();
        assert_eq!(
            table.next(State::ObstacleAvoidance, Event::Timeout),
            State::LaneFollowing
        );
        assert_eq!(table.next(State::TurningRight, Event::Timeout), State::TurningRight);
    }
}
