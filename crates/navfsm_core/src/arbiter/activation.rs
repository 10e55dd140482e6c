use std::sync::Arc;

use tracing::debug;

use super::{ActivationGate, State};

/// Controllable behavior outputs, one enable channel each.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Behavior {
    LaneFollowing,
    ObstacleAvoidance,
    Turning,
    Planning,
}

impl Behavior {
    pub const fn index(self) -> usize {
        match self {
            Behavior::LaneFollowing => 0,
            Behavior::ObstacleAvoidance => 1,
            Behavior::Turning => 2,
            Behavior::Planning => 3,
        }
    }

    /// Stable name used for channel naming.
    pub const fn label(self) -> &'static str {
        match self {
            Behavior::LaneFollowing => "lane_following",
            Behavior::ObstacleAvoidance => "obstacle_avoidance",
            Behavior::Turning => "turning",
            Behavior::Planning => "planning",
        }
    }

    pub fn from_label(label: &str) -> Option<Behavior> {
        ALL_BEHAVIORS.into_iter().find(|b| b.label() == label)
    }

    /// The behavior a state runs, if any.
    ///
    /// `Initial`, `Planning` and `Stopped` run nothing reactively; the planner
    /// is only enabled by a bounded wait in `Planning`.
    pub const fn for_state(state: State) -> Option<Behavior> {
        match state {
            State::LaneFollowing => Some(Behavior::LaneFollowing),
            State::ObstacleAvoidance => Some(Behavior::ObstacleAvoidance),
            State::TurningRight | State::TurningLeft | State::TurningU => {
                Some(Behavior::Turning)
            }
            State::Initial | State::Planning | State::Stopped => None,
        }
    }
}

impl std::fmt::Display for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub const ALL_BEHAVIORS: [Behavior; 4] = [
    Behavior::LaneFollowing,
    Behavior::ObstacleAvoidance,
    Behavior::Turning,
    Behavior::Planning,
];

/// Outbound boundary of the arbiter.
///
/// All calls are fire-and-forget: implementations must not block and have no
/// way to report failure back into the machine. Transport adapters queue the
/// message and log their own errors.
pub trait ArbiterOutputs: Send + Sync {
    fn set_enabled(&self, behavior: Behavior, enabled: bool);
    fn publish_state(&self, state: State);
    /// Joystick override plus a zero-velocity wheel command pair.
    fn emergency_stop(&self);
}

/// Enabled/disabled status of every behavior output.
///
/// Invariant: at most one gate is enabled at any observable instant.
#[derive(Debug)]
pub struct ActivationRecord {
    gates: [Arc<ActivationGate>; ALL_BEHAVIORS.len()],
}

impl ActivationRecord {
    pub fn new() -> Self {
        Self {
            gates: ALL_BEHAVIORS.map(|b| Arc::new(ActivationGate::new(b))),
        }
    }

    /// Shared gate for `behavior`, for consumers that gate their own work.
    pub fn gate(&self, behavior: Behavior) -> Arc<ActivationGate> {
        Arc::clone(&self.gates[behavior.index()])
    }

    pub fn is_enabled(&self, behavior: Behavior) -> bool {
        self.gates[behavior.index()].is_enabled()
    }

    /// The currently enabled behavior, if any.
    pub fn enabled(&self) -> Option<Behavior> {
        self.gates
            .iter()
            .find(|g| g.is_enabled())
            .map(|g| g.behavior())
    }

    pub fn enabled_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_enabled()).count()
    }

    /// Point-in-time copy of every flag.
    pub fn snapshot(&self) -> [(Behavior, bool); ALL_BEHAVIORS.len()] {
        ALL_BEHAVIORS.map(|b| (b, self.is_enabled(b)))
    }
}

impl Default for ActivationRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns every behavior output and keeps exactly one of them (at most) enabled.
pub struct ActivationController {
    record: ActivationRecord,
    outputs: Arc<dyn ArbiterOutputs>,
}

impl ActivationController {
    pub fn new(outputs: Arc<dyn ArbiterOutputs>) -> Self {
        Self {
            record: ActivationRecord::new(),
            outputs,
        }
    }

    pub fn record(&self) -> &ActivationRecord {
        &self.record
    }

    /// Disable everything, then enable the behavior `state` runs.
    ///
    /// Entering `Stopped` also issues the emergency stop.
    pub fn activate(&mut self, state: State) {
        self.disable_all();
        if let Some(behavior) = Behavior::for_state(state) {
            self.enable_one(behavior);
        }
        if state == State::Stopped {
            self.outputs.emergency_stop();
        }
        debug!(state = %state, enabled = ?self.record.enabled(), "behavior activation applied");
    }

    /// Switch the enabled output to `behavior`.
    ///
    /// Returns false (and emits nothing) when it is already the enabled one.
    pub fn enable(&mut self, behavior: Behavior) -> bool {
        if self.record.enabled() == Some(behavior) {
            return false;
        }
        self.disable_all();
        self.enable_one(behavior);
        debug!(behavior = %behavior, "behavior enabled on request");
        true
    }

    fn disable_all(&mut self) {
        for behavior in ALL_BEHAVIORS {
            self.record.gates[behavior.index()].set(false);
            self.outputs.set_enabled(behavior, false);
        }
    }

    fn enable_one(&mut self, behavior: Behavior) {
        debug_assert_eq!(self.record.enabled_count(), 0);
        self.record.gates[behavior.index()].set(true);
        self.outputs.set_enabled(behavior, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Out {
        Enable(Behavior, bool),
        Stop,
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Out>>);

    impl ArbiterOutputs for Recorder {
        fn set_enabled(&self, behavior: Behavior, enabled: bool) {
            self.0.lock().unwrap().push(Out::Enable(behavior, enabled));
        }
        fn publish_state(&self, _state: State) {}
        fn emergency_stop(&self) {
            self.0.lock().unwrap().push(Out::Stop);
        }
    }

    #[test]
    fn activate_disables_all_then_enables_one() {
        let rec = Arc::new(Recorder::default());
        let mut ctl = ActivationController::new(rec.clone());

        ctl.activate(State::TurningLeft);

        let out = rec.0.lock().unwrap().clone();
        assert_eq!(out.len(), ALL_BEHAVIORS.len() + 1);
        for (i, behavior) in ALL_BEHAVIORS.into_iter().enumerate() {
            assert_eq!(out[i], Out::Enable(behavior, false));
        }
        assert_eq!(out.last(), Some(&Out::Enable(Behavior::Turning, true)));
        assert_eq!(ctl.record().enabled(), Some(Behavior::Turning));
    }

    #[test]
    fn planning_and_initial_leave_everything_disabled() {
        let rec = Arc::new(Recorder::default());
        let mut ctl = ActivationController::new(rec.clone());

        ctl.activate(State::LaneFollowing);
        ctl.activate(State::Planning);
        assert_eq!(ctl.record().enabled_count(), 0);

        ctl.activate(State::Initial);
        assert_eq!(ctl.record().enabled_count(), 0);
    }

    #[test]
    fn stopped_issues_emergency_stop() {
        let rec = Arc::new(Recorder::default());
        let mut ctl = ActivationController::new(rec.clone());

        ctl.activate(State::Stopped);

        assert_eq!(rec.0.lock().unwrap().last(), Some(&Out::Stop));
        assert_eq!(ctl.record().enabled(), None);
    }

    #[test]
    fn enable_is_noop_when_already_enabled() {
        let rec = Arc::new(Recorder::default());
        let mut ctl = ActivationController::new(rec.clone());

        ctl.activate(State::ObstacleAvoidance);
        let before = rec.0.lock().unwrap().len();

        assert!(!ctl.enable(Behavior::ObstacleAvoidance));
        assert_eq!(rec.0.lock().unwrap().len(), before);

        assert!(ctl.enable(Behavior::Planning));
        assert_eq!(ctl.record().enabled(), Some(Behavior::Planning));
        assert_eq!(ctl.record().enabled_count(), 1);
    }

    #[test]
    fn gates_are_shared_with_consumers() {
        let rec = Arc::new(Recorder::default());
        let mut ctl = ActivationController::new(rec);
        let gate = ctl.record().gate(Behavior::LaneFollowing);

        assert!(!gate.is_enabled());
        ctl.activate(State::LaneFollowing);
        assert!(gate.is_enabled());
        ctl.activate(State::TurningU);
        assert!(!gate.is_enabled());
    }
}
