/// Mutually-exclusive robot behavior modes.
///
/// Exactly one state is current at any instant. The machine starts in
/// `Initial` and has no terminal state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum State {
    Initial,
    Planning,
    LaneFollowing,
    ObstacleAvoidance,
    TurningRight,
    TurningLeft,
    TurningU,
    Stopped,
}

/// Internal, compact IDs used for error payloads and table indexing.
///
/// These are **not** wire identifiers; the state broadcast uses `label()`.
impl State {
    pub const fn id(self) -> u8 {
        match self {
            State::Initial => 0,
            State::Planning => 1,
            State::LaneFollowing => 2,
            State::ObstacleAvoidance => 3,
            State::TurningRight => 4,
            State::TurningLeft => 5,
            State::TurningU => 6,
            State::Stopped => 7,
        }
    }

    /// Position in `ALL_STATES`.
    pub const fn index(self) -> usize {
        self.id() as usize
    }

    /// Stable, human-readable label published on the state broadcast.
    pub const fn label(self) -> &'static str {
        match self {
            State::Initial => "initial",
            State::Planning => "planning",
            State::LaneFollowing => "lane_following",
            State::ObstacleAvoidance => "obstacle_avoidance",
            State::TurningRight => "turning_right",
            State::TurningLeft => "turning_left",
            State::TurningU => "turning_u",
            State::Stopped => "stopped",
        }
    }

    /// True for the three directional turning states.
    pub const fn is_turning(self) -> bool {
        matches!(
            self,
            State::TurningRight | State::TurningLeft | State::TurningU
        )
    }

    /// Reverse of `label()`.
    pub fn from_label(label: &str) -> Option<State> {
        ALL_STATES.into_iter().find(|s| s.label() == label)
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical list of all states, ordered by `id()`.
pub const ALL_STATES: [State; 8] = [
    State::Initial,
    State::Planning,
    State::LaneFollowing,
    State::ObstacleAvoidance,
    State::TurningRight,
    State::TurningLeft,
    State::TurningU,
    State::Stopped,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_table_positions() {
        for (idx, state) in ALL_STATES.into_iter().enumerate() {
            assert_eq!(state.index(), idx);
        }
    }

    #[test]
    fn labels_round_trip() {
        for state in ALL_STATES {
            assert_eq!(State::from_label(state.label()), Some(state));
        }
        assert_eq!(State::from_label("TURNING_R"), None);
    }
}
