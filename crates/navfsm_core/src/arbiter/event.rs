use super::Behavior;

/// Discrete notifications that drive the arbiter.
///
/// Events carry no payload. Raw detector strings and boolean completion
/// signals are normalized into one of these before they reach the machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Event {
    GoalGiven,
    TrajectoryPlanned,
    ObstacleObserved,
    ObstacleAvoidanceCompleted,
    ApriltagRight,
    ApriltagLeft,
    ApriltagU,
    TurningCompleted,
    GoalReached,
    LaneFollowingCompleted,
    Timeout,

    // External control
    StopRequested,
    Resume,
}

impl Event {
    /// Internal, compact IDs used for error payloads.
    pub const fn id(self) -> u8 {
        match self {
            Event::GoalGiven => 0,
            Event::TrajectoryPlanned => 1,
            Event::ObstacleObserved => 2,
            Event::ObstacleAvoidanceCompleted => 3,
            Event::ApriltagRight => 4,
            Event::ApriltagLeft => 5,
            Event::ApriltagU => 6,
            Event::TurningCompleted => 7,
            Event::GoalReached => 8,
            Event::LaneFollowingCompleted => 9,
            Event::Timeout => 10,
            Event::StopRequested => 11,
            Event::Resume => 12,
        }
    }

    /// Canonical wire tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Event::GoalGiven => "goal_given",
            Event::TrajectoryPlanned => "trajectory_planned",
            Event::ObstacleObserved => "obstacle_observed",
            Event::ObstacleAvoidanceCompleted => "obstacle_avoidance_completed",
            Event::ApriltagRight => "apriltag_right",
            Event::ApriltagLeft => "apriltag_left",
            Event::ApriltagU => "apriltag_u",
            Event::TurningCompleted => "turning_completed",
            Event::GoalReached => "goal_reached",
            Event::LaneFollowingCompleted => "lane_following_completed",
            Event::Timeout => "timeout",
            Event::StopRequested => "stop_requested",
            Event::Resume => "resume",
        }
    }

    /// Parse a canonical tag. Unknown tags yield `None` and are ignored upstream.
    pub fn from_tag(tag: &str) -> Option<Event> {
        ALL_EVENTS.into_iter().find(|e| e.tag() == tag.trim())
    }

    /// Normalize a raw obstacle detector message.
    pub fn from_obstacle_detection(raw: &str) -> Option<Event> {
        match raw.trim() {
            "obstacle_detected" | "obstacle_observed" => Some(Event::ObstacleObserved),
            _ => None,
        }
    }

    /// Normalize a raw AprilTag detector message.
    ///
    /// Accepts the detector's `AprilTag_<dir>` spelling as well as canonical tags.
    pub fn from_apriltag_detection(raw: &str) -> Option<Event> {
        match raw.trim() {
            "AprilTag_right" | "apriltag_right" => Some(Event::ApriltagRight),
            "AprilTag_left" | "apriltag_left" => Some(Event::ApriltagLeft),
            "AprilTag_u" | "apriltag_u" => Some(Event::ApriltagU),
            _ => None,
        }
    }

    /// Normalize a boolean "done" message from a behavior's completion channel.
    ///
    /// `false` carries no information and is dropped.
    pub fn from_completion(behavior: Behavior, done: bool) -> Option<Event> {
        if !done {
            return None;
        }
        Some(match behavior {
            Behavior::LaneFollowing => Event::LaneFollowingCompleted,
            Behavior::ObstacleAvoidance => Event::ObstacleAvoidanceCompleted,
            Behavior::Turning => Event::TurningCompleted,
            Behavior::Planning => Event::TrajectoryPlanned,
        })
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Canonical list of all recognized events, ordered by `id()`.
pub const ALL_EVENTS: [Event; 13] = [
    Event::GoalGiven,
    Event::TrajectoryPlanned,
    Event::ObstacleObserved,
    Event::ObstacleAvoidanceCompleted,
    Event::ApriltagRight,
    Event::ApriltagLeft,
    Event::ApriltagU,
    Event::TurningCompleted,
    Event::GoalReached,
    Event::LaneFollowingCompleted,
    Event::Timeout,
    Event::StopRequested,
    Event::Resume,
];
