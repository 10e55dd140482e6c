use navfsm_console::commands::{parse_line, ConsoleCommand};
use navfsm_core::arbiter::Behavior;
use navfsm_core::error::ErrorKind;
use navfsm_roslibrust::arbiter::SignalChannel;

#[test]
fn bare_words_are_event_tags() {
    assert_eq!(
        parse_line("  goal_given ").unwrap(),
        ConsoleCommand::Tag("goal_given".to_string())
    );
    assert_eq!(
        parse_line("not_an_event").unwrap(),
        ConsoleCommand::Tag("not_an_event".to_string())
    );
    assert_eq!(parse_line("   ").unwrap(), ConsoleCommand::Empty);
}

#[test]
fn detector_strings_keep_raw_text() {
    assert_eq!(
        parse_line("apriltag AprilTag_left").unwrap(),
        ConsoleCommand::Apriltag("AprilTag_left".to_string())
    );
    assert_eq!(
        parse_line("obstacle obstacle_detected").unwrap(),
        ConsoleCommand::Obstacle("obstacle_detected".to_string())
    );
}

#[test]
fn done_defaults_to_true() {
    assert_eq!(
        parse_line("done turning").unwrap(),
        ConsoleCommand::Completion {
            behavior: Behavior::Turning,
            done: true
        }
    );
    assert_eq!(
        parse_line("done planning false").unwrap(),
        ConsoleCommand::Completion {
            behavior: Behavior::Planning,
            done: false
        }
    );
}

#[test]
fn status_needs_detector_and_value() {
    assert_eq!(
        parse_line("status obstacle on").unwrap(),
        ConsoleCommand::Status {
            channel: SignalChannel::ObstacleDetection,
            value: true
        }
    );
    assert!(parse_line("status obstacle").is_err());
    assert!(parse_line("status lidar true").is_err());
}

#[test]
fn unknown_behavior_is_invalid_argument() {
    let err = parse_line("done flying").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[test]
fn console_keywords() {
    assert_eq!(parse_line("state").unwrap(), ConsoleCommand::ShowState);
    assert_eq!(parse_line("graph").unwrap(), ConsoleCommand::ShowGraph);
    assert_eq!(parse_line("help").unwrap(), ConsoleCommand::Help);
    assert_eq!(parse_line("exit").unwrap(), ConsoleCommand::Quit);
}
