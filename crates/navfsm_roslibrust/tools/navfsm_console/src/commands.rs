//! Console line grammar.
//!
//! ```text
//! <event tag>                     goal_given, apriltag_left, stop_requested, ...
//! obstacle <raw>                  raw obstacle detector string
//! apriltag <raw>                  raw AprilTag detector string
//! done <behavior> [true|false]    completion signal (default true)
//! status <obstacle|apriltag> <b>  detector status, consumed by waits
//! state | graph | help | quit
//! ```

use navfsm_core::arbiter::Behavior;
use navfsm_core::error::{CoreError, Domain, ErrorKind, Payload, Result};
use navfsm_roslibrust::arbiter::SignalChannel;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Empty,
    /// Forwarded verbatim to the general event channel.
    Tag(String),
    Obstacle(String),
    Apriltag(String),
    Completion { behavior: Behavior, done: bool },
    Status { channel: SignalChannel, value: bool },
    ShowState,
    ShowGraph,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<ConsoleCommand> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(ConsoleCommand::Empty);
    };

    let cmd = match head {
        "state" => ConsoleCommand::ShowState,
        "graph" => ConsoleCommand::ShowGraph,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        "obstacle" => ConsoleCommand::Obstacle(rest(words)),
        "apriltag" => ConsoleCommand::Apriltag(rest(words)),
        "done" => {
            let name = words.next().ok_or_else(|| bad_input("done", "missing behavior"))?;
            let behavior = Behavior::from_label(name).ok_or_else(|| bad_input("done", name))?;
            let done = match words.next() {
                Some(value) => parse_flag(value).ok_or_else(|| bad_input("done", value))?,
                None => true,
            };
            ConsoleCommand::Completion { behavior, done }
        }
        "status" => {
            let name = words.next().ok_or_else(|| bad_input("status", "missing detector"))?;
            let channel = match name {
                "obstacle" => SignalChannel::ObstacleDetection,
                "apriltag" => SignalChannel::ApriltagDetection,
                other => return Err(bad_input("status", other)),
            };
            let value = words
                .next()
                .and_then(parse_flag)
                .ok_or_else(|| bad_input("status", "missing or invalid value"))?;
            ConsoleCommand::Status { channel, value }
        }
        _ => ConsoleCommand::Tag(line.trim().to_string()),
    };
    Ok(cmd)
}

pub fn usage() -> &'static str {
    "commands: <event tag> | obstacle <raw> | apriltag <raw> | done <behavior> [true|false] \
     | status <obstacle|apriltag> <true|false> | state | graph | help | quit"
}

fn rest<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.collect::<Vec<_>>().join(" ")
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn bad_input(command: &'static str, detail: &str) -> CoreError {
    CoreError::info()
        .domain(Domain::Other)
        .kind(ErrorKind::InvalidArgument)
        .msgf(format_args!("{command}: {detail}"))
        .payload(Payload::Context {
            key: "command",
            value: command.into(),
        })
        .build()
}
