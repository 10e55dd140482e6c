use std::env;
use std::str::FromStr;
use std::time::Duration;

use navfsm_core::error::{CoreError, Domain, ErrorKind, Payload, Result};
use navfsm_roslibrust::topics::DEFAULT_VEHICLE;

pub const DEFAULT_PUBLISH_HZ: u32 = 10;
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 1_000_000;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    pub vehicle: String,
    pub publish_hz: u32,
    pub wait_timeout: Duration,
    /// Run the per-state bounded waits alongside the reactive transitions.
    pub sequential: bool,
}

impl Config {
    pub fn from_args() -> Result<Self> {
        Self::from_args_iter(env::args())
    }

    pub fn from_args_iter<I, S>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vehicle = env::var("NAVFSM_VEHICLE").unwrap_or_else(|_| DEFAULT_VEHICLE.to_string());
        let mut publish_hz = match env::var("NAVFSM_PUBLISH_HZ") {
            Ok(value) => parse_number("NAVFSM_PUBLISH_HZ", &value)?,
            Err(_) => DEFAULT_PUBLISH_HZ,
        };
        let mut wait_timeout_ms = match env::var("NAVFSM_WAIT_TIMEOUT_MS") {
            Ok(value) => parse_number("NAVFSM_WAIT_TIMEOUT_MS", &value)?,
            Err(_) => DEFAULT_WAIT_TIMEOUT_MS,
        };
        let mut sequential = env::var("NAVFSM_SEQUENTIAL")
            .ok()
            .and_then(parse_bool)
            .unwrap_or(false);

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                "--vehicle" => {
                    if let Some(value) = args.next() {
                        vehicle = value.as_ref().to_string();
                    }
                }
                "--publish-hz" => {
                    if let Some(value) = args.next() {
                        publish_hz = parse_number("--publish-hz", value.as_ref())?;
                    }
                }
                "--wait-timeout-ms" => {
                    if let Some(value) = args.next() {
                        wait_timeout_ms = parse_number("--wait-timeout-ms", value.as_ref())?;
                    }
                }
                "--sequential" => {
                    sequential = true;
                }
                _ if arg.starts_with("--vehicle=") => {
                    vehicle = arg["--vehicle=".len()..].to_string();
                }
                _ if arg.starts_with("--publish-hz=") => {
                    publish_hz = parse_number("--publish-hz", &arg["--publish-hz=".len()..])?;
                }
                _ if arg.starts_with("--wait-timeout-ms=") => {
                    wait_timeout_ms =
                        parse_number("--wait-timeout-ms", &arg["--wait-timeout-ms=".len()..])?;
                }
                _ if arg.starts_with("--sequential=") => {
                    let value = &arg["--sequential=".len()..];
                    sequential = parse_bool(value.to_string())
                        .ok_or_else(|| invalid_value("--sequential", value))?;
                }
                _ => {}
            }
        }

        if vehicle.trim().is_empty() {
            return Err(invalid_value("--vehicle", &vehicle));
        }
        if publish_hz == 0 {
            return Err(invalid_value("--publish-hz", "0"));
        }

        Ok(Self {
            vehicle,
            publish_hz,
            wait_timeout: Duration::from_millis(wait_timeout_ms),
            sequential,
        })
    }
}

fn print_usage() {
    println!(
        "navfsm_console [--vehicle <name>] [--publish-hz <hz>] [--wait-timeout-ms <ms>] [--sequential]"
    );
}

fn parse_bool(value: String) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid_value(key, value))
}

fn invalid_value(key: &'static str, value: &str) -> CoreError {
    CoreError::error()
        .domain(Domain::Config)
        .kind(ErrorKind::InvalidConfiguration)
        .msgf(format_args!("invalid value {value:?} for {key}"))
        .payload(Payload::Context {
            key,
            value: value.to_string().into(),
        })
        .build()
}
