use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// How loudly an error should be reported; the runtime crate maps this onto
/// tracing levels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Subsystem that raised the error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    /// State machine and its runtime host.
    Arbiter,
    /// Transition tables and process configuration.
    Config,
    /// Message publishing.
    Transport,
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidConfiguration,
    IncompleteTable,
    InvalidState,
    UnknownEvent,
    Transport,
    Other,
}

/// Structured detail attached to an error.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    None,

    Context {
        key: &'static str,
        value: Cow<'static, str>,
    },

    /// Ids of the state and event a rejected transition was keyed on.
    Transition { from_state: u8, via_event: u8 },

    Code(u32),
}

/// Error type shared by every navfsm crate.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    #[inline]
    pub fn trace() -> ErrB {
        ErrB::new(Severity::Trace)
    }
    #[inline]
    pub fn info() -> ErrB {
        ErrB::new(Severity::Info)
    }
    #[inline]
    pub fn warn() -> ErrB {
        ErrB::new(Severity::Warn)
    }
    #[inline]
    pub fn error() -> ErrB {
        ErrB::new(Severity::Error)
    }
    #[inline]
    pub fn fatal() -> ErrB {
        ErrB::new(Severity::Fatal)
    }

    /// A state was left without a timeout fallback when building a table.
    ///
    /// Fatal: the machine must not start on a table that is not total.
    pub fn incomplete_table(state_label: &'static str) -> Self {
        CoreError::fatal()
            .domain(Domain::Config)
            .kind(ErrorKind::IncompleteTable)
            .msgf(format_args!("no timeout fallback defined for state {state_label}"))
            .payload(Payload::Context {
                key: "state",
                value: Cow::Borrowed(state_label),
            })
            .build()
    }

    /// A tag that does not name any recognized event.
    pub fn unknown_event(tag: &str) -> Self {
        CoreError::trace()
            .domain(Domain::Arbiter)
            .kind(ErrorKind::UnknownEvent)
            .msg("unrecognized event tag")
            .payload(Payload::Context {
                key: "tag",
                value: Cow::Owned(tag.to_string()),
            })
            .build()
    }
}

/// Chained builder started by `CoreError::{trace,info,warn,error,fatal}`.
///
/// Unset fields stay at `Domain::Other`, `ErrorKind::Other`, an empty message
/// and `Payload::None`.
#[derive(Debug, Clone)]
pub struct ErrB {
    domain: Domain,
    kind: ErrorKind,
    severity: Severity,
    message: Cow<'static, str>,
    payload: Payload,
}

impl ErrB {
    #[inline]
    fn new(severity: Severity) -> Self {
        Self {
            domain: Domain::Other,
            kind: ErrorKind::Other,
            severity,
            message: Cow::Borrowed(""),
            payload: Payload::None,
        }
    }

    #[inline]
    pub fn domain(mut self, d: Domain) -> Self {
        self.domain = d;
        self
    }

    #[inline]
    pub fn kind(mut self, k: ErrorKind) -> Self {
        self.kind = k;
        self
    }

    #[inline]
    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.message = m.into();
        self
    }

    #[inline]
    pub fn msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.message = Cow::Owned(args.to_string());
        self
    }

    #[inline]
    pub fn payload(mut self, p: Payload) -> Self {
        self.payload = p;
        self
    }

    #[inline]
    pub fn build(self) -> CoreError {
        CoreError {
            domain: self.domain,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            payload: self.payload,
        }
    }
}
