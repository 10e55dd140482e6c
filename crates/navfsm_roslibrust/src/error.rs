use std::fmt;

use navfsm_core::error::{CoreError, Domain, ErrorKind, Payload, Severity};

pub fn log_core_error(err: CoreError) {
    match err.severity {
        Severity::Trace => tracing::trace!("{err}"),
        Severity::Debug => tracing::debug!("{err}"),
        Severity::Info => tracing::info!("{err}"),
        Severity::Warn => tracing::warn!("{err}"),
        Severity::Error | Severity::Fatal => tracing::error!("{err}"),
    }
}

/// The worker behind a handle has stopped; nothing can be delivered any more.
pub(crate) fn node_gone(what: &'static str) -> CoreError {
    CoreError::warn()
        .domain(Domain::Arbiter)
        .kind(ErrorKind::InvalidState)
        .msg("arbiter node is no longer running")
        .payload(Payload::Context {
            key: "where",
            value: what.into(),
        })
        .build()
}

pub(crate) fn publish_failed<E: fmt::Display>(topic: &str, err: E) -> CoreError {
    CoreError::error()
        .domain(Domain::Transport)
        .kind(ErrorKind::Transport)
        .msgf(format_args!("publish on {topic} failed: {err}"))
        .build()
}
