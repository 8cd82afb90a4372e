use std::{backtrace::Backtrace, io};

use thiserror::Error;

/// Failure categories surfaced by the monitor. None of them are fatal: the
/// UI logs them and keeps running, tests inspect them.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("{context}: {source}")]
    IoUnavailable {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {what}: {detail}")]
    ParseFailure { what: String, detail: String },
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    IoUnavailable,
    ParseFailure,
    ConfigInvalid,
}

impl MonitorError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::IoUnavailable {
            context: context.into(),
            source,
        }
    }

    pub fn parse(what: impl Into<String>, detail: impl ToString) -> Self {
        Self::ParseFailure {
            what: what.into(),
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MonitorError::IoUnavailable { .. } => ErrorKind::IoUnavailable,
            MonitorError::ParseFailure { .. } => ErrorKind::ParseFailure,
            MonitorError::ConfigInvalid(_) => ErrorKind::ConfigInvalid,
        }
    }
}

/// Writes a swallowed failure to the debug log. The backtrace is only
/// populated when `RUST_BACKTRACE` is set.
pub fn report(context: &str, err: &dyn std::error::Error) {
    let trace = Backtrace::capture();
    log::error!("{context}: {err}");
    if let std::backtrace::BacktraceStatus::Captured = trace.status() {
        log::debug!("{context} backtrace:\n{trace}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        let io = MonitorError::io("reading journal", io::Error::other("boom"));
        assert_eq!(io.kind(), ErrorKind::IoUnavailable);
        assert_eq!(io.to_string(), "reading journal: boom");

        let parse = MonitorError::parse("status file", "missing header");
        assert_eq!(parse.kind(), ErrorKind::ParseFailure);
        assert_eq!(parse.to_string(), "failed to parse status file: missing header");

        let config = MonitorError::ConfigInvalid("threshold must be an integer".into());
        assert_eq!(config.kind(), ErrorKind::ConfigInvalid);
    }
}
