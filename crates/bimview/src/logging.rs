#![forbid(unsafe_code)]

//! Optional subscriber setup for binaries and examples.
//!
//! Library crates in this workspace only emit `tracing` events; nothing is
//! printed until the embedding program installs a subscriber. This module is
//! the one place that does so.

use std::fmt;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Directive used when none is given.
pub const DEFAULT_FILTER: &str = "bimview=info";

/// Why [`init`] could not install a subscriber.
#[derive(Debug)]
pub enum LoggingError {
    /// The directive is not valid `EnvFilter` syntax.
    InvalidFilter { directive: String, source: ParseError },
    /// Another global subscriber is already installed.
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFilter { directive, source } => {
                write!(f, "invalid log filter {directive:?}: {source}")
            }
            Self::AlreadyInstalled(err) => write!(f, "log subscriber already installed: {err}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidFilter { source, .. } => Some(source),
            Self::AlreadyInstalled(err) => Some(err.as_ref()),
        }
    }
}

/// Install a global fmt subscriber filtered by `filter`.
///
/// `filter` uses `EnvFilter` directive syntax (e.g. `"bimview_layers=debug"`);
/// an empty string falls back to [`DEFAULT_FILTER`].
pub fn init(filter: &str) -> Result<(), LoggingError> {
    let directive = if filter.trim().is_empty() {
        DEFAULT_FILTER
    } else {
        filter
    };
    let env_filter = EnvFilter::try_new(directive).map_err(|source| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(LoggingError::AlreadyInstalled)
}
