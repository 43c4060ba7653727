#![forbid(unsafe_code)]

//! Error types shared across the workspace.

use std::fmt;

/// Errors raised while loading or validating a [`RendererConfig`](crate::config::RendererConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config I/O error: {err}"),
            Self::Toml(err) => write!(f, "config TOML error: {err}"),
            Self::Json(err) => write!(f, "config JSON error: {err}"),
            Self::Validation(errors) => {
                write!(f, "config validation failed: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Toml(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}

/// A view-level name that does not match any known level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseViewLevelError(pub String);

impl fmt::Display for ParseViewLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown view level {:?} (expected overview, detail, or spatial)",
            self.0
        )
    }
}

impl std::error::Error for ParseViewLevelError {}
