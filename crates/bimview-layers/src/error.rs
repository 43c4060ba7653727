#![forbid(unsafe_code)]

use std::fmt;

/// Layer registry failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    /// A layer with this name is already registered.
    DuplicateName(String),
    /// No layer with this name is registered.
    NotFound(String),
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName(name) => write!(f, "layer {name:?} already exists"),
            Self::NotFound(name) => write!(f, "layer {name:?} not found"),
        }
    }
}

impl std::error::Error for LayerError {}
