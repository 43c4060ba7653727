#![forbid(unsafe_code)]

//! Render-request failures.

use std::fmt;

use bimview_core::config::ViewLevel;
use bimview_core::error::ParseViewLevelError;
use bimview_layers::LayerError;

/// Why a view could not be rendered.
///
/// Every variant is a request problem the caller can fix; out-of-view
/// geometry, empty lists, and unplaceable labels are never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The request lacks the data its view level needs.
    MissingData {
        level: ViewLevel,
        field: &'static str,
    },
    /// A view-level name that matches no level.
    UnknownViewLevel(String),
    /// `trace_from` names equipment that is not in the floor plan.
    EquipmentNotFound(String),
    /// A system-type name that matches no system.
    UnknownSystem(String),
    /// The floor-plan layer stack could not be assembled.
    Layer(LayerError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingData { level, field } => {
                write!(f, "{level} view requires {field} data")
            }
            Self::UnknownViewLevel(name) => write!(f, "unknown view level {name:?}"),
            Self::EquipmentNotFound(id) => write!(f, "equipment {id:?} not found"),
            Self::UnknownSystem(name) => write!(f, "unknown system type {name:?}"),
            Self::Layer(err) => write!(f, "layer setup failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseViewLevelError> for RenderError {
    fn from(err: ParseViewLevelError) -> Self {
        Self::UnknownViewLevel(err.0)
    }
}

impl From<LayerError> for RenderError {
    fn from(err: LayerError) -> Self {
        Self::Layer(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = RenderError::MissingData {
            level: ViewLevel::Spatial,
            field: "spatial anchor",
        };
        assert_eq!(err.to_string(), "spatial view requires spatial anchor data");
        assert_eq!(
            RenderError::from(ParseViewLevelError("iso".into())),
            RenderError::UnknownViewLevel("iso".into())
        );
    }
}
