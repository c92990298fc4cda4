use std::fmt;

use ndv_reactive::MapError;

/// Errors from building or editing display models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A colormap name is not in the registry.
    UnknownColormap(String),
    /// A `#rrggbb` color string was malformed.
    InvalidColor(String),
    /// Visible axes must number exactly 2 or 3.
    InvalidVisibleAxes { count: usize },
    /// A reducer name did not resolve.
    UnknownReducer(String),
    /// A slice was malformed (e.g. zero step).
    InvalidSlice(String),
    /// A lookup-table setting was out of range.
    InvalidLut(String),
    /// An evented map rejected an operation.
    Map(MapError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownColormap(name) => write!(f, "unknown colormap: {name:?}"),
            Self::InvalidColor(text) => write!(f, "invalid color: {text:?}"),
            Self::InvalidVisibleAxes { count } => {
                write!(f, "visible axes must have 2 or 3 entries, got {count}")
            }
            Self::UnknownReducer(name) => write!(f, "unknown reducer: {name:?}"),
            Self::InvalidSlice(msg) => write!(f, "invalid slice: {msg}"),
            Self::InvalidLut(msg) => write!(f, "invalid lut: {msg}"),
            Self::Map(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Map(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MapError> for ModelError {
    fn from(err: MapError) -> Self {
        Self::Map(err)
    }
}
