//! Errors raised by [`EventedMap`](crate::EventedMap) lookups and writes.

use std::fmt;

/// Errors from evented map operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The key has no stored value and the map has no default installed.
    KeyNotFound { key: String },
    /// The key validator rejected a key.
    InvalidKey { key: String, reason: String },
    /// The value validator rejected a value.
    InvalidValue { reason: String },
}

impl MapError {
    /// Build a [`MapError::KeyNotFound`] from any debuggable key.
    #[must_use]
    pub fn key_not_found(key: &impl fmt::Debug) -> Self {
        Self::KeyNotFound {
            key: format!("{key:?}"),
        }
    }

    /// Build a [`MapError::InvalidKey`] from any debuggable key.
    #[must_use]
    pub fn invalid_key(key: &impl fmt::Debug, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: format!("{key:?}"),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound { key } => write!(f, "key not found and no default set: {key}"),
            Self::InvalidKey { key, reason } => write!(f, "invalid key {key}: {reason}"),
            Self::InvalidValue { reason } => write!(f, "invalid value: {reason}"),
        }
    }
}

impl std::error::Error for MapError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_not_found_uses_debug_repr() {
        let err = MapError::key_not_found(&"5");
        assert_eq!(
            err,
            MapError::KeyNotFound {
                key: "\"5\"".to_string()
            }
        );
        assert_eq!(err.to_string(), "key not found and no default set: \"5\"");
    }

    #[test]
    fn display_invalid_key_and_value() {
        let key = MapError::invalid_key(&-3, "negative");
        assert_eq!(key.to_string(), "invalid key -3: negative");

        let value = MapError::invalid_value("gamma must be positive");
        assert_eq!(value.to_string(), "invalid value: gamma must be positive");
    }
}
