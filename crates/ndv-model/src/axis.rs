#![forbid(unsafe_code)]

//! Axis and channel addressing.
//!
//! An [`AxisKey`] names a dimension either by signed position (`-1` is the
//! last axis) or by label (`"time"`). The two variants never compare equal,
//! even when their text matches: `AxisKey::Label("5")` and
//! `AxisKey::Index(5)` are different keys. [`AxisKey::parse`] is the only
//! place a label-looking integer is turned into an index, and only when a
//! caller asks for it.

use std::fmt;

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// AxisKey
// ---------------------------------------------------------------------------

/// A dimension identifier: signed index or label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AxisKey {
    Index(i64),
    Label(String),
}

impl AxisKey {
    /// Parse user text, preferring integers.
    ///
    /// `"5"`, `" -2 "` and `"3.0"` become indices; anything else is a label.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Index(i);
        }
        if let Ok(f) = trimmed.parse::<f64>()
            && f.is_finite()
            && f.fract() == 0.0
            && f.abs() < i64::MAX as f64
        {
            return Self::Index(f as i64);
        }
        Self::Label(text.to_string())
    }

    #[must_use]
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Label(_) => None,
        }
    }

    #[must_use]
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Index(_) => None,
            Self::Label(s) => Some(s),
        }
    }

    /// Source-like rendering that keeps the variant visible: labels are
    /// quoted (`'5'`), indices are bare (`5`).
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::Index(i) => i.to_string(),
            Self::Label(s) => format!("'{s}'"),
        }
    }
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AxisKey {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for AxisKey {
    fn from(i: i32) -> Self {
        Self::Index(i64::from(i))
    }
}

impl From<&str> for AxisKey {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

impl From<String> for AxisKey {
    fn from(s: String) -> Self {
        Self::Label(s)
    }
}

// ---------------------------------------------------------------------------
// CoordIndex
// ---------------------------------------------------------------------------

/// A position along a dimension, used to key per-channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CoordIndex {
    Index(i64),
    Label(String),
}

impl fmt::Display for CoordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CoordIndex {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for CoordIndex {
    fn from(i: i32) -> Self {
        Self::Index(i64::from(i))
    }
}

impl From<&str> for CoordIndex {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

impl From<String> for CoordIndex {
    fn from(s: String) -> Self {
        Self::Label(s)
    }
}

// ---------------------------------------------------------------------------
// VisibleAxes
// ---------------------------------------------------------------------------

/// Ordered axes to display, slowest to fastest. Always 2 or 3 entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<AxisKey>", into = "Vec<AxisKey>"))]
pub struct VisibleAxes(Vec<AxisKey>);

impl VisibleAxes {
    #[must_use]
    pub fn two(a: impl Into<AxisKey>, b: impl Into<AxisKey>) -> Self {
        Self(vec![a.into(), b.into()])
    }

    #[must_use]
    pub fn three(a: impl Into<AxisKey>, b: impl Into<AxisKey>, c: impl Into<AxisKey>) -> Self {
        Self(vec![a.into(), b.into(), c.into()])
    }

    /// Number of displayed dimensions: 2 or 3.
    #[must_use]
    pub fn n_visible_axes(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, axis: &AxisKey) -> bool {
        self.0.contains(axis)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[AxisKey] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AxisKey> {
        self.0.iter()
    }
}

impl Default for VisibleAxes {
    fn default() -> Self {
        Self::two(-2i64, -1i64)
    }
}

impl TryFrom<Vec<AxisKey>> for VisibleAxes {
    type Error = ModelError;

    fn try_from(axes: Vec<AxisKey>) -> Result<Self, Self::Error> {
        match axes.len() {
            2 | 3 => Ok(Self(axes)),
            count => Err(ModelError::InvalidVisibleAxes { count }),
        }
    }
}

impl From<VisibleAxes> for Vec<AxisKey> {
    fn from(axes: VisibleAxes) -> Self {
        axes.0
    }
}

impl<'a> IntoIterator for &'a VisibleAxes {
    type Item = &'a AxisKey;
    type IntoIter = std::slice::Iter<'a, AxisKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for VisibleAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, axis) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&axis.repr())?;
        }
        f.write_str(")")
    }
}
