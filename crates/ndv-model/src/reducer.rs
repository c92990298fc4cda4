//! Reductions applied along axes that are neither visible nor indexed.

use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// A reduction over the values of one axis.
///
/// Names resolve with or without a `numpy.` qualifier, so `"max"` and
/// `"numpy.max"` are the same reducer. NaN inputs are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Reducer {
    #[default]
    Max,
    Min,
    Mean,
    Sum,
    Median,
}

impl Reducer {
    pub const ALL: [Self; 5] = [Self::Max, Self::Min, Self::Mean, Self::Sum, Self::Median];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Median => "median",
        }
    }

    /// Fully qualified name, e.g. `numpy.max`.
    #[must_use]
    pub fn qualified_name(self) -> String {
        format!("numpy.{}", self.name())
    }

    /// Reduce `values`, skipping NaN. Returns `None` when nothing remains,
    /// except for `Sum`, whose empty result is `0.0`.
    #[must_use]
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if finite.is_empty() {
            return matches!(self, Self::Sum).then_some(0.0);
        }
        let n = finite.len() as f64;
        let out = match self {
            Self::Max => finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Min => finite.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Sum => finite.iter().sum(),
            Self::Mean => finite.iter().sum::<f64>() / n,
            Self::Median => {
                finite.sort_by(f64::total_cmp);
                let mid = finite.len() / 2;
                if finite.len() % 2 == 0 {
                    (finite[mid - 1] + finite[mid]) / 2.0
                } else {
                    finite[mid]
                }
            }
        };
        Some(out)
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "numpy.{}", self.name())
    }
}

impl FromStr for Reducer {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix("numpy.")
            .or_else(|| trimmed.strip_prefix("np."))
            .unwrap_or(trimmed);
        let bare = bare.strip_prefix("nan").unwrap_or(bare);
        Self::ALL
            .into_iter()
            .find(|r| r.name() == bare)
            .ok_or_else(|| ModelError::UnknownReducer(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Reducer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.qualified_name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Reducer {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
