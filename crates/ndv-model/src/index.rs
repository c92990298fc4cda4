//! Positions and ranges along a single axis.

use std::fmt;

use crate::error::ModelError;

/// A half-open range with optional bounds and step, `start:stop:step`.
///
/// Missing bounds mean "from the beginning" / "to the end"; a missing step
/// means 1. A zero step is never constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SliceRepr"))]
pub struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    /// The full range, `:`.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            start: None,
            stop: None,
            step: None,
        }
    }

    #[must_use]
    pub const fn range(start: i64, stop: i64) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// Build a slice, rejecting a zero step.
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Result<Self, ModelError> {
        if step == Some(0) {
            return Err(ModelError::InvalidSlice("step cannot be zero".into()));
        }
        Ok(Self { start, stop, step })
    }

    /// The single-element slice `i:i+1`. For `i == -1` the stop is left
    /// open, since `-1:0` would select nothing.
    #[must_use]
    pub const fn single(i: i64) -> Self {
        Self {
            start: Some(i),
            stop: if i == -1 { None } else { Some(i.saturating_add(1)) },
            step: None,
        }
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && matches!(self.step, None | Some(1))
    }

    /// Number of elements selected from an axis of length `len`, following
    /// negative-index and clamping rules of sequence slicing.
    ///
    /// A zero step selects nothing. Arithmetic is widened, so extreme
    /// bounds and steps cannot overflow.
    #[must_use]
    pub fn len_within(&self, len: usize) -> usize {
        let len = len as i128;
        let step = i128::from(self.step.unwrap_or(1));
        if step == 0 {
            return 0;
        }
        let resolve = |v: i64, lo: i128, hi: i128| {
            let v = i128::from(v);
            let v = if v < 0 { v + len } else { v };
            v.clamp(lo, hi)
        };
        let count = if step > 0 {
            let start = self.start.map_or(0, |v| resolve(v, 0, len));
            let stop = self.stop.map_or(len, |v| resolve(v, 0, len));
            if stop > start { (stop - start + step - 1) / step } else { 0 }
        } else {
            let start = self.start.map_or(len - 1, |v| resolve(v, -1, len - 1));
            let stop = self.stop.map_or(-1, |v| resolve(v, -1, len - 1));
            if start > stop { (start - stop - step - 1) / -step } else { 0 }
        };
        usize::try_from(count).unwrap_or(0)
    }
}

/// Wire form of [`Slice`]; converted through [`Slice::new`] so a zero
/// step is rejected on input.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SliceRepr {
    #[serde(default)]
    start: Option<i64>,
    #[serde(default)]
    stop: Option<i64>,
    #[serde(default)]
    step: Option<i64>,
}

#[cfg(feature = "serde")]
impl TryFrom<SliceRepr> for Slice {
    type Error = ModelError;

    fn try_from(repr: SliceRepr) -> Result<Self, Self::Error> {
        Self::new(repr.start, repr.stop, repr.step)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str(":")?;
        if let Some(stop) = self.stop {
            write!(f, "{stop}")?;
        }
        if let Some(step) = self.step {
            write!(f, ":{step}")?;
        }
        Ok(())
    }
}

impl From<std::ops::Range<i64>> for Slice {
    fn from(range: std::ops::Range<i64>) -> Self {
        Self::range(range.start, range.end)
    }
}

impl From<std::ops::RangeFull> for Slice {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::full()
    }
}

/// What is displayed along one axis: a single position or a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum IndexValue {
    Index(i64),
    Slice(Slice),
}

impl IndexValue {
    /// Widen to a slice: an index `i` becomes `i:i+1`.
    #[must_use]
    pub const fn to_slice(self) -> Slice {
        match self {
            Self::Index(i) => Slice::single(i),
            Self::Slice(s) => s,
        }
    }

    #[must_use]
    pub const fn is_slice(&self) -> bool {
        matches!(self, Self::Slice(_))
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Slice(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for IndexValue {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for IndexValue {
    fn from(i: i32) -> Self {
        Self::Index(i64::from(i))
    }
}

impl From<Slice> for IndexValue {
    fn from(s: Slice) -> Self {
        Self::Slice(s)
    }
}

impl From<std::ops::Range<i64>> for IndexValue {
    fn from(range: std::ops::Range<i64>) -> Self {
        Self::Slice(range.into())
    }
}
