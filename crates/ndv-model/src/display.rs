#![forbid(unsafe_code)]

//! The root display model for an n-dimensional array.
//!
//! [`ArrayDisplayModel`] groups the observable pieces a viewer needs:
//!
//! | Field             | Type                                       | Default      |
//! |-------------------|--------------------------------------------|--------------|
//! | `visible_axes`    | `Observable<VisibleAxes>`                  | `(-2, -1)`   |
//! | `current_index`   | `EventedMap<AxisKey, IndexValue>`          | empty        |
//! | `channel_axis`    | `Observable<Option<AxisKey>>`              | `None`       |
//! | `reducers`        | `EventedMap<Option<AxisKey>, Reducer>`     | empty        |
//! | `default_reducer` | `Observable<Reducer>`                      | `numpy.max`  |
//! | `luts`            | `EventedMap<Option<CoordIndex>, LutModel>` | empty        |
//!
//! # Invariants
//!
//! 1. `channel_axis` is never one of the `visible_axes`. Assigning such an
//!    axis stores `None` (with a warning), and so does changing
//!    `visible_axes` to include the current channel axis.
//! 2. Every LUT stored in `luts`, including its default, passed
//!    [`LutModel::validate`].
//!
//! # Lookup order
//!
//! [`lut_for`](ArrayDisplayModel::lut_for) tries `luts[channel]`, then
//! `luts[None]`, then the map's default, then the frozen
//! [`default_lut`](ArrayDisplayModel::default_lut).
//! [`reducer_for`](ArrayDisplayModel::reducer_for) follows the same shape
//! ending at `default_reducer`.

use ndv_reactive::{EventedMap, MapError, Observable, Subscription};

use crate::axis::{AxisKey, CoordIndex, VisibleAxes};
use crate::error::ModelError;
use crate::index::{IndexValue, Slice};
use crate::lut::LutModel;
use crate::reducer::Reducer;

/// Plain-data copy of an [`ArrayDisplayModel`], without listeners.
///
/// Map defaults are not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArrayDisplaySnapshot {
    pub visible_axes: VisibleAxes,
    pub current_index: Vec<(AxisKey, IndexValue)>,
    pub channel_axis: Option<AxisKey>,
    pub reducers: Vec<(Option<AxisKey>, Reducer)>,
    pub default_reducer: Reducer,
    pub luts: Vec<(Option<CoordIndex>, LutModel)>,
}

/// Observable description of how an array is displayed.
///
/// Fields are shared handles: cloning one (e.g. `model.luts.clone()`) gives
/// a view onto the same state and signals. The model itself is not `Clone`
/// because it owns the listener that keeps `channel_axis` consistent with
/// `visible_axes`.
#[derive(Debug)]
pub struct ArrayDisplayModel {
    pub visible_axes: Observable<VisibleAxes>,
    pub current_index: EventedMap<AxisKey, IndexValue>,
    pub channel_axis: Observable<Option<AxisKey>>,
    pub reducers: EventedMap<Option<AxisKey>, Reducer>,
    pub default_reducer: Observable<Reducer>,
    pub luts: EventedMap<Option<CoordIndex>, LutModel>,
    default_lut: LutModel,
    guards: Vec<Subscription>,
}

impl Default for ArrayDisplayModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayDisplayModel {
    /// A model with default axes, no channel axis, and empty maps.
    #[must_use]
    pub fn new() -> Self {
        let visible_axes = Observable::new(VisibleAxes::default());
        let channel_axis = channel_axis_for(&visible_axes);
        let guard = resync_channel_axis(&visible_axes, &channel_axis);

        Self {
            visible_axes,
            current_index: EventedMap::new(),
            channel_axis,
            reducers: EventedMap::new(),
            default_reducer: Observable::new(Reducer::default()),
            luts: EventedMap::new().with_value_validator(validated_lut),
            default_lut: LutModel::default(),
            guards: vec![guard],
        }
    }

    /// Rebuild a model from a snapshot, validating every LUT.
    ///
    /// No events are emitted. A channel axis that collides with the visible
    /// axes is dropped, as on assignment.
    pub fn from_snapshot(snapshot: ArrayDisplaySnapshot) -> Result<Self, ModelError> {
        let model = Self::new();
        model.visible_axes.set(snapshot.visible_axes);
        model.channel_axis.set(snapshot.channel_axis);
        model.default_reducer.set(snapshot.default_reducer);

        let Self {
            visible_axes,
            channel_axis,
            default_reducer,
            luts,
            default_lut,
            guards,
            ..
        } = model;
        Ok(Self {
            visible_axes,
            current_index: EventedMap::from_entries(snapshot.current_index),
            channel_axis,
            reducers: EventedMap::from_entries(snapshot.reducers),
            default_reducer,
            luts: luts.with_entries(snapshot.luts)?,
            default_lut,
            guards,
        })
    }

    /// Builder form of assigning `visible_axes`.
    #[must_use]
    pub fn with_visible_axes(self, axes: VisibleAxes) -> Self {
        self.visible_axes.set(axes);
        self
    }

    /// Copy the current state out of the observables.
    #[must_use]
    pub fn snapshot(&self) -> ArrayDisplaySnapshot {
        ArrayDisplaySnapshot {
            visible_axes: self.visible_axes.get(),
            current_index: self.current_index.entries(),
            channel_axis: self.channel_axis.get(),
            reducers: self.reducers.entries(),
            default_reducer: self.default_reducer.get(),
            luts: self.luts.entries(),
        }
    }

    /// Number of displayed dimensions: 2 or 3.
    #[must_use]
    pub fn n_visible_axes(&self) -> usize {
        self.visible_axes.with(VisibleAxes::n_visible_axes)
    }

    /// The LUT used when nothing more specific is set. Never changes.
    #[must_use]
    pub fn default_lut(&self) -> &LutModel {
        &self.default_lut
    }

    /// Effective LUT for `channel` (`None` means "no channel axis").
    #[must_use]
    pub fn lut_for(&self, channel: Option<&CoordIndex>) -> LutModel {
        self.luts
            .get_explicit(&channel.cloned())
            .or_else(|| self.luts.get_explicit(&None))
            .or_else(|| self.luts.default_value())
            .unwrap_or_else(|| self.default_lut.clone())
    }

    /// Effective reducer for `axis`.
    #[must_use]
    pub fn reducer_for(&self, axis: Option<&AxisKey>) -> Reducer {
        self.reducers
            .get_explicit(&axis.cloned())
            .or_else(|| self.reducers.get_explicit(&None))
            .or_else(|| self.reducers.default_value())
            .unwrap_or_else(|| self.default_reducer.get())
    }

    /// Per-axis selection for a data request.
    ///
    /// Visible axes and the channel axis are requested in full; every other
    /// indexed axis keeps its `current_index` entry. Order follows
    /// `current_index`, with visible axes not yet indexed appended last.
    #[must_use]
    pub fn index_request(&self) -> Vec<(AxisKey, IndexValue)> {
        let visible = self.visible_axes.get();
        let channel = self.channel_axis.get();
        let full = |axis: &AxisKey| visible.contains(axis) || channel.as_ref() == Some(axis);

        let mut request: Vec<(AxisKey, IndexValue)> = self
            .current_index
            .entries()
            .into_iter()
            .map(|(axis, value)| {
                let value = if full(&axis) {
                    IndexValue::Slice(Slice::full())
                } else {
                    value
                };
                (axis, value)
            })
            .collect();
        for axis in &visible {
            if !request.iter().any(|(k, _)| k == axis) {
                request.push((axis.clone(), IndexValue::Slice(Slice::full())));
            }
        }
        request
    }

    /// Number of internal listeners the model keeps alive.
    #[must_use]
    pub fn internal_listener_count(&self) -> usize {
        self.guards.len()
    }
}

/// `channel_axis` observable that refuses axes currently visible.
fn channel_axis_for(visible_axes: &Observable<VisibleAxes>) -> Observable<Option<AxisKey>> {
    let visible = visible_axes.clone();
    Observable::new(None).with_normalizer(move |axis: Option<AxisKey>| match axis {
        Some(axis) if visible.with(|axes| axes.contains(&axis)) => {
            tracing::warn!(
                axis = %axis.repr(),
                visible_axes = %visible.with(ToString::to_string),
                "channel_axis cannot be a visible axis; setting it to None"
            );
            None
        }
        other => other,
    })
}

/// Re-apply the channel-axis normalizer whenever the visible axes change.
fn resync_channel_axis(
    visible_axes: &Observable<VisibleAxes>,
    channel_axis: &Observable<Option<AxisKey>>,
) -> Subscription {
    let channel = channel_axis.clone();
    visible_axes.subscribe(move |_| {
        let current = channel.get();
        if current.is_some() {
            channel.set(current);
        }
    })
}

fn validated_lut(lut: LutModel) -> Result<LutModel, MapError> {
    match lut.validate() {
        Ok(()) => Ok(lut),
        Err(err) => Err(MapError::invalid_value(err.to_string())),
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ArrayDisplayModel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ArrayDisplayModel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = ArrayDisplaySnapshot::deserialize(deserializer)?;
        Self::from_snapshot(snapshot).map_err(serde::de::Error::custom)
    }
}
