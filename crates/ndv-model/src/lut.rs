//! Per-channel lookup-table settings.
//!
//! # Invariants
//!
//! 1. A [`LutModel`] that passed [`LutModel::validate`] has a finite,
//!    positive `gamma`, ordered finite `clims`, and autoscale quantiles
//!    inside `[0, 1]` with `lo <= hi`.
//! 2. A bare colormap name converts to the default LUT with only `cmap`
//!    replaced; `LutModel::try_from("green")` and
//!    `LutModel::default().with_cmap("green")` are equal.

use std::fmt;

use crate::color::{Colormap, Rgb};
use crate::error::ModelError;

/// How contrast limits follow the data when `clims` is unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Autoscale {
    /// Never derive limits from data.
    Off,
    /// Use the `(lo, hi)` quantiles of the finite data; `(0, 1)` is min/max.
    Quantiles(f64, f64),
}

impl Default for Autoscale {
    fn default() -> Self {
        Self::Quantiles(0.0, 1.0)
    }
}

impl fmt::Display for Autoscale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("false"),
            Self::Quantiles(lo, hi) => write!(f, "({lo}, {hi})"),
        }
    }
}

/// Display settings for one channel of an array.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "serde_repr::LutModelRepr"))]
pub struct LutModel {
    /// Whether the channel is drawn at all.
    pub visible: bool,
    pub cmap: Colormap,
    /// Explicit contrast limits. `None` defers to `autoscale`.
    pub clims: Option<(f64, f64)>,
    pub gamma: f64,
    pub autoscale: Autoscale,
}

impl Default for LutModel {
    fn default() -> Self {
        Self {
            visible: true,
            cmap: Colormap::default(),
            clims: None,
            gamma: 1.0,
            autoscale: Autoscale::default(),
        }
    }
}

impl LutModel {
    /// Replace the colormap by name.
    pub fn with_cmap(mut self, name: &str) -> Result<Self, ModelError> {
        self.cmap = Colormap::from_name(name)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn with_clims(mut self, lo: f64, hi: f64) -> Self {
        self.clims = Some((lo, hi));
        self
    }

    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    #[must_use]
    pub fn with_autoscale(mut self, autoscale: Autoscale) -> Self {
        self.autoscale = autoscale;
        self
    }

    /// Check the numeric settings; see the module invariants.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(ModelError::InvalidLut(format!(
                "gamma must be positive and finite, got {}",
                self.gamma
            )));
        }
        if let Some((lo, hi)) = self.clims
            && !(lo.is_finite() && hi.is_finite() && lo <= hi)
        {
            return Err(ModelError::InvalidLut(format!(
                "clims must be finite and ordered, got ({lo}, {hi})"
            )));
        }
        if let Autoscale::Quantiles(lo, hi) = self.autoscale
            && !((0.0..=1.0).contains(&lo) && (0.0..=1.0).contains(&hi) && lo <= hi)
        {
            return Err(ModelError::InvalidLut(format!(
                "autoscale quantiles must satisfy 0 <= lo <= hi <= 1, got ({lo}, {hi})"
            )));
        }
        Ok(())
    }

    /// Contrast limits to use for `data`: explicit `clims` when set,
    /// otherwise the autoscale quantiles of the finite values.
    ///
    /// Returns `None` when autoscaling is off and no limits are set, or when
    /// `data` holds no finite values.
    #[must_use]
    pub fn resolve_clims(&self, data: &[f64]) -> Option<(f64, f64)> {
        if let Some(clims) = self.clims {
            return Some(clims);
        }
        let Autoscale::Quantiles(lo, hi) = self.autoscale else {
            return None;
        };
        let mut finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(f64::total_cmp);
        Some((quantile(&finite, lo), quantile(&finite, hi)))
    }

    /// Color for `value` under `clims`, after gamma correction.
    #[must_use]
    pub fn map_value(&self, value: f64, clims: (f64, f64)) -> Rgb {
        let (lo, hi) = clims;
        let t = if hi > lo {
            ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
        } else if value > lo {
            1.0
        } else {
            0.0
        };
        self.cmap.at(t.powf(self.gamma))
    }
}

/// Linear-interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

impl TryFrom<&str> for LutModel {
    type Error = ModelError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::default().with_cmap(name)
    }
}

impl TryFrom<String> for LutModel {
    type Error = ModelError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::try_from(name.as_str())
    }
}

impl From<Colormap> for LutModel {
    fn from(cmap: Colormap) -> Self {
        Self {
            cmap,
            ..Self::default()
        }
    }
}

impl fmt::Display for LutModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LutModel(visible={}, cmap={}, clims=", self.visible, self.cmap)?;
        match self.clims {
            Some((lo, hi)) => write!(f, "({lo}, {hi})")?,
            None => f.write_str("None")?,
        }
        write!(f, ", gamma={}, autoscale={})", self.gamma, self.autoscale)
    }
}

#[cfg(feature = "serde")]
mod serde_repr {
    //! Wire forms: a LUT is either a bare colormap name or an object whose
    //! missing fields take their defaults. Autoscale is `true`/`false` or a
    //! `[lo, hi]` pair.

    use serde::{Deserialize, Serialize, Serializer};

    use super::{Autoscale, LutModel};
    use crate::color::Colormap;
    use crate::error::ModelError;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum LutModelRepr {
        Cmap(String),
        Fields(LutFields),
    }

    #[derive(Deserialize)]
    #[serde(default)]
    pub(super) struct LutFields {
        visible: bool,
        cmap: Colormap,
        clims: Option<(f64, f64)>,
        gamma: f64,
        autoscale: Autoscale,
    }

    impl Default for LutFields {
        fn default() -> Self {
            let LutModel {
                visible,
                cmap,
                clims,
                gamma,
                autoscale,
            } = LutModel::default();
            Self {
                visible,
                cmap,
                clims,
                gamma,
                autoscale,
            }
        }
    }

    impl TryFrom<LutModelRepr> for LutModel {
        type Error = ModelError;

        fn try_from(repr: LutModelRepr) -> Result<Self, Self::Error> {
            let lut = match repr {
                LutModelRepr::Cmap(name) => LutModel::try_from(name)?,
                LutModelRepr::Fields(f) => LutModel {
                    visible: f.visible,
                    cmap: f.cmap,
                    clims: f.clims,
                    gamma: f.gamma,
                    autoscale: f.autoscale,
                },
            };
            lut.validate()?;
            Ok(lut)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AutoscaleRepr {
        Flag(bool),
        Range(f64, f64),
    }

    impl Serialize for Autoscale {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Autoscale::Off => serializer.serialize_bool(false),
                Autoscale::Quantiles(lo, hi) => (lo, hi).serialize(serializer),
            }
        }
    }

    impl<'de> Deserialize<'de> for Autoscale {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Ok(match AutoscaleRepr::deserialize(deserializer)? {
                AutoscaleRepr::Flag(true) => Autoscale::Quantiles(0.0, 1.0),
                AutoscaleRepr::Flag(false) => Autoscale::Off,
                AutoscaleRepr::Range(lo, hi) => Autoscale::Quantiles(lo, hi),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_sets_only_cmap() {
        let lut = LutModel::try_from("green").unwrap();
        assert_eq!(lut.cmap.name(), "green");
        assert_eq!(lut, LutModel::default().with_cmap("green").unwrap());
        assert!(lut.visible);
        assert_eq!(lut.gamma, 1.0);
        assert_eq!(lut.clims, None);
        assert_eq!(lut.autoscale, Autoscale::Quantiles(0.0, 1.0));
    }

    #[test]
    fn unknown_name_fails() {
        assert!(matches!(
            LutModel::try_from("nope"),
            Err(ModelError::UnknownColormap(_))
        ));
    }

    #[test]
    fn display_format() {
        let lut = LutModel::try_from("green").unwrap();
        assert_eq!(
            lut.to_string(),
            "LutModel(visible=true, cmap=green, clims=None, gamma=1, autoscale=(0, 1))"
        );
        let custom = LutModel::default()
            .with_clims(0.0, 4095.0)
            .with_autoscale(Autoscale::Off)
            .with_visible(false);
        assert_eq!(
            custom.to_string(),
            "LutModel(visible=false, cmap=gray, clims=(0, 4095), gamma=1, autoscale=false)"
        );
    }

    #[test]
    fn validate_rejects_bad_numbers() {
        assert!(LutModel::default().validate().is_ok());
        assert!(LutModel::default().with_gamma(0.0).validate().is_err());
        assert!(LutModel::default().with_gamma(f64::NAN).validate().is_err());
        assert!(LutModel::default().with_clims(5.0, 1.0).validate().is_err());
        assert!(
            LutModel::default()
                .with_autoscale(Autoscale::Quantiles(0.2, 1.5))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn explicit_clims_win() {
        let lut = LutModel::default().with_clims(10.0, 20.0);
        assert_eq!(lut.resolve_clims(&[0.0, 100.0]), Some((10.0, 20.0)));
    }

    #[test]
    fn autoscale_min_max_and_quantiles() {
        let data = [4.0, f64::NAN, 0.0, 2.0, f64::INFINITY, 8.0, 6.0];
        let lut = LutModel::default();
        assert_eq!(lut.resolve_clims(&data), Some((0.0, 8.0)));

        let q = LutModel::default().with_autoscale(Autoscale::Quantiles(0.25, 0.75));
        assert_eq!(q.resolve_clims(&data), Some((2.0, 6.0)));

        let off = LutModel::default().with_autoscale(Autoscale::Off);
        assert_eq!(off.resolve_clims(&data), None);
        assert_eq!(lut.resolve_clims(&[f64::NAN]), None);
    }

    #[test]
    fn map_value_applies_gamma() {
        let lut = LutModel::default();
        assert_eq!(lut.map_value(0.0, (0.0, 10.0)), Rgb::BLACK);
        assert_eq!(lut.map_value(10.0, (0.0, 10.0)), Rgb::WHITE);
        assert_eq!(lut.map_value(5.0, (0.0, 10.0)), Rgb::new(128, 128, 128));

        let dark = LutModel::default().with_gamma(2.0);
        assert_eq!(dark.map_value(5.0, (0.0, 10.0)), Rgb::new(64, 64, 64));
        assert_eq!(lut.map_value(3.0, (3.0, 3.0)), Rgb::BLACK);
        assert_eq!(lut.map_value(4.0, (3.0, 3.0)), Rgb::WHITE);
    }
}
