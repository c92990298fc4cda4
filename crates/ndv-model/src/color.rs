//! Colors and linear colormaps for lookup tables.
//!
//! A [`Colormap`] is a named list of evenly spaced color stops. Values in
//! `[0, 1]` map onto the stops by linear interpolation per channel.
//!
//! Names resolve case-insensitively against a small built-in registry
//! (`gray`, `green`, `viridis`, ...) or as a `#rrggbb` hex color, which
//! yields a ramp from black to that color.

use std::fmt;

use crate::error::ModelError;

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self, ModelError> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ModelError::InvalidColor(text.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ModelError::InvalidColor(text.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel linear interpolation; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Sampled at ten evenly spaced points.
const VIRIDIS: [Rgb; 10] = [
    Rgb::new(0x44, 0x01, 0x54),
    Rgb::new(0x48, 0x28, 0x78),
    Rgb::new(0x3e, 0x49, 0x89),
    Rgb::new(0x31, 0x68, 0x8e),
    Rgb::new(0x26, 0x82, 0x8e),
    Rgb::new(0x1f, 0x9e, 0x89),
    Rgb::new(0x35, 0xb7, 0x79),
    Rgb::new(0x6e, 0xce, 0x58),
    Rgb::new(0xb5, 0xde, 0x2b),
    Rgb::new(0xfd, 0xe7, 0x25),
];

fn builtin(name: &str) -> Option<Vec<Rgb>> {
    let ramp = |to: Rgb| vec![Rgb::BLACK, to];
    let stops = match name {
        "gray" => ramp(Rgb::WHITE),
        "gray_r" => vec![Rgb::WHITE, Rgb::BLACK],
        "green" => ramp(Rgb::new(0, 255, 0)),
        "red" => ramp(Rgb::new(255, 0, 0)),
        "blue" => ramp(Rgb::new(0, 0, 255)),
        "cyan" => ramp(Rgb::new(0, 255, 255)),
        "magenta" => ramp(Rgb::new(255, 0, 255)),
        "yellow" => ramp(Rgb::new(255, 255, 0)),
        "viridis" => VIRIDIS.to_vec(),
        _ => return None,
    };
    Some(stops)
}

/// A named, linearly interpolated colormap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Colormap {
    name: String,
    stops: Vec<Rgb>,
}

impl Colormap {
    /// Names of the built-in colormaps.
    pub const BUILTIN: [&'static str; 9] = [
        "gray", "gray_r", "green", "red", "blue", "cyan", "magenta", "yellow", "viridis",
    ];

    /// Resolve a built-in name or a `#rrggbb` color.
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        let key = name.trim().to_ascii_lowercase();
        if key.starts_with('#') {
            let color = Rgb::from_hex(&key)?;
            return Ok(Self {
                name: color.to_hex(),
                stops: vec![Rgb::BLACK, color],
            });
        }
        let canonical = if key == "grey" { "gray".to_string() } else { key };
        builtin(&canonical)
            .map(|stops| Self {
                name: canonical,
                stops,
            })
            .ok_or_else(|| ModelError::UnknownColormap(name.to_string()))
    }

    /// A custom colormap from at least two stops.
    pub fn from_stops(name: impl Into<String>, stops: Vec<Rgb>) -> Result<Self, ModelError> {
        let name = name.into();
        if stops.len() < 2 {
            return Err(ModelError::UnknownColormap(format!(
                "{name} (needs at least 2 stops, got {})",
                stops.len()
            )));
        }
        Ok(Self { name, stops })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Color at `t` in `[0, 1]`; out-of-range values clamp, NaN maps to the
    /// first stop.
    #[must_use]
    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (self.stops.len() - 1) as f64;
        let pos = t * segments;
        let lower = (pos.floor() as usize).min(self.stops.len() - 2);
        self.stops[lower].lerp(self.stops[lower + 1], pos - lower as f64)
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self {
            name: "gray".to_string(),
            stops: vec![Rgb::BLACK, Rgb::WHITE],
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl std::str::FromStr for Colormap {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    //! A colormap that [`Colormap::from_name`] can rebuild serializes as its
    //! name; any other (custom stops) serializes as `{name, stops}`.

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Colormap, Rgb};

    #[derive(Serialize, Deserialize)]
    struct CustomStops {
        name: String,
        stops: Vec<Rgb>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ColormapRepr {
        Name(String),
        Custom(CustomStops),
    }

    impl Serialize for Colormap {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match Colormap::from_name(&self.name) {
                Ok(named) if named == *self => serializer.serialize_str(&self.name),
                _ => CustomStops {
                    name: self.name.clone(),
                    stops: self.stops.clone(),
                }
                .serialize(serializer),
            }
        }
    }

    impl<'de> Deserialize<'de> for Colormap {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let cmap = match ColormapRepr::deserialize(deserializer)? {
                ColormapRepr::Name(name) => Colormap::from_name(&name),
                ColormapRepr::Custom(custom) => Colormap::from_stops(custom.name, custom.stops),
            };
            cmap.map_err(serde::de::Error::custom)
        }
    }
}
