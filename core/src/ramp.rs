//! Value-to-color threshold ramps.
//!
//! A ramp maps a reading to one of up to three colors (`LOW`, `MED`, `HIGH`).
//! Ramps are built from theme fragments and never fail: anything the theme
//! author got wrong degrades to fewer tiers or to black.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// An RGB triple as used by the display.
///
/// Deserializes from either a `"r, g, b"` string (the theme file convention)
/// or a three element array, and serializes as an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RgbRepr")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ColorParseError {
                input: s.to_owned(),
            });
        }

        let mut channels = [0u8; 3];
        for (channel, part) in channels.iter_mut().zip(&parts) {
            *channel = part.parse().map_err(|_| ColorParseError {
                input: s.to_owned(),
            })?;
        }

        Ok(Self(channels[0], channels[1], channels[2]))
    }
}

/// Error when a color string is not three comma separated 0-255 integers.
#[derive(Debug, thiserror::Error)]
#[error("invalid color '{input}': expected \"r, g, b\" with values 0-255")]
pub struct ColorParseError {
    input: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RgbRepr {
    Text(String),
    Triple([u8; 3]),
}

impl TryFrom<RgbRepr> for Rgb {
    type Error = ColorParseError;

    fn try_from(repr: RgbRepr) -> Result<Self, Self::Error> {
        match repr {
            RgbRepr::Text(text) => text.parse(),
            RgbRepr::Triple([r, g, b]) => Ok(Self(r, g, b)),
        }
    }
}

/// One threshold of a ramp: readings at or above `value` take `color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    pub value: f64,
    pub color: Rgb,
}

impl Tier {
    #[must_use]
    pub const fn new(value: f64, color: Rgb) -> Self {
        Self { value, color }
    }
}

/// A 1-3 tier threshold table.
///
/// `MED` is only kept when its value is above `LOW`'s, and `HIGH` only when
/// `MED` was kept and its value is above `MED`'s. A `MED` tier may stand on
/// its own without `HIGH`.
///
/// # Examples
///
/// ```rust
/// use statscreen_core::ramp::{ColorRamp, Rgb, Tier};
///
/// let ramp = ColorRamp::new(
///     Tier::new(0.0, Rgb::BLACK),
///     Some(Tier::new(50.0, Rgb(255, 255, 0))),
///     Some(Tier::new(80.0, Rgb(255, 0, 0))),
/// );
/// assert_eq!(ramp.color(10.0), Rgb::BLACK);
/// assert_eq!(ramp.color(80.0), Rgb(255, 0, 0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    low: Tier,
    med: Option<Tier>,
    high: Option<Tier>,
}

impl ColorRamp {
    /// Build a ramp, dropping tiers that are out of order.
    #[must_use]
    pub fn new(low: Tier, med: Option<Tier>, high: Option<Tier>) -> Self {
        let med = med.filter(|med| low.value < med.value);
        let high = match med {
            Some(med) => high.filter(|high| med.value < high.value),
            None => None,
        };
        Self { low, med, high }
    }

    /// A ramp that always yields `color`.
    #[must_use]
    pub const fn solid(color: Rgb) -> Self {
        Self {
            low: Tier::new(0.0, color),
            med: None,
            high: None,
        }
    }

    /// Build a ramp from a theme fragment such as `BAR_COLOR` or `FONT_COLOR`.
    ///
    /// Accepts a single color (legacy form), nothing at all (black), or a map
    /// with `LOW`, `MED` and `HIGH` entries each holding `VALUE` and `COLOR`.
    #[must_use]
    pub fn from_spec(spec: Option<&Value>) -> Self {
        match spec {
            None | Some(Value::Null) => Self::solid(Rgb::BLACK),
            Some(color @ (Value::String(_) | Value::Array(_))) => Self::solid(parse_color(color)),
            Some(Value::Object(tiers)) => {
                let Some(low) = tiers.get("LOW").filter(|low| !low.is_null()) else {
                    return Self::solid(Rgb::BLACK);
                };
                let low = Tier::new(
                    low.get("VALUE").and_then(Value::as_f64).unwrap_or(0.0),
                    tier_color(low),
                );
                Self::new(low, optional_tier(tiers.get("MED")), optional_tier(tiers.get("HIGH")))
            }
            Some(other) => {
                log::warn!("Ignoring color ramp of unexpected shape: {other}");
                Self::solid(Rgb::BLACK)
            }
        }
    }

    /// Color for `value`. Boundary values belong to the upper tier, and a
    /// value that compares with nothing (NaN) lands in the top tier.
    #[must_use]
    pub fn color(&self, value: f64) -> Rgb {
        let Some(med) = self.med else {
            return self.low.color;
        };
        if value < med.value {
            return self.low.color;
        }
        match self.high {
            Some(high) if value < high.value => med.color,
            Some(high) => high.color,
            None => med.color,
        }
    }

    #[must_use]
    pub const fn low(&self) -> Tier {
        self.low
    }

    #[must_use]
    pub const fn med(&self) -> Option<Tier> {
        self.med
    }

    #[must_use]
    pub const fn high(&self) -> Option<Tier> {
        self.high
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::solid(Rgb::BLACK)
    }
}

/// `MED`/`HIGH` entries need a numeric `VALUE` to take part at all.
fn optional_tier(entry: Option<&Value>) -> Option<Tier> {
    let entry = entry.filter(|entry| entry.is_object())?;
    let value = entry.get("VALUE").and_then(Value::as_f64)?;
    Some(Tier::new(value, tier_color(entry)))
}

fn tier_color(entry: &Value) -> Rgb {
    entry.get("COLOR").map_or(Rgb::BLACK, parse_color)
}

/// Lenient color parsing for ramps: a bad color is a theme authoring error
/// and shows up as black rather than aborting the display cycle.
pub(crate) fn parse_color(value: &Value) -> Rgb {
    match Rgb::deserialize(value) {
        Ok(color) => color,
        Err(e) => {
            log::warn!("Invalid color {value} in theme, using black: {e}");
            Rgb::BLACK
        }
    }
}
