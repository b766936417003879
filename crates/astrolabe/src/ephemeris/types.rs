use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ephemeris::time::AstroTime;

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

impl GeoLocation {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180], both finite.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// The bodies the engine knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    pub const ALL: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Bodies stored on a birth chart.
    pub const PERSONAL: [Body; 5] = [Body::Sun, Body::Moon, Body::Mercury, Body::Venus, Body::Mars];

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Body::Sun => "☉",
            Body::Moon => "☽",
            Body::Mercury => "☿",
            Body::Venus => "♀",
            Body::Mars => "♂",
            Body::Jupiter => "♃",
            Body::Saturn => "♄",
            Body::Uranus => "♅",
            Body::Neptune => "♆",
            Body::Pluto => "♇",
        }
    }

    /// The luminaries never station, so they are never flagged retrograde.
    pub fn can_retrograde(self) -> bool {
        !matches!(self, Body::Sun | Body::Moon)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Body::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown body: {}", s))
    }
}

/// Apparent geocentric ecliptic coordinates of date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipticVector {
    /// Longitude in degrees [0, 360)
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Distance from the Earth's center in AU
    pub dist: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EclipseBody {
    Lunar,
    Solar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EclipseKind {
    Penumbral,
    Partial,
    Annular,
    Total,
}

impl EclipseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EclipseKind::Penumbral => "penumbral",
            EclipseKind::Partial => "partial",
            EclipseKind::Annular => "annular",
            EclipseKind::Total => "total",
        }
    }
}

/// An eclipse found by the adapter's syzygy search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseEvent {
    pub body: EclipseBody,
    pub kind: EclipseKind,
    pub peak: AstroTime,
}
