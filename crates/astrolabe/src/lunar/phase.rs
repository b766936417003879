use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ephemeris::time::normalize_degrees;
use crate::ephemeris::{AstroTime, Ephemeris, EphemerisError};

/// Mean synodic month used for the age approximation, days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53;

/// The eight 45° octants of the lunation, each starting at a multiple of 45°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhaseName {
    const OCTANTS: [MoonPhaseName; 8] = [
        MoonPhaseName::NewMoon,
        MoonPhaseName::WaxingCrescent,
        MoonPhaseName::FirstQuarter,
        MoonPhaseName::WaxingGibbous,
        MoonPhaseName::FullMoon,
        MoonPhaseName::WaningGibbous,
        MoonPhaseName::LastQuarter,
        MoonPhaseName::WaningCrescent,
    ];

    /// Phase angle 0 = new, 180 = full. Wraps at 360.
    pub fn from_angle(phase: f64) -> Self {
        let octant = (normalize_degrees(phase) / 45.0).floor() as usize;
        Self::OCTANTS[octant.min(7)]
    }

    pub fn name(self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "New Moon",
            MoonPhaseName::WaxingCrescent => "Waxing Crescent",
            MoonPhaseName::FirstQuarter => "First Quarter",
            MoonPhaseName::WaxingGibbous => "Waxing Gibbous",
            MoonPhaseName::FullMoon => "Full Moon",
            MoonPhaseName::WaningGibbous => "Waning Gibbous",
            MoonPhaseName::LastQuarter => "Last Quarter",
            MoonPhaseName::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "🌑",
            MoonPhaseName::WaxingCrescent => "🌒",
            MoonPhaseName::FirstQuarter => "🌓",
            MoonPhaseName::WaxingGibbous => "🌔",
            MoonPhaseName::FullMoon => "🌕",
            MoonPhaseName::WaningGibbous => "🌖",
            MoonPhaseName::LastQuarter => "🌗",
            MoonPhaseName::WaningCrescent => "🌘",
        }
    }
}

impl fmt::Display for MoonPhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonPhaseSnapshot {
    /// Phase angle in degrees, [0, 360)
    pub phase: f64,
    pub name: MoonPhaseName,
    pub emoji: String,
    /// Illuminated fraction as a percentage
    pub illumination: f64,
    /// Days since the last new moon
    pub age: f64,
}

impl MoonPhaseSnapshot {
    pub fn from_measurements(phase: f64, illumination_fraction: f64) -> Self {
        let phase = normalize_degrees(phase);
        let name = MoonPhaseName::from_angle(phase);
        Self {
            phase,
            name,
            emoji: name.emoji().to_string(),
            illumination: illumination_fraction * 100.0,
            age: phase / 360.0 * SYNODIC_MONTH_DAYS,
        }
    }
}

pub fn moon_phase(ephemeris: &dyn Ephemeris, instant: DateTime<Utc>) -> Result<MoonPhaseSnapshot, EphemerisError> {
    let time = AstroTime::from_datetime(instant);
    let phase = ephemeris.moon_phase(&time)?;
    let illumination = ephemeris.illumination(&time)?;
    Ok(MoonPhaseSnapshot::from_measurements(phase, illumination))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octant_boundaries() {
        assert_eq!(MoonPhaseName::from_angle(0.0), MoonPhaseName::NewMoon);
        assert_eq!(MoonPhaseName::from_angle(44.9), MoonPhaseName::NewMoon);
        assert_eq!(MoonPhaseName::from_angle(45.1), MoonPhaseName::WaxingCrescent);
        assert_eq!(MoonPhaseName::from_angle(180.0), MoonPhaseName::FullMoon);
        assert_eq!(MoonPhaseName::from_angle(359.9), MoonPhaseName::WaningCrescent);
        assert_eq!(MoonPhaseName::from_angle(360.0), MoonPhaseName::NewMoon);
    }

    #[test]
    fn test_snapshot_age_and_percentage() {
        let snap = MoonPhaseSnapshot::from_measurements(180.0, 0.995);
        assert!((snap.age - 14.765).abs() < 1e-9);
        assert!((snap.illumination - 99.5).abs() < 1e-9);
        assert_eq!(snap.emoji, "🌕");
    }
}
