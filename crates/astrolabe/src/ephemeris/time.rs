//! Astronomical time scales and the Earth-orientation quantities derived from them.
//!
//! `AstroTime` counts days from the J2000 epoch (2000-01-01T12:00:00Z) on two scales:
//! Universal Time, which follows the Earth's rotation, and Terrestrial Time, which is
//! uniform. Sidereal time and the Swiss Ephemeris lookups use UT, obliquity uses TT.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Unix timestamp of the J2000 epoch in milliseconds.
const J2000_UNIX_MS: i64 = 946_728_000_000;
const MS_PER_DAY: f64 = 86_400_000.0;
pub const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AstroTime {
    /// Days since J2000 on the UT scale
    pub ut: f64,
    /// Days since J2000 on the TT scale
    pub tt: f64,
}

impl AstroTime {
    pub fn from_ut(ut: f64) -> Self {
        let tt = ut + delta_t_seconds(ut) / 86_400.0;
        Self { ut, tt }
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let ms = dt.timestamp_millis() - J2000_UNIX_MS;
        Self::from_ut(ms as f64 / MS_PER_DAY)
    }

    pub fn add_days(&self, days: f64) -> Self {
        Self::from_ut(self.ut + days)
    }

    pub fn julian_day_ut(&self) -> f64 {
        self.ut + J2000_JD
    }

    /// Julian centuries of TT since J2000.
    pub fn centuries_tt(&self) -> f64 {
        self.tt / DAYS_PER_CENTURY
    }

    /// Converts back to a civil timestamp, rounded to the millisecond.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        let ms = (self.ut * MS_PER_DAY).round() as i64 + J2000_UNIX_MS;
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Signed shortest arc from `from` to `to`, in (-180, 180].
pub fn shortest_arc(from: f64, to: f64) -> f64 {
    let mut diff = normalize_degrees(to) - normalize_degrees(from);
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff <= -180.0 {
        diff += 360.0;
    }
    diff
}

/// ΔT = TT − UT in seconds, Espenak & Meeus polynomial fits.
pub fn delta_t_seconds(ut: f64) -> f64 {
    let y = 2000.0 + ut / 365.25;
    if y < 1900.0 || y >= 2150.0 {
        let u = (y - 1820.0) / 100.0;
        return -20.0 + 32.0 * u * u;
    }
    if y < 1920.0 {
        let t = y - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
            - 0.000197 * t.powi(4)
    } else if y < 1941.0 {
        let t = y - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
    } else if y < 1961.0 {
        let t = y - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if y < 1986.0 {
        let t = y - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if y < 2005.0 {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if y < 2050.0 {
        let t = y - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t.powi(2)
    } else {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
    }
}

/// Mean obliquity of the ecliptic in degrees: 23.4392911° − 46.815″·T.
pub fn mean_obliquity(time: &AstroTime) -> f64 {
    let t = time.centuries_tt();
    23.4392911 - 46.815 * t / 3600.0
}

/// Nutation in longitude and obliquity (Δψ, Δε), in degrees. Low-precision series.
pub fn nutation(time: &AstroTime) -> (f64, f64) {
    let t = time.centuries_tt();
    let omega = (125.04452 - 1934.136261 * t).to_radians();
    let l_sun = (280.4665 + 36000.7698 * t).to_radians();
    let l_moon = (218.3165 + 481267.8813 * t).to_radians();

    let dpsi = -17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin() - 0.23 * (2.0 * l_moon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps = 9.20 * omega.cos() + 0.57 * (2.0 * l_sun).cos() + 0.10 * (2.0 * l_moon).cos()
        - 0.09 * (2.0 * omega).cos();

    (dpsi / 3600.0, deps / 3600.0)
}

/// Greenwich mean sidereal time in degrees [0, 360).
pub fn greenwich_mean_sidereal_degrees(time: &AstroTime) -> f64 {
    let d = time.ut;
    let t = d / DAYS_PER_CENTURY;
    normalize_degrees(
        280.46061837 + 360.98564736629 * d + 0.000387933 * t * t - t * t * t / 38_710_000.0,
    )
}

/// Greenwich apparent sidereal time in hours [0, 24).
pub fn greenwich_apparent_sidereal_time(time: &AstroTime) -> f64 {
    let (dpsi, deps) = nutation(time);
    let eps = (mean_obliquity(time) + deps).to_radians();
    let gast = greenwich_mean_sidereal_degrees(time) + dpsi * eps.cos();
    normalize_degrees(gast) / 15.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_j2000_epoch_is_day_zero() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let t = AstroTime::from_datetime(dt);
        assert_abs_diff_eq!(t.ut, 0.0, epsilon = 1e-12);
        // ΔT around 2000 is a little over a minute
        assert!(t.tt > t.ut && (t.tt - t.ut) * 86_400.0 < 70.0);
        assert_eq!(t.to_datetime(), dt);
    }

    #[test]
    fn test_gmst_at_j2000() {
        // Meeus: GMST at 2000-01-01 12h UT is 18h 41m 50.5s
        let t = AstroTime::from_ut(0.0);
        let hours = greenwich_mean_sidereal_degrees(&t) / 15.0;
        assert_abs_diff_eq!(hours, 18.697375, epsilon = 1e-4);
        let apparent = greenwich_apparent_sidereal_time(&t);
        assert!((apparent - hours).abs() < 0.001);
    }

    #[test]
    fn test_normalize_and_arc() {
        assert_abs_diff_eq!(normalize_degrees(-30.0), 330.0);
        assert_abs_diff_eq!(normalize_degrees(725.0), 5.0);
        assert_abs_diff_eq!(shortest_arc(359.0, 1.0), 2.0);
        assert_abs_diff_eq!(shortest_arc(1.0, 359.0), -2.0);
    }

    #[test]
    fn test_obliquity_formula() {
        let t = AstroTime { ut: 0.0, tt: 0.0 };
        assert_abs_diff_eq!(mean_obliquity(&t), 23.4392911, epsilon = 1e-12);
        let century = AstroTime { ut: 36_525.0, tt: 36_525.0 };
        assert_abs_diff_eq!(mean_obliquity(&century), 23.4392911 - 46.815 / 3600.0, epsilon = 1e-12);
    }
}
