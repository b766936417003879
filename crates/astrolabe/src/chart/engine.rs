//! Sign and angle calculator.
//!
//! A chart is a pure function of the instant, the location and the ephemeris. The
//! engine holds no state beyond a borrowed ephemeris, so it is safe to share.

use chrono::{DateTime, Duration, Utc};

use crate::chart::types::{BodyFailure, BodyPosition, ChartError, ChartResult, PlacedBody};
use crate::ephemeris::time::{mean_obliquity, normalize_degrees, shortest_arc};
use crate::ephemeris::{AstroTime, Body, Ephemeris, EphemerisError, GeoLocation};
use crate::western::{degree_in_sign, sign_of, SignPlacement};

/// Local sidereal time in hours [0, 24).
pub fn local_sidereal_time(gst_hours: f64, longitude: f64) -> f64 {
    (gst_hours + longitude / 15.0 + 24.0).rem_euclid(24.0)
}

/// `atan2(−cos LST, sin LST·cos ε + tan φ·sin ε)`, degrees [0, 360).
pub fn ascendant(lst_hours: f64, obliquity: f64, latitude: f64) -> f64 {
    let lst = lst_hours * std::f64::consts::PI / 12.0;
    let e = obliquity.to_radians();
    let phi = latitude.to_radians();
    let asc = (-lst.cos()).atan2(lst.sin() * e.cos() + phi.tan() * e.sin());
    normalize_degrees(asc.to_degrees())
}

/// `atan2(sin LST, cos LST·cos ε)`, degrees [0, 360).
pub fn midheaven(lst_hours: f64, obliquity: f64) -> f64 {
    let lst = lst_hours * std::f64::consts::PI / 12.0;
    let e = obliquity.to_radians();
    normalize_degrees(lst.sin().atan2(lst.cos() * e.cos()).to_degrees())
}

/// Twelve cusps 30° apart starting at the ascendant.
pub fn equal_houses(ascendant: f64) -> [f64; 12] {
    std::array::from_fn(|i| normalize_degrees(ascendant + 30.0 * i as f64))
}

pub struct ChartEngine<'a> {
    ephemeris: &'a dyn Ephemeris,
}

impl<'a> ChartEngine<'a> {
    pub fn new(ephemeris: &'a dyn Ephemeris) -> Self {
        Self { ephemeris }
    }

    /// Sun through Mars, the angles and equal houses for a birth instant and place.
    pub fn compute_chart(
        &self,
        instant: DateTime<Utc>,
        lat: f64,
        lon: f64,
    ) -> Result<ChartResult, ChartError> {
        self.compute_chart_for(instant, lat, lon, &Body::PERSONAL)
    }

    /// As `compute_chart`, for an arbitrary list of bodies.
    pub fn compute_chart_for(
        &self,
        instant: DateTime<Utc>,
        lat: f64,
        lon: f64,
        bodies: &[Body],
    ) -> Result<ChartResult, ChartError> {
        let location = GeoLocation::new(lat, lon);
        if !location.is_valid() {
            return Err(ChartError::InvalidCoordinates { lat, lon });
        }
        let time = AstroTime::from_datetime(instant);

        let mut placed = Vec::with_capacity(bodies.len());
        let mut failed = Vec::new();
        for &body in bodies {
            match self.ephemeris.geo_vector(body, &time) {
                Ok(v) => placed.push(PlacedBody {
                    body,
                    placement: SignPlacement::new(v.lon),
                }),
                Err(e) => {
                    log::warn!("Omitting {} from chart at {}: {}", body, instant, e);
                    failed.push(BodyFailure {
                        body,
                        message: e.to_string(),
                    });
                }
            }
        }

        let lst = local_sidereal_time(self.ephemeris.sidereal_time(&time), lon);
        let obliquity = mean_obliquity(&time);
        let asc = ascendant(lst, obliquity, lat);
        let mc = midheaven(lst, obliquity);

        Ok(ChartResult {
            instant,
            location,
            bodies: placed,
            ascendant: SignPlacement::new(asc),
            midheaven: SignPlacement::new(mc),
            houses: equal_houses(asc),
            failed,
        })
    }

    /// Forward estimate of angular speed in degrees/day from a one-hour step.
    pub fn planet_speed(&self, body: Body, instant: DateTime<Utc>) -> Result<f64, EphemerisError> {
        let t0 = AstroTime::from_datetime(instant);
        let t1 = AstroTime::from_datetime(instant + Duration::hours(1));
        let lon0 = self.ephemeris.geo_vector(body, &t0)?.lon;
        let lon1 = self.ephemeris.geo_vector(body, &t1)?.lon;
        Ok(shortest_arc(lon0, lon1) * 24.0)
    }

    pub fn body_position(&self, body: Body, instant: DateTime<Utc>) -> Result<BodyPosition, EphemerisError> {
        let v = self
            .ephemeris
            .geo_vector(body, &AstroTime::from_datetime(instant))?;
        let speed = self.planet_speed(body, instant)?;
        Ok(BodyPosition {
            body,
            longitude: v.lon,
            latitude: v.lat,
            distance: v.dist,
            speed,
            retrograde: body.can_retrograde() && speed < 0.0,
            sign: sign_of(v.lon),
            degree: degree_in_sign(v.lon),
        })
    }

    /// Positions of every requested body, with failures split out.
    pub fn positions(&self, bodies: &[Body], instant: DateTime<Utc>) -> (Vec<BodyPosition>, Vec<BodyFailure>) {
        let mut positions = Vec::with_capacity(bodies.len());
        let mut failed = Vec::new();
        for &body in bodies {
            match self.body_position(body, instant) {
                Ok(p) => positions.push(p),
                Err(e) => {
                    log::warn!("No position for {} at {}: {}", body, instant, e);
                    failed.push(BodyFailure {
                        body,
                        message: e.to_string(),
                    });
                }
            }
        }
        (positions, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lst_wraps() {
        assert_abs_diff_eq!(local_sidereal_time(23.0, 30.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(local_sidereal_time(1.0, -30.0), 23.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angles_at_lst_zero() {
        // sin LST = 0, cos LST = 1
        assert_abs_diff_eq!(midheaven(0.0, 23.44), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ascendant(0.0, 23.44, 0.0), 270.0, epsilon = 1e-9);
        // cos LST = -1 puts the ascendant at 90° on the equator
        assert_abs_diff_eq!(ascendant(12.0, 23.44, 0.0), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equal_houses_wrap() {
        let houses = equal_houses(350.0);
        assert_eq!(houses[0], 350.0);
        assert_abs_diff_eq!(houses[1], 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(houses[11], 320.0, epsilon = 1e-12);
    }
}
