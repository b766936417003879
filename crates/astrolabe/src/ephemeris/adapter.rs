use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::ephemeris::time::{greenwich_apparent_sidereal_time, normalize_degrees, shortest_arc, AstroTime};
use crate::ephemeris::types::{Body, EclipseBody, EclipseEvent, EclipseKind, EclipticVector};

/// Errors that can occur during ephemeris calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Failed to calculate position for {body} at {datetime}: {message}")]
    CalculationFailed {
        body: Body,
        datetime: DateTime<Utc>,
        message: String,
    },
    #[error("No {kind} eclipse found within {lunations} lunations of {datetime}")]
    EclipseNotFound {
        kind: &'static str,
        lunations: usize,
        datetime: DateTime<Utc>,
    },
}

/// Step used when bracketing a moon-phase crossing, in days.
const PHASE_SCAN_STEP: f64 = 0.25;
/// Bisection stops once the bracket is narrower than this (about 0.1 s).
const PHASE_TOLERANCE_DAYS: f64 = 1e-6;
/// Syzygies examined before an eclipse search gives up. Eclipse seasons recur every
/// ~173 days, so one lunar and one solar eclipse always fall inside this window.
const ECLIPSE_SEARCH_LUNATIONS: usize = 15;

/// |β| limits of the Moon at full moon, degrees.
const LUNAR_TOTAL_LIMIT: f64 = 0.44;
const LUNAR_PARTIAL_LIMIT: f64 = 0.96;
const LUNAR_PENUMBRAL_LIMIT: f64 = 1.54;
/// |β| limits of the Moon at new moon, degrees.
const SOLAR_LIMIT: f64 = 1.58;
const SOLAR_CENTRAL_LIMIT: f64 = 0.93;

const MOON_RADIUS_EARTH_RADII: f64 = 0.2725;
const EARTH_RADIUS_AU: f64 = 4.263_52e-5;
/// Solar semidiameter at 1 AU, degrees.
const SUN_SEMIDIAMETER_1AU: f64 = 0.2666;

/// Source of apparent geocentric positions.
///
/// Backends only have to provide `geo_vector`. Sidereal time, the lunar phase quantities
/// and the phase/eclipse searches are derived from it, so every backend answers them
/// consistently with its own positions.
pub trait Ephemeris: Send + Sync {
    /// Apparent geocentric ecliptic vector of date (light-time, aberration and nutation applied).
    fn geo_vector(&self, body: Body, time: &AstroTime) -> Result<EclipticVector, EphemerisError>;

    /// Greenwich apparent sidereal time, hours [0, 24).
    fn sidereal_time(&self, time: &AstroTime) -> f64 {
        greenwich_apparent_sidereal_time(time)
    }

    /// Moon minus Sun ecliptic longitude in [0, 360): 0 new, 90 first quarter, 180 full.
    fn moon_phase(&self, time: &AstroTime) -> Result<f64, EphemerisError> {
        let moon = self.geo_vector(Body::Moon, time)?;
        let sun = self.geo_vector(Body::Sun, time)?;
        Ok(normalize_degrees(moon.lon - sun.lon))
    }

    /// Illuminated fraction of the lunar disc, [0, 1].
    fn illumination(&self, time: &AstroTime) -> Result<f64, EphemerisError> {
        let moon = self.geo_vector(Body::Moon, time)?;
        let sun = self.geo_vector(Body::Sun, time)?;
        let cos_elongation =
            moon.lat.to_radians().cos() * (moon.lon - sun.lon).to_radians().cos();
        Ok(((1.0 - cos_elongation) / 2.0).clamp(0.0, 1.0))
    }

    /// First instant after `start` at which the phase angle equals `target`, searching at
    /// most `limit_days` ahead. `Ok(None)` when it does not occur in the window.
    fn search_moon_phase(
        &self,
        target: f64,
        start: &AstroTime,
        limit_days: f64,
    ) -> Result<Option<AstroTime>, EphemerisError> {
        let offset = |t: &AstroTime| -> Result<f64, EphemerisError> {
            Ok(shortest_arc(target, self.moon_phase(t)?))
        };

        let mut t1 = *start;
        let mut f1 = offset(&t1)?;
        let mut elapsed = 0.0;
        while elapsed < limit_days {
            let step = PHASE_SCAN_STEP.min(limit_days - elapsed);
            let t2 = t1.add_days(step);
            let f2 = offset(&t2)?;
            elapsed += step;

            // The phase only increases, so a crossing is a rise through zero; the jump
            // from +180 to -180 on the far side is ignored.
            if f1 < 0.0 && f2 >= 0.0 && f2 - f1 < 90.0 {
                return bisect_phase(&offset, t1, t2).map(Some);
            }
            t1 = t2;
            f1 = f2;
        }
        Ok(None)
    }

    /// Next lunar eclipse peaking at or after `start`.
    fn search_lunar_eclipse(&self, start: &AstroTime) -> Result<EclipseEvent, EphemerisError> {
        let mut cursor = *start;
        for _ in 0..ECLIPSE_SEARCH_LUNATIONS {
            let Some(full) = self.search_moon_phase(180.0, &cursor, 40.0)? else {
                break;
            };
            let beta = self.geo_vector(Body::Moon, &full)?.lat.abs();
            let kind = if beta < LUNAR_TOTAL_LIMIT {
                Some(EclipseKind::Total)
            } else if beta < LUNAR_PARTIAL_LIMIT {
                Some(EclipseKind::Partial)
            } else if beta < LUNAR_PENUMBRAL_LIMIT {
                Some(EclipseKind::Penumbral)
            } else {
                None
            };
            if let Some(kind) = kind {
                return Ok(EclipseEvent {
                    body: EclipseBody::Lunar,
                    kind,
                    peak: full,
                });
            }
            cursor = full.add_days(10.0);
        }
        Err(EphemerisError::EclipseNotFound {
            kind: "lunar",
            lunations: ECLIPSE_SEARCH_LUNATIONS,
            datetime: start.to_datetime(),
        })
    }

    /// Next solar eclipse peaking at or after `start`.
    fn search_solar_eclipse(&self, start: &AstroTime) -> Result<EclipseEvent, EphemerisError> {
        let mut cursor = *start;
        for _ in 0..ECLIPSE_SEARCH_LUNATIONS {
            let Some(new) = self.search_moon_phase(0.0, &cursor, 40.0)? else {
                break;
            };
            let moon = self.geo_vector(Body::Moon, &new)?;
            let beta = moon.lat.abs();
            if beta < SOLAR_LIMIT {
                let kind = if beta < SOLAR_CENTRAL_LIMIT {
                    let sun = self.geo_vector(Body::Sun, &new)?;
                    let moon_sd = (MOON_RADIUS_EARTH_RADII * EARTH_RADIUS_AU / moon.dist)
                        .asin()
                        .to_degrees();
                    let sun_sd = SUN_SEMIDIAMETER_1AU / sun.dist;
                    if moon_sd > sun_sd {
                        EclipseKind::Total
                    } else {
                        EclipseKind::Annular
                    }
                } else {
                    EclipseKind::Partial
                };
                return Ok(EclipseEvent {
                    body: EclipseBody::Solar,
                    kind,
                    peak: new,
                });
            }
            cursor = new.add_days(10.0);
        }
        Err(EphemerisError::EclipseNotFound {
            kind: "solar",
            lunations: ECLIPSE_SEARCH_LUNATIONS,
            datetime: start.to_datetime(),
        })
    }
}

fn bisect_phase<F>(offset: &F, mut lo: AstroTime, mut hi: AstroTime) -> Result<AstroTime, EphemerisError>
where
    F: Fn(&AstroTime) -> Result<f64, EphemerisError>,
{
    while hi.ut - lo.ut > PHASE_TOLERANCE_DAYS {
        let mid = AstroTime::from_ut((lo.ut + hi.ut) / 2.0);
        if offset(&mid)? < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(hi)
}
