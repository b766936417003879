use std::env;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use swisseph::swe::calc_ut;

use crate::ephemeris::adapter::{Ephemeris, EphemerisError};
use crate::ephemeris::time::{normalize_degrees, AstroTime};
use crate::ephemeris::types::{Body, EclipticVector};

/// FLG_SWIEPH | FLG_SPEED
const DATA_FILE_FLAGS: u32 = 2 | 256;
/// FLG_MOSEPH | FLG_SPEED
const MOSHIER_FLAGS: u32 = 4 | 256;

/// Read by the library the first time it computes anything.
const LIBRARY_PATH_ENV: &str = "SE_EPHE_PATH";
const DEFAULT_DATA_DIR: &str = "/usr/local/share/swisseph";

/// The Swiss Ephemeris C library keeps its state in globals.
static SWISS_LOCK: Mutex<()> = Mutex::new(());

fn body_code(body: Body) -> u32 {
    match body {
        Body::Sun => 0,
        Body::Moon => 1,
        Body::Mercury => 2,
        Body::Venus => 3,
        Body::Mars => 4,
        Body::Jupiter => 5,
        Body::Saturn => 6,
        Body::Uranus => 7,
        Body::Neptune => 8,
        Body::Pluto => 9,
    }
}

/// Where positions come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SwissSource {
    /// `.se1` data files in this directory
    DataFiles(PathBuf),
    /// The library's built-in Moshier theory; needs no files
    Moshier,
}

/// Swiss Ephemeris backend.
pub struct SwissEphemerisAdapter {
    source: SwissSource,
}

impl SwissEphemerisAdapter {
    /// Use the data files at `ephemeris_path`, else `SWISS_EPHEMERIS_PATH`, else the
    /// system directory. Fails with `FileNotFound` when the directory does not exist.
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
        });

        if !path.exists() {
            return Err(EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }

        env::set_var(LIBRARY_PATH_ENV, &path);
        log::info!("Swiss Ephemeris data directory: {}", path.display());
        Ok(Self {
            source: SwissSource::DataFiles(path),
        })
    }

    /// Positions from the built-in Moshier theory (about one arc-second for the planets).
    pub fn moshier() -> Self {
        Self {
            source: SwissSource::Moshier,
        }
    }

    /// Data files when a directory can be found, otherwise Moshier. An explicitly
    /// configured path that is missing is still an error.
    pub fn discover(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let explicit = ephemeris_path.is_some();
        match Self::new(ephemeris_path) {
            Ok(adapter) => Ok(adapter),
            Err(EphemerisError::FileNotFound { path, .. }) if !explicit => {
                log::warn!("No Swiss Ephemeris files at {}, using the Moshier theory", path);
                Ok(Self::moshier())
            }
            Err(e) => Err(e),
        }
    }

    pub fn source(&self) -> &SwissSource {
        &self.source
    }

    pub fn ephemeris_path(&self) -> Option<&Path> {
        match &self.source {
            SwissSource::DataFiles(path) => Some(path),
            SwissSource::Moshier => None,
        }
    }

    fn flags(&self) -> u32 {
        match self.source {
            SwissSource::DataFiles(_) => DATA_FILE_FLAGS,
            SwissSource::Moshier => MOSHIER_FLAGS,
        }
    }
}

impl Ephemeris for SwissEphemerisAdapter {
    fn geo_vector(&self, body: Body, time: &AstroTime) -> Result<EclipticVector, EphemerisError> {
        let failed = |message: String| EphemerisError::CalculationFailed {
            body,
            datetime: time.to_datetime(),
            message,
        };

        let result = {
            let _guard = SWISS_LOCK
                .lock()
                .map_err(|_| failed("Swiss Ephemeris lock poisoned".to_string()))?;
            calc_ut(time.julian_day_ut(), body_code(body), self.flags())
                .map_err(|e| failed(format!("Swiss Ephemeris error: {}", e)))?
        };

        let out = result.out;
        if !out[0].is_finite() || !out[2].is_finite() {
            return Err(failed("Swiss Ephemeris returned no position".to_string()));
        }
        Ok(EclipticVector {
            lon: normalize_degrees(out[0]),
            lat: out[1],
            dist: out[2],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};

    fn j2000() -> AstroTime {
        AstroTime::from_datetime(Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let err = SwissEphemerisAdapter::new(Some(PathBuf::from("/nonexistent/swisseph")))
            .err()
            .unwrap();
        assert!(matches!(err, EphemerisError::FileNotFound { .. }));
    }

    #[test]
    fn test_explicit_missing_path_is_not_discovered_away() {
        let result = SwissEphemerisAdapter::discover(Some(PathBuf::from("/nonexistent/swisseph")));
        assert!(matches!(result, Err(EphemerisError::FileNotFound { .. })));
    }

    #[test]
    fn test_moshier_sun_and_moon_at_j2000() {
        let eph = SwissEphemerisAdapter::moshier();
        assert_eq!(eph.ephemeris_path(), None);

        let sun = eph.geo_vector(Body::Sun, &j2000()).unwrap();
        assert_abs_diff_eq!(sun.lon, 280.369, epsilon = 0.01);
        assert_abs_diff_eq!(sun.dist, 0.9833, epsilon = 0.001);

        let moon = eph.geo_vector(Body::Moon, &j2000()).unwrap();
        assert!(moon.dist > 0.0023 && moon.dist < 0.0028, "moon dist {}", moon.dist);
    }

    #[test]
    fn test_moshier_equinox_2024() {
        // March equinox 2024-03-20 03:06 UT
        let t = AstroTime::from_datetime(Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap());
        let sun = SwissEphemerisAdapter::moshier().geo_vector(Body::Sun, &t).unwrap();
        let off = if sun.lon > 180.0 { sun.lon - 360.0 } else { sun.lon };
        assert!(off.abs() < 0.01, "sun lon {}", sun.lon);
    }

    #[test]
    fn test_every_body_is_placed() {
        let eph = SwissEphemerisAdapter::moshier();
        for body in Body::ALL {
            let v = eph.geo_vector(body, &j2000()).unwrap();
            assert!((0.0..360.0).contains(&v.lon), "{} at {}", body, v.lon);
            assert!(v.dist > 0.0);
        }
    }

    #[test]
    #[ignore] // Requires Swiss Ephemeris data files
    fn test_data_files_agree_with_moshier() {
        let files = SwissEphemerisAdapter::new(None).unwrap();
        let moshier = SwissEphemerisAdapter::moshier();
        for body in Body::ALL {
            let a = files.geo_vector(body, &j2000()).unwrap().lon;
            let b = moshier.geo_vector(body, &j2000()).unwrap().lon;
            assert!((a - b).abs() < 0.001, "{} differs by {}", body, a - b);
        }
    }
}
