use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aspects::{sort_by_orb, AspectCalculator, AspectMatch, AspectPoint};
use crate::ephemeris::{Body, EphemerisError, GeoLocation};
use crate::western::{SignPlacement, ZodiacSign};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Invalid coordinates: lat {lat}, lon {lon}. Latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinates { lat: f64, lon: f64 },
    #[error("Chart is missing required bodies: {}", .bodies.iter().map(|b| b.name()).collect::<Vec<_>>().join(", "))]
    MissingBodies { bodies: Vec<Body> },
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

/// Full state of one body at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub body: Body,
    /// Ecliptic longitude, [0, 360)
    pub longitude: f64,
    pub latitude: f64,
    /// Geocentric distance, AU
    pub distance: f64,
    /// Degrees per day, negative when retrograde
    pub speed: f64,
    pub retrograde: bool,
    pub sign: ZodiacSign,
    /// Degree within sign, [0, 30)
    pub degree: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBody {
    pub body: Body,
    #[serde(flatten)]
    pub placement: SignPlacement,
}

/// A body the ephemeris could not place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFailure {
    pub body: Body,
    pub message: String,
}

/// Output of the chart engine. Bodies that failed are listed in `failed` instead of
/// `bodies`; the angles and houses never depend on the ephemeris positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    pub instant: DateTime<Utc>,
    pub location: GeoLocation,
    pub bodies: Vec<PlacedBody>,
    pub ascendant: SignPlacement,
    pub midheaven: SignPlacement,
    /// Equal-house cusps, `houses[0]` is the ascendant
    pub houses: [f64; 12],
    pub failed: Vec<BodyFailure>,
}

impl ChartResult {
    pub fn body(&self, body: Body) -> Option<&SignPlacement> {
        self.bodies
            .iter()
            .find(|p| p.body == body)
            .map(|p| &p.placement)
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Error listing every requested body that is absent from the chart.
    pub fn require(&self, bodies: &[Body]) -> Result<(), ChartError> {
        let missing: Vec<Body> = bodies
            .iter()
            .copied()
            .filter(|b| self.body(*b).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ChartError::MissingBodies { bodies: missing })
        }
    }

    pub fn aspect_points(&self) -> Vec<AspectPoint> {
        self.bodies
            .iter()
            .map(|p| AspectPoint::new(p.body.name(), p.placement.longitude))
            .collect()
    }

    /// Natal self-aspects for the chart wheel, tightest first.
    pub fn self_aspects(&self) -> Vec<AspectMatch> {
        let mut aspects = AspectCalculator::new().find_aspects(&self.aspect_points(), None);
        sort_by_orb(&mut aspects);
        aspects
    }
}
