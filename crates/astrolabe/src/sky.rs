//! Single-moment astronomy snapshot: every body, the Moon's phase and nearby events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::{BodyFailure, BodyPosition, ChartEngine};
use crate::ephemeris::{Body, Ephemeris, GeoLocation};
use crate::lunar::{horizon_events, moon_phase, scan_events, MoonPhaseSnapshot, SkyEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkySnapshot {
    pub date: DateTime<Utc>,
    pub planets: Vec<BodyPosition>,
    pub failed: Vec<BodyFailure>,
    /// Absent only when the ephemeris cannot place the Sun or Moon
    pub moon_phase: Option<MoonPhaseSnapshot>,
    pub events: Vec<SkyEvent>,
}

impl SkySnapshot {
    pub fn position(&self, body: Body) -> Option<&BodyPosition> {
        self.planets.iter().find(|p| p.body == body)
    }

    pub fn retrograde_bodies(&self) -> Vec<Body> {
        self.planets
            .iter()
            .filter(|p| p.retrograde)
            .map(|p| p.body)
            .collect()
    }
}

/// Positions of all ten bodies at `date`. With a location, horizon crossings of the
/// Moon and inner planets are added to the events.
pub fn snapshot(ephemeris: &dyn Ephemeris, date: DateTime<Utc>, location: Option<&GeoLocation>) -> SkySnapshot {
    let engine = ChartEngine::new(ephemeris);
    let (planets, failed) = engine.positions(&Body::ALL, date);

    let moon_phase = match moon_phase(ephemeris, date) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            log::warn!("Moon phase unavailable at {}: {}", date, e);
            None
        }
    };

    let mut events = scan_events(ephemeris, date);
    if let Some(location) = location.filter(|l| l.is_valid()) {
        events.extend(horizon_events(ephemeris, date, location));
    }

    SkySnapshot {
        date,
        planets,
        failed,
        moon_phase,
        events,
    }
}
