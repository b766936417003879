//! Phase events, eclipses and horizon crossings near an instant.
//!
//! Every search here is best-effort: an adapter failure means "no event" and is logged,
//! never returned.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::local_sidereal_time;
use crate::ephemeris::time::{mean_obliquity, normalize_degrees, nutation};
use crate::ephemeris::{AstroTime, Body, EclipseBody, EclipseEvent, Ephemeris, GeoLocation};

/// Window for `next_phase_events`, days.
const PHASE_SEARCH_DAYS: f64 = 30.0;
/// An eclipse counts as "at" a date when its peak is this close.
const EVENT_WINDOW_HOURS: i64 = 24;
/// Altitude band reported as a horizon crossing, degrees.
const HORIZON_BAND: f64 = 0.5;
const EARTH_RADIUS_AU: f64 = 4.263_52e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Eclipse,
    Horizon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyEvent {
    pub kind: EventKind,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NextPhaseEvents {
    pub next_full: Option<DateTime<Utc>>,
    pub next_new: Option<DateTime<Utc>>,
}

/// Next full and new moon within 30 days of `instant`.
pub fn next_phase_events(ephemeris: &dyn Ephemeris, instant: DateTime<Utc>) -> NextPhaseEvents {
    let start = AstroTime::from_datetime(instant);
    let search = |target: f64| match ephemeris.search_moon_phase(target, &start, PHASE_SEARCH_DAYS) {
        Ok(found) => found.map(|t| t.to_datetime()),
        Err(e) => {
            log::warn!("Moon phase {}° search from {} failed: {}", target, instant, e);
            None
        }
    };
    NextPhaseEvents {
        next_full: search(180.0),
        next_new: search(0.0),
    }
}

fn eclipse_event(event: &EclipseEvent) -> SkyEvent {
    let body = match event.body {
        EclipseBody::Lunar => "Lunar",
        EclipseBody::Solar => "Solar",
    };
    SkyEvent {
        kind: EventKind::Eclipse,
        description: format!("{} Eclipse ({})", body, event.kind.as_str()),
        date: event.peak.to_datetime(),
    }
}

/// Lunar and solar eclipses peaking within 24 hours of `date`.
pub fn scan_events(ephemeris: &dyn Ephemeris, date: DateTime<Utc>) -> Vec<SkyEvent> {
    let window = Duration::hours(EVENT_WINDOW_HOURS);
    let start = AstroTime::from_datetime(date - window);

    let searches = [
        ("lunar", ephemeris.search_lunar_eclipse(&start)),
        ("solar", ephemeris.search_solar_eclipse(&start)),
    ];
    searches
        .into_iter()
        .filter_map(|(kind, result)| match result {
            Ok(event) => {
                let peak = event.peak.to_datetime();
                ((peak - date).abs() < window).then(|| eclipse_event(&event))
            }
            Err(e) => {
                log::debug!("No {} eclipse near {}: {}", kind, date, e);
                None
            }
        })
        .collect()
}

/// Apparent topocentric altitude of a body, degrees. Includes lunar parallax and
/// standard refraction.
fn altitude(ephemeris: &dyn Ephemeris, body: Body, time: &AstroTime, location: &GeoLocation) -> Option<f64> {
    let v = ephemeris.geo_vector(body, time).ok()?;
    let (_, deps) = nutation(time);
    let eps = (mean_obliquity(time) + deps).to_radians();
    let (lon, lat) = (v.lon.to_radians(), v.lat.to_radians());

    let dec = (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin()).asin();
    let ra = (lon.sin() * eps.cos() - lat.tan() * eps.sin()).atan2(lon.cos());
    let lst = local_sidereal_time(ephemeris.sidereal_time(time), location.lon);
    let hour_angle = (normalize_degrees(lst * 15.0 - ra.to_degrees())).to_radians();
    let phi = location.lat.to_radians();

    let geocentric = (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos())
        .asin()
        .to_degrees();
    let parallax = (EARTH_RADIUS_AU / v.dist).asin().to_degrees() * geocentric.to_radians().cos();
    let h = geocentric - parallax;
    let refraction = if h > -1.0 {
        1.02 / (h + 10.3 / (h + 5.11)).to_radians().tan() / 60.0
    } else {
        0.0
    };
    Some(h + refraction)
}

/// Moon, Mercury, Venus and Mars sitting on the observer's horizon at `instant`.
pub fn horizon_events(ephemeris: &dyn Ephemeris, instant: DateTime<Utc>, location: &GeoLocation) -> Vec<SkyEvent> {
    let time = AstroTime::from_datetime(instant);
    [Body::Moon, Body::Mercury, Body::Venus, Body::Mars]
        .into_iter()
        .filter_map(|body| {
            let alt = altitude(ephemeris, body, &time, location)?;
            (alt.abs() < HORIZON_BAND).then(|| SkyEvent {
                kind: EventKind::Horizon,
                description: format!("{} at horizon (Alt: {:.1}°)", body, alt),
                date: instant,
            })
        })
        .collect()
}
