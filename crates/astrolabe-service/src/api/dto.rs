//! Request and response bodies. Request fields are optional so that a missing field is
//! reported as a validation error rather than a decode failure.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use astrolabe::aspects::{AspectMatch, AspectPoint, SynastryReport};
use astrolabe::chart::{BodyFailure, BodyPosition};
use astrolabe::interpretation::{
    CompatibilityReading, LunarReading, MomentReading, NatalReading, NatalSigns, SynastryReading,
    TransitReading,
};
use astrolabe::lunar::{MoonPhaseSnapshot, NextPhaseEvents};
use astrolabe::sky::SkySnapshot;
use astrolabe::western::ZodiacSign;

use crate::models::ChartRecord;
use crate::oracle::Interpretation;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateChartRequest {
    pub name: Option<String>,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    /// `HH:MM` or `HH:MM:SS`
    pub birth_time: Option<String>,
    pub birth_place: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `+HH:MM`, `-HH:MM` or `Z`; UTC when absent
    #[serde(default)]
    pub utc_offset: Option<String>,
    #[serde(default)]
    pub owner: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChartResponse {
    pub id: Uuid,
    pub sun_sign: ZodiacSign,
    pub moon_sign: ZodiacSign,
    pub rising_sign: ZodiacSign,
    pub mercury_sign: ZodiacSign,
    pub venus_sign: ZodiacSign,
    pub mars_sign: ZodiacSign,
}

/// A stored chart with its natal self-aspects (empty for legacy records).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDetail {
    pub chart: ChartRecord,
    pub aspects: Vec<AspectMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkyRequest {
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub target_date: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyInterpretation {
    pub snapshot: SkySnapshot,
    pub forecast: Interpretation<MomentReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarReport {
    pub date: DateTime<Utc>,
    pub phase: MoonPhaseSnapshot,
    #[serde(flatten)]
    pub next: NextPhaseEvents,
    pub insight: Interpretation<LunarReading>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitRequest {
    /// Stored natal chart; takes precedence over `natal_points`
    #[serde(default)]
    pub chart_id: Option<Uuid>,
    #[serde(default)]
    pub natal_points: Option<Vec<AspectPoint>>,
    pub target_date: Option<String>,
    /// Name used in the forecast prompt when no stored chart is given
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitResponse {
    pub target_date: DateTime<Utc>,
    /// Tightest first
    pub transits: Vec<AspectMatch>,
    pub transiting_positions: Vec<BodyPosition>,
    pub failed: Vec<BodyFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitForecast {
    #[serde(flatten)]
    pub transits: TransitResponse,
    pub forecast: Interpretation<TransitReading>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynastryRequest {
    pub chart_id1: Option<Uuid>,
    pub chart_id2: Option<Uuid>,
    /// Forecast date; the current time when absent. Ignored by the compatibility reading.
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub name: String,
    pub sun_sign: ZodiacSign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityResponse {
    pub person1: PersonSummary,
    pub person2: PersonSummary,
    pub compatibility: Interpretation<CompatibilityReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryForecastResponse {
    pub person1: PersonSummary,
    pub person2: PersonSummary,
    pub target_date: DateTime<Utc>,
    pub report: SynastryReport,
    pub forecast: Interpretation<SynastryReading>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub chart_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResponse {
    pub chart_id: Uuid,
    pub signs: NatalSigns,
    pub synthesis: Interpretation<NatalReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoroscopeResponse {
    pub sign: ZodiacSign,
    pub date: NaiveDate,
    pub horoscope: String,
    pub cached: bool,
}
