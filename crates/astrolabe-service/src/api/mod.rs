//! Transport-agnostic request handlers. Each operation takes a request body and returns
//! a response body or an `ApiError` carrying its status code.

pub mod charts;
pub mod dto;
pub mod error;
pub mod horoscope;
pub mod sky;
pub mod synastry;
pub mod transits;

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use astrolabe::chart::ChartEngine;
use astrolabe::ephemeris::Ephemeris;

use crate::geocode::{Geocoder, Place};
use crate::models::{BirthChart, ChartRecord};
use crate::oracle::Interpreter;
use crate::store::{ChartStore, HoroscopeCache};

pub use dto::*;
pub use error::{ApiError, ApiResult, ErrorBody};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct AstrolabeApi {
    ephemeris: Arc<dyn Ephemeris>,
    charts: Arc<dyn ChartStore>,
    horoscopes: Arc<dyn HoroscopeCache>,
    interpreter: Interpreter,
    geocoder: Arc<dyn Geocoder>,
    clock: Arc<dyn Clock>,
}

impl AstrolabeApi {
    pub fn new(
        ephemeris: Arc<dyn Ephemeris>,
        charts: Arc<dyn ChartStore>,
        horoscopes: Arc<dyn HoroscopeCache>,
        interpreter: Interpreter,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            ephemeris,
            charts,
            horoscopes,
            interpreter,
            geocoder,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn engine(&self) -> ChartEngine<'_> {
        ChartEngine::new(self.ephemeris.as_ref())
    }

    /// Run ephemeris-bound work on the blocking pool.
    async fn blocking<T, F>(&self, work: F) -> ApiResult<T>
    where
        F: FnOnce(&dyn Ephemeris) -> T + Send + 'static,
        T: Send + 'static,
    {
        let ephemeris = Arc::clone(&self.ephemeris);
        tokio::task::spawn_blocking(move || work(ephemeris.as_ref()))
            .await
            .map_err(|e| ApiError::Internal(format!("Ephemeris task failed: {}", e)))
    }

    /// A stored chart usable for computation. Legacy records are refused with 422.
    async fn current_chart(&self, id: Uuid) -> ApiResult<BirthChart> {
        match self.charts.find_chart(id).await? {
            ChartRecord::Current(chart) => Ok(chart),
            ChartRecord::Legacy(_) => Err(ApiError::LegacyChart(id)),
        }
    }

    pub async fn geocode(&self, query: &str) -> ApiResult<Vec<Place>> {
        Ok(self.geocoder.search(query).await?)
    }
}

pub(crate) fn required<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::Validation(format!("Missing required field: {}", field)))
}

pub(crate) fn required_text(value: Option<&str>, field: &str) -> ApiResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ApiError::Validation(format!("Missing required field: {}", field))),
    }
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` meaning midnight UTC.
pub(crate) fn parse_target_date(text: &str) -> ApiResult<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::Validation(format!("Invalid target_date: {}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_target_date_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_target_date("2024-03-01").unwrap(), expected);
        assert_eq!(parse_target_date("2024-03-01T02:00:00+02:00").unwrap(), expected);
        assert!(parse_target_date("March 1st").is_err());
    }
}
