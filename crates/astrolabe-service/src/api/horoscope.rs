use std::str::FromStr;

use astrolabe::interpretation::{DailyHoroscope, ReadingRequest};
use astrolabe::western::ZodiacSign;

use crate::api::dto::HoroscopeResponse;
use crate::api::{ApiError, ApiResult, AstrolabeApi};
use crate::models::HoroscopeEntry;
use crate::oracle::ReadingSource;
use crate::store::StoreError;

impl AstrolabeApi {
    /// Today's horoscope for `sign`, served from the cache when present.
    ///
    /// Only oracle text is cached, so a fallback day is retried on the next request.
    pub async fn daily_horoscope(&self, sign: &str) -> ApiResult<HoroscopeResponse> {
        let sign = ZodiacSign::from_str(sign).map_err(ApiError::Validation)?;
        let now = self.clock.now();
        let date = now.date_naive();

        match self.horoscopes.find(sign, date, now).await {
            Ok(Some(entry)) => {
                return Ok(HoroscopeResponse {
                    sign,
                    date,
                    horoscope: entry.content,
                    cached: true,
                })
            }
            Ok(None) => {}
            Err(e) => log::warn!("Horoscope cache lookup failed for {} {}: {}", sign, date, e),
        }

        let generated = self
            .interpreter
            .interpret::<DailyHoroscope>(&ReadingRequest::DailyHoroscope { sign })
            .await;
        let horoscope = generated.reading.horoscope;

        if generated.source == ReadingSource::Oracle {
            let entry = HoroscopeEntry {
                sign,
                date,
                content: horoscope.clone(),
                created_at: now,
            };
            match self.horoscopes.insert(entry, now).await {
                Ok(()) => {}
                Err(StoreError::Duplicate(_)) => {
                    log::info!("Horoscope for {} {} was cached concurrently", sign, date);
                }
                Err(e) => log::warn!("Failed to cache horoscope for {} {}: {}", sign, date, e),
            }
            match self.horoscopes.purge_expired(now).await {
                Ok(0) => {}
                Ok(n) => log::debug!("Purged {} expired horoscopes", n),
                Err(e) => log::warn!("Horoscope purge failed: {}", e),
            }
        }

        Ok(HoroscopeResponse {
            sign,
            date,
            horoscope,
            cached: false,
        })
    }
}
