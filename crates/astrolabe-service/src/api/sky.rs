use astrolabe::ephemeris::GeoLocation;
use astrolabe::interpretation::{LunarReading, MomentReading, ReadingRequest};
use astrolabe::lunar::{moon_phase, next_phase_events};
use astrolabe::sky::{self, SkySnapshot};

use crate::api::dto::{LunarReport, SkyInterpretation, SkyRequest};
use crate::api::{parse_target_date, required, ApiError, ApiResult, AstrolabeApi};

fn location(request: &SkyRequest) -> ApiResult<Option<GeoLocation>> {
    match (request.latitude, request.longitude) {
        (Some(lat), Some(lon)) => {
            let location = GeoLocation::new(lat, lon);
            if !location.is_valid() {
                return Err(ApiError::Validation(format!(
                    "Invalid coordinates: lat {}, lon {}",
                    lat, lon
                )));
            }
            Ok(Some(location))
        }
        _ => Ok(None),
    }
}

impl AstrolabeApi {
    /// Every body, the Moon's phase and nearby events at `target_date`.
    pub async fn sky_snapshot(&self, request: SkyRequest) -> ApiResult<SkySnapshot> {
        let target = required(request.target_date.as_deref(), "target_date")?;
        let date = parse_target_date(target)?;
        let location = location(&request)?;
        self.blocking(move |ephemeris| sky::snapshot(ephemeris, date, location.as_ref()))
            .await
    }

    pub async fn interpret_sky(&self, request: SkyRequest) -> ApiResult<SkyInterpretation> {
        let snapshot = self.sky_snapshot(request).await?;
        let forecast = self
            .interpreter
            .interpret::<MomentReading>(&ReadingRequest::Moment {
                date: snapshot.date,
                planets: &snapshot.planets,
                moon: snapshot.moon_phase.as_ref(),
            })
            .await;
        Ok(SkyInterpretation { snapshot, forecast })
    }

    /// Current phase, the next full and new moon, and a short lunar reading.
    pub async fn lunar_report(&self) -> ApiResult<LunarReport> {
        let date = self.clock.now();
        let (phase, next) = self
            .blocking(move |ephemeris| {
                moon_phase(ephemeris, date).map(|phase| (phase, next_phase_events(ephemeris, date)))
            })
            .await?
            .map_err(|e| ApiError::Upstream(format!("Moon phase unavailable: {}", e)))?;
        let insight = self
            .interpreter
            .interpret::<LunarReading>(&ReadingRequest::Lunar { moon: &phase })
            .await;
        Ok(LunarReport {
            date,
            phase,
            next,
            insight,
        })
    }
}
