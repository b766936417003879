use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use astrolabe::aspects::{find_aspects, sort_by_orb};
use astrolabe::interpretation::{NatalReading, ReadingRequest};

use crate::api::dto::{ChartDetail, CreateChartRequest, CreateChartResponse, SynthesisRequest, SynthesisResponse};
use crate::api::{required, required_text, ApiError, ApiResult, AstrolabeApi};
use crate::models::{BirthChart, BirthData, ChartRecord, ChartSummary};

fn parse_birth_date(text: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation(format!("Invalid birth_date (expected YYYY-MM-DD): {}", text)))
}

fn parse_birth_time(text: &str) -> ApiResult<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| ApiError::Validation(format!("Invalid birth_time (expected HH:MM): {}", text)))
}

/// `Z`, `+HH:MM` or `-HH:MM`.
fn parse_utc_offset(text: &str) -> ApiResult<FixedOffset> {
    let invalid = || ApiError::Validation(format!("Invalid utc_offset: {}", text));
    let text = text.trim();
    if text.eq_ignore_ascii_case("z") || text.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }
    let (sign, rest) = if let Some(rest) = text.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = text.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn birth_instant(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> ApiResult<DateTime<Utc>> {
    offset
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ApiError::Validation("Birth date and time do not form a valid instant".to_string()))
}

impl AstrolabeApi {
    /// Validate birth data, compute the chart and store it.
    pub async fn create_chart(&self, request: CreateChartRequest) -> ApiResult<CreateChartResponse> {
        let name = required_text(request.name.as_deref(), "name")?;
        let birth_date = required_text(request.birth_date.as_deref(), "birth_date")?;
        let birth_time = required_text(request.birth_time.as_deref(), "birth_time")?;
        let birth_place = required_text(request.birth_place.as_deref(), "birth_place")?;
        let latitude = required(request.latitude, "latitude")?;
        let longitude = required(request.longitude, "longitude")?;

        let offset = match request.utc_offset.as_deref() {
            Some(text) => parse_utc_offset(text)?,
            None => FixedOffset::east_opt(0)
                .ok_or_else(|| ApiError::Internal("UTC offset unavailable".to_string()))?,
        };
        let instant = birth_instant(parse_birth_date(&birth_date)?, parse_birth_time(&birth_time)?, offset)?;

        let result = self.engine().compute_chart(instant, latitude, longitude)?;
        let birth = BirthData {
            name,
            birth_instant: instant,
            birth_date,
            birth_time,
            birth_place,
            latitude,
            longitude,
        };
        let chart = BirthChart::from_chart(Uuid::new_v4(), birth, &result, request.owner, self.clock.now())?;

        let response = CreateChartResponse {
            id: chart.id,
            sun_sign: chart.sun.sign,
            moon_sign: chart.moon.sign,
            rising_sign: chart.ascendant.sign,
            mercury_sign: chart.mercury.sign,
            venus_sign: chart.venus.sign,
            mars_sign: chart.mars.sign,
        };
        self.charts.create_chart(ChartRecord::Current(chart)).await?;
        log::info!("Created chart {} ({} Sun)", response.id, response.sun_sign);
        Ok(response)
    }

    pub async fn list_charts(&self, owner: Option<Uuid>) -> ApiResult<Vec<ChartSummary>> {
        Ok(self.charts.list_charts(owner).await?)
    }

    pub async fn get_chart(&self, id: Uuid) -> ApiResult<ChartDetail> {
        let chart = self.charts.find_chart(id).await?;
        let aspects = match &chart {
            ChartRecord::Current(c) => {
                let mut aspects = find_aspects(&c.natal_points(), None);
                sort_by_orb(&mut aspects);
                aspects
            }
            ChartRecord::Legacy(_) => Vec::new(),
        };
        Ok(ChartDetail { chart, aspects })
    }

    pub async fn delete_chart(&self, id: Uuid, owner: Option<Uuid>) -> ApiResult<()> {
        self.charts.delete_chart(id, owner).await?;
        log::info!("Deleted chart {}", id);
        Ok(())
    }

    /// Recompute a legacy chart from its birth data and store the full record.
    pub async fn migrate_chart(&self, id: Uuid) -> ApiResult<ChartDetail> {
        let legacy = match self.charts.find_chart(id).await? {
            ChartRecord::Legacy(legacy) => legacy,
            ChartRecord::Current(_) => {
                return Err(ApiError::Validation(format!("Chart {} is already current", id)));
            }
        };
        let chart = legacy.migrate(&self.engine())?;
        self.charts.upgrade_chart(chart).await?;
        log::info!("Migrated chart {} to the current schema", id);
        self.get_chart(id).await
    }

    pub async fn natal_synthesis(&self, request: SynthesisRequest) -> ApiResult<SynthesisResponse> {
        let chart_id = required(request.chart_id, "chart_id")?;
        let chart = self.current_chart(chart_id).await?;
        let signs = chart.signs();
        let synthesis = self
            .interpreter
            .interpret::<NatalReading>(&ReadingRequest::Natal { signs: &signs })
            .await;
        Ok(SynthesisResponse {
            chart_id,
            signs,
            synthesis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_offsets() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-08:00").unwrap().local_minus_utc(), -28_800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("0530").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }

    #[test]
    fn test_birth_time_with_and_without_seconds() {
        assert_eq!(parse_birth_time("08:30").unwrap(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(parse_birth_time("08:30:15").unwrap(), NaiveTime::from_hms_opt(8, 30, 15).unwrap());
        assert!(parse_birth_time("8.30pm").is_err());
    }

    #[test]
    fn test_offset_applied_to_instant() {
        let date = NaiveDate::from_ymd_opt(1990, 7, 15).unwrap();
        let time = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        let instant = birth_instant(date, time, parse_utc_offset("+02:00").unwrap()).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(1990, 7, 15, 6, 30, 0).unwrap());
    }
}
