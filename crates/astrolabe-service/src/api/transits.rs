use chrono::{DateTime, Utc};

use astrolabe::aspects::{AspectPoint, TransitReport};
use astrolabe::chart::ChartEngine;
use astrolabe::ephemeris::Body;
use astrolabe::interpretation::{ReadingRequest, TransitReading};

use crate::api::dto::{TransitForecast, TransitRequest, TransitResponse};
use crate::api::{parse_target_date, required, ApiError, ApiResult, AstrolabeApi};

impl AstrolabeApi {
    /// Natal points and the name to address, from a stored chart or the request itself.
    async fn natal_for(&self, request: &TransitRequest) -> ApiResult<(Vec<AspectPoint>, String)> {
        if let Some(id) = request.chart_id {
            let chart = self.current_chart(id).await?;
            return Ok((chart.natal_points(), chart.birth.name));
        }
        match &request.natal_points {
            Some(points) if !points.is_empty() => {
                Ok((points.clone(), request.name.clone().unwrap_or_default()))
            }
            _ => Err(ApiError::Validation(
                "Missing required parameters: chart_id or natal_points".to_string(),
            )),
        }
    }

    async fn transit_report(
        &self,
        natal: Vec<AspectPoint>,
        date: DateTime<Utc>,
    ) -> ApiResult<(TransitResponse, TransitReport)> {
        self.blocking(move |ephemeris| {
            let (positions, failed) = ChartEngine::new(ephemeris).positions(&Body::ALL, date);
            let transiting: Vec<AspectPoint> = positions
                .iter()
                .map(|p| AspectPoint::new(p.body.name(), p.longitude))
                .collect();
            let report = TransitReport::new(&transiting, &natal);
            let response = TransitResponse {
                target_date: date,
                transits: report.aspects.clone(),
                transiting_positions: positions,
                failed,
            };
            (response, report)
        })
        .await
    }

    /// All ten bodies at `target_date` against the natal points, tightest first.
    pub async fn transits(&self, request: TransitRequest) -> ApiResult<TransitResponse> {
        let date = parse_target_date(required(request.target_date.as_deref(), "target_date")?)?;
        let (natal, _) = self.natal_for(&request).await?;
        Ok(self.transit_report(natal, date).await?.0)
    }

    /// Transits plus a reading over the strongest of them.
    pub async fn transit_forecast(&self, request: TransitRequest) -> ApiResult<TransitForecast> {
        let date = parse_target_date(required(request.target_date.as_deref(), "target_date")?)?;
        let (natal, name) = self.natal_for(&request).await?;
        let (transits, report) = self.transit_report(natal, date).await?;
        let forecast = self
            .interpreter
            .interpret::<TransitReading>(&ReadingRequest::Transit {
                name: &name,
                target_date: date,
                aspects: report.strongest(),
            })
            .await;
        Ok(TransitForecast { transits, forecast })
    }
}
