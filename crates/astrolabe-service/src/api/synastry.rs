use astrolabe::aspects::{AspectPoint, SynastryReport};
use astrolabe::chart::ChartEngine;
use astrolabe::ephemeris::Body;
use astrolabe::interpretation::{CompatibilityReading, ReadingRequest, SynastryReading};

use crate::api::dto::{CompatibilityResponse, PersonSummary, SynastryForecastResponse, SynastryRequest};
use crate::api::{parse_target_date, required, ApiError, ApiResult, AstrolabeApi};
use crate::models::BirthChart;

/// Outer bodies recomputed from the birth instant for synastry.
const SYNASTRY_EXTRA_BODIES: [Body; 2] = [Body::Jupiter, Body::Saturn];

fn person(chart: &BirthChart) -> PersonSummary {
    PersonSummary {
        name: chart.birth.name.clone(),
        sun_sign: chart.sun.sign,
    }
}

/// Stored personal planets plus Jupiter and Saturn at the birth instant.
fn synastry_points(engine: &ChartEngine<'_>, chart: &BirthChart) -> Vec<AspectPoint> {
    let mut points = chart.natal_points();
    for body in SYNASTRY_EXTRA_BODIES {
        match engine.body_position(body, chart.birth.birth_instant) {
            Ok(p) => points.push(AspectPoint::new(body.name(), p.longitude)),
            Err(e) => log::warn!("Omitting {} from synastry for chart {}: {}", body, chart.id, e),
        }
    }
    points
}

impl AstrolabeApi {
    async fn chart_pair(&self, request: &SynastryRequest) -> ApiResult<(BirthChart, BirthChart)> {
        let id1 = required(request.chart_id1, "chart_id1")?;
        let id2 = required(request.chart_id2, "chart_id2")?;
        let (first, second) = tokio::join!(self.current_chart(id1), self.current_chart(id2));
        match (first, second) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            (Err(e), _) | (_, Err(e)) if e.is_not_found() => {
                Err(ApiError::NotFound("One or both charts not found".to_string()))
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    /// Cross aspects between both charts, with Jupiter and Saturn recomputed off the
    /// async workers.
    async fn synastry_report(&self, chart1: &BirthChart, chart2: &BirthChart) -> ApiResult<SynastryReport> {
        let (first, second) = (chart1.clone(), chart2.clone());
        self.blocking(move |ephemeris| {
            let engine = ChartEngine::new(ephemeris);
            SynastryReport::new(&synastry_points(&engine, &first), &synastry_points(&engine, &second))
        })
        .await
    }

    /// Sign-level compatibility reading between two stored charts.
    pub async fn synastry_compatibility(&self, request: SynastryRequest) -> ApiResult<CompatibilityResponse> {
        let (chart1, chart2) = self.chart_pair(&request).await?;
        let (signs1, signs2) = (chart1.signs(), chart2.signs());
        let compatibility = self
            .interpreter
            .interpret::<CompatibilityReading>(&ReadingRequest::Compatibility {
                person1: &signs1,
                person2: &signs2,
            })
            .await;
        Ok(CompatibilityResponse {
            person1: person(&chart1),
            person2: person(&chart2),
            compatibility,
        })
    }

    /// Cross-aspect report between two stored charts and the reading built on it.
    pub async fn synastry_forecast(&self, request: SynastryRequest) -> ApiResult<SynastryForecastResponse> {
        let target_date = match request.target_date.as_deref() {
            Some(text) => parse_target_date(text)?,
            None => self.clock.now(),
        };
        let (chart1, chart2) = self.chart_pair(&request).await?;
        let report = self.synastry_report(&chart1, &chart2).await?;
        let forecast = self
            .interpreter
            .interpret::<SynastryReading>(&ReadingRequest::Synastry {
                person1: &chart1.birth.name,
                person2: &chart2.birth.name,
                target_date,
                report: &report,
            })
            .await;
        Ok(SynastryForecastResponse {
            person1: person(&chart1),
            person2: person(&chart2),
            target_date,
            report,
            forecast,
        })
    }
}
