//! Stored records.
//!
//! Charts exist in two schema versions. Version 2 (`BirthChart`) carries every longitude
//! and the houses; version 1 (`LegacyChart`) only ever stored the three headline signs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use astrolabe::aspects::AspectPoint;
use astrolabe::chart::{ChartEngine, ChartError, ChartResult};
use astrolabe::ephemeris::Body;
use astrolabe::interpretation::NatalSigns;
use astrolabe::western::{SignPlacement, ZodiacSign};

/// Birth data as entered, before any computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthData {
    pub name: String,
    pub birth_instant: DateTime<Utc>,
    /// `YYYY-MM-DD` as entered
    pub birth_date: String,
    /// `HH:MM[:SS]` as entered
    pub birth_time: String,
    pub birth_place: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthChart {
    pub id: Uuid,
    #[serde(flatten)]
    pub birth: BirthData,
    pub sun: SignPlacement,
    pub moon: SignPlacement,
    pub mercury: SignPlacement,
    pub venus: SignPlacement,
    pub mars: SignPlacement,
    pub ascendant: SignPlacement,
    pub midheaven: SignPlacement,
    pub houses: [f64; 12],
    pub owner: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl BirthChart {
    /// Fails with `MissingBodies` unless all five personal planets were placed.
    pub fn from_chart(
        id: Uuid,
        birth: BirthData,
        chart: &ChartResult,
        owner: Option<Uuid>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ChartError> {
        chart.require(&Body::PERSONAL)?;
        let placed = |body: Body| {
            chart
                .body(body)
                .copied()
                .ok_or(ChartError::MissingBodies { bodies: vec![body] })
        };
        Ok(Self {
            id,
            birth,
            sun: placed(Body::Sun)?,
            moon: placed(Body::Moon)?,
            mercury: placed(Body::Mercury)?,
            venus: placed(Body::Venus)?,
            mars: placed(Body::Mars)?,
            ascendant: chart.ascendant,
            midheaven: chart.midheaven,
            houses: chart.houses,
            owner,
            created_at,
        })
    }

    pub fn placement(&self, body: Body) -> Option<&SignPlacement> {
        match body {
            Body::Sun => Some(&self.sun),
            Body::Moon => Some(&self.moon),
            Body::Mercury => Some(&self.mercury),
            Body::Venus => Some(&self.venus),
            Body::Mars => Some(&self.mars),
            _ => None,
        }
    }

    /// The five stored personal planets as aspect points.
    pub fn natal_points(&self) -> Vec<AspectPoint> {
        Body::PERSONAL
            .iter()
            .filter_map(|b| self.placement(*b).map(|p| AspectPoint::new(b.name(), p.longitude)))
            .collect()
    }

    pub fn signs(&self) -> NatalSigns {
        NatalSigns {
            name: self.birth.name.clone(),
            sun: self.sun.sign,
            moon: self.moon.sign,
            rising: self.ascendant.sign,
            mercury: self.mercury.sign,
            venus: self.venus.sign,
            mars: self.mars.sign,
        }
    }
}

/// Signs-only record written before longitudes were stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyChart {
    pub id: Uuid,
    #[serde(flatten)]
    pub birth: BirthData,
    pub sun_sign: ZodiacSign,
    pub moon_sign: ZodiacSign,
    pub rising_sign: ZodiacSign,
    pub owner: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl LegacyChart {
    /// Recompute the full chart from the stored birth data, keeping id, owner and
    /// creation time.
    pub fn migrate(&self, engine: &ChartEngine<'_>) -> Result<BirthChart, ChartError> {
        let chart = engine.compute_chart(
            self.birth.birth_instant,
            self.birth.latitude,
            self.birth.longitude,
        )?;
        BirthChart::from_chart(self.id, self.birth.clone(), &chart, self.owner, self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum ChartRecord {
    #[serde(rename = "v2")]
    Current(BirthChart),
    #[serde(rename = "v1")]
    Legacy(LegacyChart),
}

impl ChartRecord {
    pub fn id(&self) -> Uuid {
        match self {
            ChartRecord::Current(c) => c.id,
            ChartRecord::Legacy(c) => c.id,
        }
    }

    pub fn owner(&self) -> Option<Uuid> {
        match self {
            ChartRecord::Current(c) => c.owner,
            ChartRecord::Legacy(c) => c.owner,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ChartRecord::Current(c) => c.created_at,
            ChartRecord::Legacy(c) => c.created_at,
        }
    }

    pub fn schema_version(&self) -> i64 {
        match self {
            ChartRecord::Current(_) => 2,
            ChartRecord::Legacy(_) => 1,
        }
    }

    pub fn summary(&self) -> ChartSummary {
        match self {
            ChartRecord::Current(c) => ChartSummary {
                id: c.id,
                name: c.birth.name.clone(),
                sun_sign: c.sun.sign,
                moon_sign: c.moon.sign,
                rising_sign: c.ascendant.sign,
                created_at: c.created_at,
            },
            ChartRecord::Legacy(c) => ChartSummary {
                id: c.id,
                name: c.birth.name.clone(),
                sun_sign: c.sun_sign,
                moon_sign: c.moon_sign,
                rising_sign: c.rising_sign,
                created_at: c.created_at,
            },
        }
    }
}

/// List projection of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub id: Uuid,
    pub name: String,
    pub sun_sign: ZodiacSign,
    pub moon_sign: ZodiacSign,
    pub rising_sign: ZodiacSign,
    pub created_at: DateTime<Utc>,
}

/// One cached daily horoscope, unique per (sign, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoroscopeEntry {
    pub sign: ZodiacSign,
    pub date: NaiveDate,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrolabe::ephemeris::SwissEphemerisAdapter;
    use chrono::TimeZone;

    fn birth() -> BirthData {
        BirthData {
            name: "Ada".to_string(),
            birth_instant: Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap(),
            birth_date: "2000-01-01".to_string(),
            birth_time: "12:00".to_string(),
            birth_place: "Null Island".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn test_legacy_migration_keeps_identity() {
        let eph = SwissEphemerisAdapter::moshier();
        let engine = ChartEngine::new(&eph);
        let legacy = LegacyChart {
            id: Uuid::new_v4(),
            birth: birth(),
            sun_sign: ZodiacSign::Capricorn,
            moon_sign: ZodiacSign::Scorpio,
            rising_sign: ZodiacSign::Libra,
            owner: None,
            created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        };

        let chart = legacy.migrate(&engine).unwrap();

        assert_eq!(chart.id, legacy.id);
        assert_eq!(chart.created_at, legacy.created_at);
        assert_eq!(chart.sun.sign, ZodiacSign::Capricorn);
        assert_eq!(chart.houses[0], chart.ascendant.longitude);
        assert_eq!(chart.natal_points().len(), 5);
    }

    #[test]
    fn test_record_serializes_with_schema_tag() {
        let eph = SwissEphemerisAdapter::moshier();
        let engine = ChartEngine::new(&eph);
        let b = birth();
        let result = engine.compute_chart(b.birth_instant, 0.0, 0.0).unwrap();
        let chart = BirthChart::from_chart(Uuid::new_v4(), b, &result, None, Utc::now()).unwrap();
        let record = ChartRecord::Current(chart);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["schema"], "v2");
        assert_eq!(json["name"], "Ada");

        let back: ChartRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), record.id());
        assert_eq!(back.summary(), record.summary());
    }
}
