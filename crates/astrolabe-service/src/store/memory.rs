use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use astrolabe::western::ZodiacSign;

use crate::models::{BirthChart, ChartRecord, ChartSummary, HoroscopeEntry};
use crate::store::{is_fresh, ChartStore, HoroscopeCache, StoreError, StoreResult};

/// In-process store for tests and `database.url = "memory"`.
pub struct MemoryStore {
    charts: RwLock<HashMap<Uuid, ChartRecord>>,
    horoscopes: RwLock<HashMap<(ZodiacSign, NaiveDate), HoroscopeEntry>>,
    ttl: Duration,
}

impl MemoryStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            charts: RwLock::new(HashMap::new()),
            horoscopes: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Duration::hours(48))
    }
}

#[async_trait]
impl ChartStore for MemoryStore {
    async fn create_chart(&self, record: ChartRecord) -> StoreResult<()> {
        let mut charts = self.charts.write().await;
        let id = record.id();
        if charts.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("chart {}", id)));
        }
        charts.insert(id, record);
        Ok(())
    }

    async fn find_chart(&self, id: Uuid) -> StoreResult<ChartRecord> {
        self.charts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_charts(&self, owner: Option<Uuid>) -> StoreResult<Vec<ChartSummary>> {
        let charts = self.charts.read().await;
        let mut records: Vec<&ChartRecord> = charts
            .values()
            .filter(|r| owner.is_none() || r.owner() == owner)
            .collect();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(records.into_iter().map(|r| r.summary()).collect())
    }

    async fn delete_chart(&self, id: Uuid, owner: Option<Uuid>) -> StoreResult<()> {
        let mut charts = self.charts.write().await;
        match charts.get(&id) {
            Some(record) if record.owner() == owner => {
                charts.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound(id)),
        }
    }

    async fn upgrade_chart(&self, chart: BirthChart) -> StoreResult<()> {
        let mut charts = self.charts.write().await;
        match charts.get(&chart.id) {
            Some(ChartRecord::Legacy(_)) => {
                charts.insert(chart.id, ChartRecord::Current(chart));
                Ok(())
            }
            _ => Err(StoreError::NotFound(chart.id)),
        }
    }
}

#[async_trait]
impl HoroscopeCache for MemoryStore {
    async fn find(&self, sign: ZodiacSign, date: NaiveDate, now: DateTime<Utc>) -> StoreResult<Option<HoroscopeEntry>> {
        Ok(self
            .horoscopes
            .read()
            .await
            .get(&(sign, date))
            .filter(|e| is_fresh(e, now, self.ttl))
            .cloned())
    }

    async fn insert(&self, entry: HoroscopeEntry, now: DateTime<Utc>) -> StoreResult<()> {
        let mut horoscopes = self.horoscopes.write().await;
        let key = (entry.sign, entry.date);
        if horoscopes.get(&key).is_some_and(|e| is_fresh(e, now, self.ttl)) {
            return Err(StoreError::Duplicate(format!("horoscope {} {}", entry.sign, entry.date)));
        }
        horoscopes.insert(key, entry);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut horoscopes = self.horoscopes.write().await;
        let before = horoscopes.len();
        horoscopes.retain(|_, e| is_fresh(e, now, self.ttl));
        Ok((before - horoscopes.len()) as u64)
    }
}
