//! Persistence gateway: chart records and the daily horoscope cache.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use astrolabe::western::ZodiacSign;

use crate::models::{BirthChart, ChartRecord, ChartSummary, HoroscopeEntry};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Chart not found: {0}")]
    NotFound(Uuid),
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Corrupt record {id}: {message}")]
    Corrupt { id: String, message: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(db.message().to_string()),
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ChartStore: Send + Sync {
    async fn create_chart(&self, record: ChartRecord) -> StoreResult<()>;

    async fn find_chart(&self, id: Uuid) -> StoreResult<ChartRecord>;

    /// Newest first. `owner = None` lists every chart.
    async fn list_charts(&self, owner: Option<Uuid>) -> StoreResult<Vec<ChartSummary>>;

    /// Only the owner may delete an owned chart; anonymous charts match `owner = None`.
    async fn delete_chart(&self, id: Uuid, owner: Option<Uuid>) -> StoreResult<()>;

    /// Replace a legacy record with its recomputed version. Fails with `NotFound` unless a
    /// v1 record with the same id exists.
    async fn upgrade_chart(&self, chart: BirthChart) -> StoreResult<()>;
}

#[async_trait]
pub trait HoroscopeCache: Send + Sync {
    /// Entries whose age at `now` has reached the cache TTL are treated as absent.
    async fn find(&self, sign: ZodiacSign, date: NaiveDate, now: DateTime<Utc>) -> StoreResult<Option<HoroscopeEntry>>;

    /// `Duplicate` when a live entry for (sign, date) already exists. An expired one is
    /// replaced.
    async fn insert(&self, entry: HoroscopeEntry, now: DateTime<Utc>) -> StoreResult<()>;

    /// Remove expired entries, returning how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// An entry expires the moment its age reaches the TTL.
pub(crate) fn is_fresh(entry: &HoroscopeEntry, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
    now - entry.created_at < ttl
}
