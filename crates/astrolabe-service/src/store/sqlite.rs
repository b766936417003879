use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

use astrolabe::western::ZodiacSign;

use crate::models::{BirthChart, ChartRecord, ChartSummary, HoroscopeEntry};
use crate::store::{ChartStore, HoroscopeCache, StoreError, StoreResult};

/// SQLite-backed store. Charts are kept as JSON documents next to the columns the list
/// view needs.
pub struct SqliteStore {
    pool: SqlitePool,
    ttl: Duration,
}

impl SqliteStore {
    pub async fn connect(url: &str, max_connections: u32, ttl: Duration) -> anyhow::Result<Self> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {}", url))?
            .create_if_missing(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // every connection to :memory: is its own database
        let max_connections = if in_memory { 1 } else { max_connections };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        let store = Self { pool, ttl };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS charts (
                id TEXT PRIMARY KEY,
                schema_version INTEGER NOT NULL,
                owner TEXT,
                name TEXT NOT NULL,
                sun_sign TEXT NOT NULL,
                moon_sign TEXT NOT NULL,
                rising_sign TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                document TEXT NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create charts table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS horoscopes (
                sign TEXT NOT NULL,
                date TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create horoscopes table")?;

        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS horoscopes_sign_date ON horoscopes (sign, date);")
            .execute(&self.pool)
            .await
            .context("Failed to create horoscope index")?;

        Ok(())
    }

    /// Rows created at or before this instant have expired.
    fn cutoff(&self, now: DateTime<Utc>) -> i64 {
        (now - self.ttl).timestamp_millis()
    }
}

fn encode(record: &ChartRecord) -> StoreResult<String> {
    serde_json::to_string(record).map_err(|e| StoreError::Corrupt {
        id: record.id().to_string(),
        message: e.to_string(),
    })
}

fn decode(id: &str, document: &str) -> StoreResult<ChartRecord> {
    serde_json::from_str(document).map_err(|e| StoreError::Corrupt {
        id: id.to_string(),
        message: e.to_string(),
    })
}

fn parse_sign(id: &str, text: &str) -> StoreResult<ZodiacSign> {
    ZodiacSign::from_str(text).map_err(|message| StoreError::Corrupt {
        id: id.to_string(),
        message,
    })
}

fn timestamp(id: &str, ms: i64) -> StoreResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single().ok_or_else(|| StoreError::Corrupt {
        id: id.to_string(),
        message: format!("bad timestamp {}", ms),
    })
}

#[async_trait]
impl ChartStore for SqliteStore {
    async fn create_chart(&self, record: ChartRecord) -> StoreResult<()> {
        let summary = record.summary();
        sqlx::query(
            r#"
            INSERT INTO charts
            (id, schema_version, owner, name, sun_sign, moon_sign, rising_sign, created_at, document)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(summary.id.to_string())
        .bind(record.schema_version())
        .bind(record.owner().map(|o| o.to_string()))
        .bind(&summary.name)
        .bind(summary.sun_sign.name())
        .bind(summary.moon_sign.name())
        .bind(summary.rising_sign.name())
        .bind(summary.created_at.timestamp_millis())
        .bind(encode(&record)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_chart(&self, id: Uuid) -> StoreResult<ChartRecord> {
        let key = id.to_string();
        let row = sqlx::query("SELECT document FROM charts WHERE id = ?")
            .bind(&key)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        decode(&key, row.get("document"))
    }

    async fn list_charts(&self, owner: Option<Uuid>) -> StoreResult<Vec<ChartSummary>> {
        let rows = match owner {
            Some(owner) => {
                sqlx::query(
                    "SELECT id, name, sun_sign, moon_sign, rising_sign, created_at FROM charts
                     WHERE owner = ? ORDER BY created_at DESC",
                )
                .bind(owner.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, name, sun_sign, moon_sign, rising_sign, created_at FROM charts
                     ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(ChartSummary {
                    id: Uuid::parse_str(&id).map_err(|e| StoreError::Corrupt {
                        id: id.clone(),
                        message: e.to_string(),
                    })?,
                    name: row.get("name"),
                    sun_sign: parse_sign(&id, row.get("sun_sign"))?,
                    moon_sign: parse_sign(&id, row.get("moon_sign"))?,
                    rising_sign: parse_sign(&id, row.get("rising_sign"))?,
                    created_at: timestamp(&id, row.get("created_at"))?,
                })
            })
            .collect()
    }

    async fn delete_chart(&self, id: Uuid, owner: Option<Uuid>) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM charts WHERE id = ? AND owner IS ?")
            .bind(id.to_string())
            .bind(owner.map(|o| o.to_string()))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn upgrade_chart(&self, chart: BirthChart) -> StoreResult<()> {
        let id = chart.id;
        let record = ChartRecord::Current(chart);
        let summary = record.summary();
        let result = sqlx::query(
            r#"
            UPDATE charts
            SET schema_version = ?, owner = ?, name = ?, sun_sign = ?, moon_sign = ?, rising_sign = ?,
                document = ?
            WHERE id = ? AND schema_version = 1
            "#,
        )
        .bind(record.schema_version())
        .bind(record.owner().map(|o| o.to_string()))
        .bind(&summary.name)
        .bind(summary.sun_sign.name())
        .bind(summary.moon_sign.name())
        .bind(summary.rising_sign.name())
        .bind(encode(&record)?)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl HoroscopeCache for SqliteStore {
    async fn find(&self, sign: ZodiacSign, date: NaiveDate, now: DateTime<Utc>) -> StoreResult<Option<HoroscopeEntry>> {
        let row = sqlx::query(
            "SELECT content, created_at FROM horoscopes WHERE sign = ? AND date = ? AND created_at > ?",
        )
        .bind(sign.name())
        .bind(date.to_string())
        .bind(self.cutoff(now))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(HoroscopeEntry {
                sign,
                date,
                content: row.get("content"),
                created_at: timestamp(sign.name(), row.get("created_at"))?,
            })),
            None => Ok(None),
        }
    }

    async fn insert(&self, entry: HoroscopeEntry, now: DateTime<Utc>) -> StoreResult<()> {
        // an expired row for the same key is overwritten in place
        let result = sqlx::query(
            r#"
            INSERT INTO horoscopes (sign, date, content, created_at) VALUES (?, ?, ?, ?)
            ON CONFLICT (sign, date) DO UPDATE
            SET content = excluded.content, created_at = excluded.created_at
            WHERE horoscopes.created_at <= ?
            "#,
        )
        .bind(entry.sign.name())
        .bind(entry.date.to_string())
        .bind(&entry.content)
        .bind(entry.created_at.timestamp_millis())
        .bind(self.cutoff(now))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(format!("horoscope {} {}", entry.sign, entry.date)));
        }
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM horoscopes WHERE created_at <= ?")
            .bind(self.cutoff(now))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
