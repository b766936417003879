//! Persistence, oracle and geocoder clients, and the request handlers that tie them to
//! the chart and aspect engines.

pub mod api;
pub mod geocode;
pub mod models;
pub mod oracle;
pub mod store;

pub use api::{ApiError, AstrolabeApi, Clock, FixedClock, SystemClock};
pub use geocode::{GeocodeError, Geocoder, NominatimGeocoder, Place};
pub use models::{BirthChart, ChartRecord, ChartSummary, HoroscopeEntry, LegacyChart};
pub use oracle::{GroqOracle, Interpretation, Interpreter, OracleError, ReadingSource, TextOracle};
pub use store::{ChartStore, HoroscopeCache, MemoryStore, SqliteStore, StoreError};
