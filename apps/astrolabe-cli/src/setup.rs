use async_trait::async_trait;
use std::sync::Arc;

use astrolabe::ephemeris::{Ephemeris, SwissEphemerisAdapter};
use astrolabe::interpretation::Prompt;
use astrolabe_config::{AstrolabeConfig, EphemerisBackend};
use astrolabe_service::{
    AstrolabeApi, ChartStore, GroqOracle, HoroscopeCache, Interpreter, MemoryStore, NominatimGeocoder,
    OracleError, SqliteStore, TextOracle,
};

/// Stands in for the oracle when no API key is configured; every reading falls back.
pub(crate) struct OfflineOracle {
    reason: String,
}

#[async_trait]
impl TextOracle for OfflineOracle {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, OracleError> {
        Err(OracleError::Transport(self.reason.clone()))
    }
}

pub(crate) fn build_ephemeris(config: &AstrolabeConfig) -> anyhow::Result<Arc<dyn Ephemeris>> {
    let adapter = match config.ephemeris.backend {
        EphemerisBackend::Swiss => SwissEphemerisAdapter::discover(config.ephemeris.data_path())?,
        EphemerisBackend::Moshier => SwissEphemerisAdapter::moshier(),
    };
    Ok(Arc::new(adapter))
}

fn build_oracle(config: &AstrolabeConfig) -> Arc<dyn TextOracle> {
    match GroqOracle::from_settings(&config.oracle) {
        Ok(oracle) => Arc::new(oracle),
        Err(e) => {
            log::warn!("Oracle disabled, readings will use fallback text: {}", e);
            Arc::new(OfflineOracle { reason: e.to_string() })
        }
    }
}

pub(crate) async fn build_api(config: &AstrolabeConfig) -> anyhow::Result<AstrolabeApi> {
    let ephemeris = build_ephemeris(config)?;
    let ttl = chrono::Duration::hours(config.horoscope.ttl_hours as i64);

    let charts: Arc<dyn ChartStore>;
    let horoscopes: Arc<dyn HoroscopeCache>;
    if config.database.is_memory() {
        let store = Arc::new(MemoryStore::new(ttl));
        charts = store.clone();
        horoscopes = store;
    } else {
        let store = Arc::new(
            SqliteStore::connect(&config.database.url, config.database.max_connections, ttl).await?,
        );
        log::info!("Using chart database {}", config.database.url);
        charts = store.clone();
        horoscopes = store;
    }

    let interpreter = Interpreter::new(build_oracle(config), config.oracle.timeout());
    let geocoder = Arc::new(NominatimGeocoder::from_settings(&config.geocoder)?);

    Ok(AstrolabeApi::new(ephemeris, charts, horoscopes, interpreter, geocoder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrolabe::interpretation::{MomentReading, ReadingRequest};
    use astrolabe_service::ReadingSource;
    use std::time::Duration;

    #[tokio::test]
    async fn test_offline_oracle_falls_back() {
        let interpreter = Interpreter::new(
            Arc::new(OfflineOracle {
                reason: "GROQ_API_KEY is not set".to_string(),
            }),
            Duration::from_secs(1),
        );
        let date = chrono::Utc::now();
        let request = ReadingRequest::Moment {
            date,
            planets: &[],
            moon: None,
        };
        let result = interpreter.interpret::<MomentReading>(&request).await;
        assert_eq!(result.source, ReadingSource::Fallback);
    }

    #[test]
    fn test_moshier_backend_builds() {
        let config = AstrolabeConfig::from_toml_str("[ephemeris]\nbackend = \"moshier\"\n").unwrap();
        assert!(build_ephemeris(&config).is_ok());
    }

    #[test]
    fn test_missing_configured_path_is_an_error() {
        let config =
            AstrolabeConfig::from_toml_str("[ephemeris]\npath = \"/nonexistent/swisseph\"\n").unwrap();
        assert_eq!(config.ephemeris.backend, EphemerisBackend::Swiss);
        assert!(build_ephemeris(&config).is_err());
    }
}
