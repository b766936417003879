#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use astrolabe::ephemeris::SwissEphemerisAdapter;
use astrolabe::interpretation::{Prompt, ReadingTemplate};
use astrolabe_service::api::CreateChartRequest;
use astrolabe_service::{
    AstrolabeApi, FixedClock, GeocodeError, Geocoder, Interpreter, MemoryStore, OracleError, Place, TextOracle,
};

/// Answers every prompt with the same scripted result and records what it was asked.
pub struct ScriptedOracle {
    reply: Result<String, OracleError>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Prompt>>,
}

impl ScriptedOracle {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: OracleError) -> Self {
        Self {
            reply: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(text: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(text)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.seen.lock().unwrap().clone()
    }

    pub fn templates(&self) -> Vec<ReadingTemplate> {
        self.prompts().iter().map(|p| p.template).collect()
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

pub struct ScriptedGeocoder;

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        if query.trim().chars().count() < 3 {
            return Err(GeocodeError::QueryTooShort);
        }
        Ok(vec![Place {
            display_name: format!("{}, Somewhere", query.trim()),
            lat: "51.5073219".to_string(),
            lon: "-0.1276474".to_string(),
        }])
    }
}

pub struct Harness {
    pub api: AstrolabeApi,
    pub oracle: Arc<ScriptedOracle>,
    pub store: Arc<MemoryStore>,
}

pub fn harness(oracle: ScriptedOracle) -> Harness {
    let oracle = Arc::new(oracle);
    let store = Arc::new(MemoryStore::default());
    let interpreter = Interpreter::new(oracle.clone(), Duration::from_millis(500));
    let api = AstrolabeApi::new(
        Arc::new(SwissEphemerisAdapter::moshier()),
        store.clone(),
        store.clone(),
        interpreter,
        Arc::new(ScriptedGeocoder),
    )
    .with_clock(Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())));
    Harness { api, oracle, store }
}

pub fn birth_request(name: &str, date: &str, time: &str) -> CreateChartRequest {
    CreateChartRequest {
        name: Some(name.to_string()),
        birth_date: Some(date.to_string()),
        birth_time: Some(time.to_string()),
        birth_place: Some("London".to_string()),
        latitude: Some(51.5),
        longitude: Some(-0.12),
        utc_offset: None,
        owner: None,
    }
}
