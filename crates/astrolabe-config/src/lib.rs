use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Candidate locations for `configs/astrolabe.toml`, relative to the workspace root or a
/// member crate.
pub const CONFIG_PATHS: [&str; 2] = ["configs/astrolabe.toml", "../../configs/astrolabe.toml"];

pub const SWISS_PATH_ENV: &str = "SWISS_EPHEMERIS_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EphemerisBackend {
    /// Swiss Ephemeris data files, or the library's Moshier theory when none are installed
    Swiss,
    /// Always the Moshier theory built into the Swiss Ephemeris library
    Moshier,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EphemerisSettings {
    pub backend: EphemerisBackend,
    pub path: Option<PathBuf>,
}

impl Default for EphemerisSettings {
    fn default() -> Self {
        Self {
            backend: EphemerisBackend::Swiss,
            path: None,
        }
    }
}

impl EphemerisSettings {
    /// Configured data directory, else `SWISS_EPHEMERIS_PATH`.
    pub fn data_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| std::env::var(SWISS_PATH_ENV).ok().map(PathBuf::from))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `sqlite://...`, or `memory` for the in-process store
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://astrolabe.db".to_string(),
            max_connections: 4,
        }
    }
}

impl DatabaseSettings {
    pub fn is_memory(&self) -> bool {
        self.url == "memory"
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl OracleSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn api_key(&self) -> anyhow::Result<String> {
        std::env::var(&self.api_key_env)
            .with_context(|| format!("Oracle API key not set (expected env var {})", self.api_key_env))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    pub base_url: String,
    pub user_agent: String,
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "astrolabe/0.1".to_string(),
            limit: 5,
            timeout_secs: 10,
        }
    }
}

impl GeocoderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HoroscopeSettings {
    pub ttl_hours: u64,
}

impl Default for HoroscopeSettings {
    fn default() -> Self {
        Self { ttl_hours: 48 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AstrolabeConfig {
    pub ephemeris: EphemerisSettings,
    pub database: DatabaseSettings,
    pub oracle: OracleSettings,
    pub geocoder: GeocoderSettings,
    pub horoscope: HoroscopeSettings,
}

impl AstrolabeConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: AstrolabeConfig =
            toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse astrolabe.toml: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be greater than 0");
        }
        if self.oracle.timeout_secs == 0 {
            anyhow::bail!("oracle.timeout_secs must be greater than 0");
        }
        if self.oracle.model.trim().is_empty() {
            anyhow::bail!("oracle.model must not be empty");
        }
        if self.geocoder.timeout_secs == 0 {
            anyhow::bail!("geocoder.timeout_secs must be greater than 0");
        }
        if self.geocoder.limit == 0 {
            anyhow::bail!("geocoder.limit must be greater than 0");
        }
        if self.horoscope.ttl_hours == 0 {
            anyhow::bail!("horoscope.ttl_hours must be greater than 0");
        }
        Ok(())
    }
}

/// Try common relative paths for `configs/astrolabe.toml`.
pub fn read_config_toml_text() -> anyhow::Result<(PathBuf, String)> {
    for p in &CONFIG_PATHS {
        if let Ok(c) = fs::read_to_string(p) {
            return Ok((PathBuf::from(p), c));
        }
    }
    anyhow::bail!("Could not load astrolabe.toml from {:?}", CONFIG_PATHS);
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AstrolabeConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    AstrolabeConfig::from_toml_str(&text).with_context(|| format!("Invalid config in {}", path.display()))
}

/// Load from `path`, or the first candidate path that exists. With no explicit path and
/// no file on disk, the defaults are used.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AstrolabeConfig> {
    if let Some(path) = path {
        return load_from_path(path);
    }
    match read_config_toml_text() {
        Ok((found, text)) => {
            AstrolabeConfig::from_toml_str(&text).with_context(|| format!("Invalid config in {}", found.display()))
        }
        Err(_) => Ok(AstrolabeConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AstrolabeConfig::from_toml_str("").unwrap();
        assert_eq!(config, AstrolabeConfig::default());
        assert_eq!(config.horoscope.ttl_hours, 48);
        assert_eq!(config.oracle.model, "llama-3.3-70b-versatile");
        assert_eq!(config.ephemeris.backend, EphemerisBackend::Swiss);
    }

    #[test]
    fn test_moshier_backend() {
        let config = AstrolabeConfig::from_toml_str("[ephemeris]\nbackend = \"moshier\"\n").unwrap();
        assert_eq!(config.ephemeris.backend, EphemerisBackend::Moshier);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = AstrolabeConfig::from_toml_str(
            r#"
            [ephemeris]
            backend = "swiss"
            path = "/data/ephe"

            [database]
            url = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(config.ephemeris.backend, EphemerisBackend::Swiss);
        assert_eq!(config.ephemeris.data_path(), Some(PathBuf::from("/data/ephe")));
        assert!(config.database.is_memory());
        assert_eq!(config.database.max_connections, 4);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = AstrolabeConfig::from_toml_str("[oracle]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("oracle.timeout_secs"));
    }

    #[test]
    fn test_rejects_unknown_backend() {
        assert!(AstrolabeConfig::from_toml_str("[ephemeris]\nbackend = \"analytic\"\n").is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[geocoder]\nlimit = 3").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.geocoder.limit, 3);
    }
}
