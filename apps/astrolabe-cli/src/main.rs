mod setup;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

use astrolabe::aspects::AspectPoint;
use astrolabe_service::api::{
    CreateChartRequest, SkyRequest, SynastryRequest, SynthesisRequest, TransitRequest,
};
use astrolabe_service::{ApiError, AstrolabeApi};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Config file (default: first of configs/astrolabe.toml, ../configs/astrolabe.toml, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute and store a natal chart.
    Chart {
        #[arg(long)]
        name: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM or HH:MM:SS
        #[arg(long)]
        time: String,
        #[arg(long)]
        place: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// +HH:MM, -HH:MM or Z
        #[arg(long, allow_hyphen_values = true)]
        utc_offset: Option<String>,
        #[arg(long)]
        owner: Option<Uuid>,
    },
    /// List stored charts, newest first.
    Charts {
        #[arg(long)]
        owner: Option<Uuid>,
    },
    /// Show a stored chart with its aspects.
    Show { id: Uuid },
    /// Delete a stored chart.
    Delete {
        id: Uuid,
        #[arg(long)]
        owner: Option<Uuid>,
    },
    /// Recompute a legacy chart in the current format.
    Migrate { id: Uuid },
    /// Planet positions, moon phase and events for a moment.
    Sky {
        /// RFC 3339 timestamp or YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Ask the oracle for a forecast of the moment
        #[arg(long)]
        interpret: bool,
    },
    /// Today's moon phase, next full and new moon, and a lunar reading.
    Moon,
    /// Transits of the moving planets over a stored chart or explicit natal points.
    Transits {
        #[arg(long, conflicts_with = "point")]
        chart: Option<Uuid>,
        /// Natal point as NAME=LONGITUDE, repeatable
        #[arg(long, value_parser = parse_point)]
        point: Vec<AspectPoint>,
        #[arg(long)]
        date: String,
        #[arg(long)]
        name: Option<String>,
        /// Ask the oracle for a transit forecast
        #[arg(long)]
        forecast: bool,
    },
    /// Compatibility between two stored charts.
    Synastry {
        first: Uuid,
        second: Uuid,
        /// Full synastry report with a relationship forecast
        #[arg(long)]
        forecast: bool,
        /// Forecast date, RFC 3339 or YYYY-MM-DD (default: now)
        #[arg(long, requires = "forecast")]
        date: Option<String>,
    },
    /// Natal synthesis reading for a stored chart.
    Synthesis { id: Uuid },
    /// Daily horoscope for a sun sign.
    Horoscope { sign: String },
    /// Look up coordinates for a place name.
    Geocode { query: String },
}

fn parse_point(text: &str) -> Result<AspectPoint, String> {
    let (name, longitude) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=LONGITUDE, got {:?}", text))?;
    let longitude: f64 = longitude
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude {:?}", longitude))?;
    if name.trim().is_empty() {
        return Err("point name must not be empty".to_string());
    }
    Ok(AspectPoint::new(name.trim(), longitude))
}

fn json<T: Serialize>(value: T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

async fn run(api: &AstrolabeApi, command: Command) -> Result<serde_json::Value, ApiError> {
    match command {
        Command::Chart {
            name,
            date,
            time,
            place,
            lat,
            lon,
            utc_offset,
            owner,
        } => json(
            api.create_chart(CreateChartRequest {
                name: Some(name),
                birth_date: Some(date),
                birth_time: Some(time),
                birth_place: Some(place),
                latitude: Some(lat),
                longitude: Some(lon),
                utc_offset,
                owner,
            })
            .await?,
        ),
        Command::Charts { owner } => json(api.list_charts(owner).await?),
        Command::Show { id } => json(api.get_chart(id).await?),
        Command::Delete { id, owner } => {
            api.delete_chart(id, owner).await?;
            Ok(serde_json::json!({ "deleted": id }))
        }
        Command::Migrate { id } => json(api.migrate_chart(id).await?),
        Command::Sky {
            date,
            lat,
            lon,
            interpret,
        } => {
            let request = SkyRequest {
                target_date: Some(date),
                latitude: lat,
                longitude: lon,
            };
            if interpret {
                json(api.interpret_sky(request).await?)
            } else {
                json(api.sky_snapshot(request).await?)
            }
        }
        Command::Moon => json(api.lunar_report().await?),
        Command::Transits {
            chart,
            point,
            date,
            name,
            forecast,
        } => {
            let request = TransitRequest {
                chart_id: chart,
                natal_points: (!point.is_empty()).then_some(point),
                target_date: Some(date),
                name,
            };
            if forecast {
                json(api.transit_forecast(request).await?)
            } else {
                json(api.transits(request).await?)
            }
        }
        Command::Synastry {
            first,
            second,
            forecast,
            date,
        } => {
            let request = SynastryRequest {
                chart_id1: Some(first),
                chart_id2: Some(second),
                target_date: date,
            };
            if forecast {
                json(api.synastry_forecast(request).await?)
            } else {
                json(api.synastry_compatibility(request).await?)
            }
        }
        Command::Synthesis { id } => json(api.natal_synthesis(SynthesisRequest { chart_id: Some(id) }).await?),
        Command::Horoscope { sign } => json(api.daily_horoscope(&sign).await?),
        Command::Geocode { query } => json(api.geocode(&query).await?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter(None, log::LevelFilter::Warn)
        .filter(Some("astrolabe"), level)
        .filter(Some("astrolabe_service"), level)
        .parse_default_env()
        .init();

    let config = astrolabe_config::load_config(cli.config.as_deref())?;
    let api = setup::build_api(&config).await?;

    match run(&api, cli.command).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err.body())?);
            log::debug!("request failed with status {}", err.status_code());
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        let point = parse_point("Sun=280.5").unwrap();
        assert_eq!(point.name, "Sun");
        assert_eq!(point.longitude, 280.5);
        assert!(parse_point("Sun").is_err());
        assert!(parse_point("=10").is_err());
        assert!(parse_point("Moon=north").is_err());
    }

    #[test]
    fn test_chart_args_accept_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "astrolabe", "chart", "--name", "Ada", "--date", "1990-07-15", "--time", "08:30", "--place", "Lima",
            "--lat", "-12.05", "--lon", "-77.04", "--utc-offset", "-05:00",
        ])
        .unwrap();
        match cli.command {
            Command::Chart { lat, lon, utc_offset, .. } => {
                assert_eq!(lat, -12.05);
                assert_eq!(lon, -77.04);
                assert_eq!(utc_offset.as_deref(), Some("-05:00"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_transits_chart_and_points_conflict() {
        let id = Uuid::new_v4().to_string();
        let result = Cli::try_parse_from([
            "astrolabe", "transits", "--chart", &id, "--point", "Sun=10", "--date", "2024-06-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_synastry_date_needs_forecast() {
        let (a, b) = (Uuid::new_v4().to_string(), Uuid::new_v4().to_string());
        let cli = Cli::try_parse_from(["astrolabe", "synastry", &a, &b, "--forecast", "--date", "2024-02-14"]).unwrap();
        match cli.command {
            Command::Synastry { forecast, date, .. } => {
                assert!(forecast);
                assert_eq!(date.as_deref(), Some("2024-02-14"));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["astrolabe", "synastry", &a, &b, "--date", "2024-02-14"]).is_err());
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = Cli::try_parse_from(["astrolabe", "moon", "--config", "/tmp/a.toml", "-v"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/a.toml")));
        assert!(cli.verbose);
    }
}
