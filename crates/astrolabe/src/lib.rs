//! Astrological calculation core: ephemeris access, chart angles and houses, aspects,
//! lunar phases and events, and the prompt/response contract for textual readings.
//!
//! Everything here is synchronous. Ephemeris lookups go through the Swiss Ephemeris library.

pub mod aspects;
pub mod chart;
pub mod ephemeris;
pub mod interpretation;
pub mod lunar;
pub mod sky;
pub mod western;

pub use aspects::{AspectCalculator, AspectKind, AspectMatch, AspectPoint, SynastryReport, TransitReport};
pub use chart::{BodyPosition, ChartEngine, ChartError, ChartResult};
pub use ephemeris::{AstroTime, Body, Ephemeris, EphemerisError, GeoLocation, SwissEphemerisAdapter};
pub use lunar::{MoonPhaseName, MoonPhaseSnapshot};
pub use sky::SkySnapshot;
pub use western::ZodiacSign;
