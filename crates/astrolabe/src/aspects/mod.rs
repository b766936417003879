pub mod calculator;
pub mod reports;
pub mod types;

pub use calculator::{find_aspects, sort_by_orb, strongest, AspectCalculator, SYNASTRY_TOP_N, TRANSIT_TOP_N};
pub use reports::{SunConnection, SynastryDynamics, SynastryReport, TransitReport, VenusMarsDynamics};
pub use types::{AspectKind, AspectMatch, AspectNature, AspectPoint};
