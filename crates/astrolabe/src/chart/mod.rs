pub mod engine;
pub mod types;

pub use engine::{ascendant, equal_houses, local_sidereal_time, midheaven, ChartEngine};
pub use types::{BodyFailure, BodyPosition, ChartError, ChartResult, PlacedBody};
