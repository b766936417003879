pub mod adapter;
pub mod swiss;
pub mod time;
pub mod types;

pub use adapter::{Ephemeris, EphemerisError};
pub use swiss::{SwissEphemerisAdapter, SwissSource};
pub use time::AstroTime;
pub use types::{Body, EclipseBody, EclipseEvent, EclipseKind, EclipticVector, GeoLocation};
