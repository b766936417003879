pub mod events;
pub mod phase;

pub use events::{horizon_events, next_phase_events, scan_events, EventKind, NextPhaseEvents, SkyEvent};
pub use phase::{moon_phase, MoonPhaseName, MoonPhaseSnapshot, SYNODIC_MONTH_DAYS};
