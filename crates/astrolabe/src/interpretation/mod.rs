pub mod parse;
pub mod prompt;
pub mod templates;

pub use parse::{parse_interpretation, parse_plain, ParseOutcome, ParsedInterpretation};
pub use prompt::{build_prompt, NatalSigns, Prompt, ReadingRequest};
pub use templates::{
    CompatibilityReading, DailyHoroscope, FieldSpec, GenerationParams, LunarReading, MomentReading,
    NatalReading, Reading, ReadingTemplate, SynastryReading, TransitReading,
};
