//! Reading templates and their fixed output schemas.
//!
//! Each template owns its key set. A key has two texts: `missing`, used when a parsed
//! response lacks only that key, and `fallback`, used when the whole response is unusable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::interpretation::parse::{parse_interpretation, parse_plain, ParseOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub missing: &'static str,
    pub fallback: &'static str,
}

const fn field(key: &'static str, missing: &'static str, fallback: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        missing,
        fallback,
    }
}

/// Sampling parameters sent with a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: Option<f64>,
    /// Ask the oracle for a strict JSON object
    pub json_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingTemplate {
    MomentForecast,
    NatalSynthesis,
    TransitForecast,
    SynastryForecast,
    Compatibility,
    DailyHoroscope,
    LunarInsight,
}

const MOMENT_FIELDS: &[FieldSpec] = &[
    field("energetic_tone", "The cosmic winds are shifting...", "The cosmic winds are shifting..."),
    field("key_alignments", "Planets align in mysterious ways...", "Planets align in mysterious ways..."),
    field("supported_actions", "Listen to the celestial rhythms...", "Listen to the celestial rhythms..."),
    field("caution_areas", "Some paths remain obscured...", "Some paths remain obscured..."),
    field("power_moment", "Each moment holds unique potential...", "Each moment holds unique potential..."),
];

const NATAL_FIELDS: &[FieldSpec] = &[
    field("sun_moon_dynamic", "The stars are aligning...", "The stars are aligning..."),
    field("rising_gateway", "Your rising sign opens a quiet doorway...", "Your rising sign opens a quiet doorway..."),
    field("drive_and_destiny", "Your drive gathers its strength in silence...", "Your drive gathers its strength in silence..."),
    field("soul_purpose", "Your purpose unfolds one season at a time...", "Your purpose unfolds one season at a time..."),
];

const TRANSIT_FIELDS: &[FieldSpec] = &[
    field("overall_theme", "The current sky is still settling into focus...", "The current sky is still settling into focus..."),
    field("key_transits", "The moving planets trace subtle paths across your chart...", "The moving planets trace subtle paths across your chart..."),
    field("opportunities", "Openings appear for those who watch closely...", "Openings appear for those who watch closely..."),
    field("challenges", "Some passages call for patience...", "Some passages call for patience..."),
    field("timing_advice", "Move with the rhythm of the days ahead...", "Move with the rhythm of the days ahead..."),
];

const SYNASTRY_FIELDS: &[FieldSpec] = &[
    field("relationship_energy", "The cosmic connection unfolds...", "The stars align for this connection..."),
    field("how_person1_should_approach", "Approach with openness and authenticity...", "Trust the journey and embrace the moment..."),
    field("how_person2_should_approach", "Approach with openness and authenticity...", "Follow your heart with courage..."),
    field("karmic_indicators", "Destiny weaves subtle threads...", "Destiny weaves subtle threads between souls..."),
    field("potential_challenges", "Patience is key...", "Patience and understanding are key..."),
    field("growth_opportunities", "Love conquers all...", "Together you can transcend individual limits..."),
    field("overall_verdict", "This connection holds promise...", "This connection holds beautiful promise..."),
];

const COMPATIBILITY_FIELDS: &[FieldSpec] = &[
    field("score", "Unscored", "Unscored"),
    field("interpretation", "Two souls meet under a shared sky...", "Two souls meet under a shared sky..."),
    field("strengths", "Shared curiosity and mutual respect...", "Shared curiosity and mutual respect..."),
    field("challenges", "Differences ask for patience and care...", "Differences ask for patience and care..."),
];

const HOROSCOPE_FIELDS: &[FieldSpec] = &[field(
    "horoscope",
    "The stars are silent today, but their presence remains.",
    "The stars are silent today, but their presence remains.",
)];

const LUNAR_FIELDS: &[FieldSpec] = &[field(
    "interpretation",
    "The moon's influence is subtle yet profound.",
    "The moon's influence is subtle yet profound.",
)];

impl ReadingTemplate {
    pub const ALL: [ReadingTemplate; 7] = [
        ReadingTemplate::MomentForecast,
        ReadingTemplate::NatalSynthesis,
        ReadingTemplate::TransitForecast,
        ReadingTemplate::SynastryForecast,
        ReadingTemplate::Compatibility,
        ReadingTemplate::DailyHoroscope,
        ReadingTemplate::LunarInsight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReadingTemplate::MomentForecast => "moment_forecast",
            ReadingTemplate::NatalSynthesis => "natal_synthesis",
            ReadingTemplate::TransitForecast => "transit_forecast",
            ReadingTemplate::SynastryForecast => "synastry_forecast",
            ReadingTemplate::Compatibility => "compatibility",
            ReadingTemplate::DailyHoroscope => "daily_horoscope",
            ReadingTemplate::LunarInsight => "lunar_insight",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            ReadingTemplate::MomentForecast => MOMENT_FIELDS,
            ReadingTemplate::NatalSynthesis => NATAL_FIELDS,
            ReadingTemplate::TransitForecast => TRANSIT_FIELDS,
            ReadingTemplate::SynastryForecast => SYNASTRY_FIELDS,
            ReadingTemplate::Compatibility => COMPATIBILITY_FIELDS,
            ReadingTemplate::DailyHoroscope => HOROSCOPE_FIELDS,
            ReadingTemplate::LunarInsight => LUNAR_FIELDS,
        }
    }

    pub fn field(self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.key == key)
    }

    pub fn system_persona(self) -> &'static str {
        match self {
            ReadingTemplate::MomentForecast => "You are a master astronomical interpreter who reads the precise language of the cosmos based on exact planetary positions and degrees.",
            ReadingTemplate::NatalSynthesis => "You are a master astrologer who creates deeply personalized, poetic cosmic readings. Your language is mystical, evocative, and premium. You avoid clichés and generic horoscope language.",
            ReadingTemplate::TransitForecast => "You are a master astrologer who interprets TRANSITS specifically - how the moving planets activate the fixed points of a natal chart.",
            ReadingTemplate::SynastryForecast => "You are a master relationship astrologer. You interpret ASPECTS specifically - what Conjunction, Square, Trine, etc. MEAN in relationships.",
            ReadingTemplate::Compatibility => "You are a master astrologer. Your readings are premium, poetic, and psychologically insightful. Always return strictly valid JSON.",
            ReadingTemplate::DailyHoroscope => "You are a master of celestial wisdom who speaks in poetic but clear truths.",
            ReadingTemplate::LunarInsight => "You are a lunar priestess who interprets the shifting tides of the moon.",
        }
    }

    pub fn params(self) -> GenerationParams {
        let (temperature, max_tokens, top_p, json_mode) = match self {
            ReadingTemplate::MomentForecast => (0.8, 1500, Some(0.9), true),
            ReadingTemplate::NatalSynthesis => (0.8, 1024, Some(0.9), true),
            ReadingTemplate::TransitForecast => (0.7, 1500, None, true),
            ReadingTemplate::SynastryForecast => (0.7, 1500, None, true),
            ReadingTemplate::Compatibility => (0.7, 1024, None, true),
            ReadingTemplate::DailyHoroscope => (0.7, 300, None, false),
            ReadingTemplate::LunarInsight => (0.7, 150, None, false),
        };
        GenerationParams {
            temperature,
            max_tokens,
            top_p,
            json_mode,
        }
    }
}

impl fmt::Display for ReadingTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed reading produced from one template.
pub trait Reading: Sized + Serialize {
    const TEMPLATE: ReadingTemplate;

    /// Build the reading by asking `value` for each key of the template.
    fn from_fields<F: FnMut(&'static str) -> String>(value: F) -> Self;

    /// The complete fallback reading.
    fn fallback() -> Self {
        Self::from_fields(|key| {
            Self::TEMPLATE
                .field(key)
                .map(|f| f.fallback.to_string())
                .unwrap_or_default()
        })
    }

    /// Parse raw oracle text. Never fails; unusable input yields the fallback.
    fn parse(raw: &str) -> (Self, ParseOutcome) {
        let fields = Self::TEMPLATE.fields();
        let mut parsed = if Self::TEMPLATE.params().json_mode {
            parse_interpretation(raw, fields)
        } else {
            parse_plain(raw, &fields[0])
        };
        let reading = Self::from_fields(|key| parsed.take(key));
        (reading, parsed.outcome)
    }
}

macro_rules! reading {
    ($(#[$meta:meta])* $name:ident => $template:expr, { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            $(pub $field: String,)+
        }

        impl Reading for $name {
            const TEMPLATE: ReadingTemplate = $template;

            fn from_fields<F: FnMut(&'static str) -> String>(mut value: F) -> Self {
                Self {
                    $($field: value(stringify!($field)),)+
                }
            }
        }
    };
}

reading!(
    /// Forecast for a single moment of the sky
    MomentReading => ReadingTemplate::MomentForecast, {
        energetic_tone,
        key_alignments,
        supported_actions,
        caution_areas,
        power_moment,
    }
);

reading!(
    NatalReading => ReadingTemplate::NatalSynthesis, {
        sun_moon_dynamic,
        rising_gateway,
        drive_and_destiny,
        soul_purpose,
    }
);

reading!(
    TransitReading => ReadingTemplate::TransitForecast, {
        overall_theme,
        key_transits,
        opportunities,
        challenges,
        timing_advice,
    }
);

reading!(
    SynastryReading => ReadingTemplate::SynastryForecast, {
        relationship_energy,
        how_person1_should_approach,
        how_person2_should_approach,
        karmic_indicators,
        potential_challenges,
        growth_opportunities,
        overall_verdict,
    }
);

reading!(
    CompatibilityReading => ReadingTemplate::Compatibility, {
        score,
        interpretation,
        strengths,
        challenges,
    }
);

reading!(
    DailyHoroscope => ReadingTemplate::DailyHoroscope, {
        horoscope,
    }
);

reading!(
    LunarReading => ReadingTemplate::LunarInsight, {
        interpretation,
    }
);
