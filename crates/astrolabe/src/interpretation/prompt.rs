//! Deterministic prompt rendering.
//!
//! The same request always renders the same text: aspects arrive sorted by orb, numbers
//! use fixed precision, and no clock or random source is consulted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::aspects::{AspectMatch, SynastryReport};
use crate::chart::BodyPosition;
use crate::interpretation::templates::{GenerationParams, ReadingTemplate};
use crate::lunar::MoonPhaseSnapshot;
use crate::western::ZodiacSign;

/// The six signs a natal reading is built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalSigns {
    pub name: String,
    pub sun: ZodiacSign,
    pub moon: ZodiacSign,
    pub rising: ZodiacSign,
    pub mercury: ZodiacSign,
    pub venus: ZodiacSign,
    pub mars: ZodiacSign,
}

/// Computed facts for one reading.
#[derive(Debug, Clone, Copy)]
pub enum ReadingRequest<'a> {
    Moment {
        date: DateTime<Utc>,
        planets: &'a [BodyPosition],
        moon: Option<&'a MoonPhaseSnapshot>,
    },
    Natal {
        signs: &'a NatalSigns,
    },
    Transit {
        name: &'a str,
        target_date: DateTime<Utc>,
        /// Strongest transits, tightest first
        aspects: &'a [AspectMatch],
    },
    Synastry {
        person1: &'a str,
        person2: &'a str,
        target_date: DateTime<Utc>,
        report: &'a SynastryReport,
    },
    Compatibility {
        person1: &'a NatalSigns,
        person2: &'a NatalSigns,
    },
    DailyHoroscope {
        sign: ZodiacSign,
    },
    Lunar {
        moon: &'a MoonPhaseSnapshot,
    },
}

impl ReadingRequest<'_> {
    pub fn template(&self) -> ReadingTemplate {
        match self {
            ReadingRequest::Moment { .. } => ReadingTemplate::MomentForecast,
            ReadingRequest::Natal { .. } => ReadingTemplate::NatalSynthesis,
            ReadingRequest::Transit { .. } => ReadingTemplate::TransitForecast,
            ReadingRequest::Synastry { .. } => ReadingTemplate::SynastryForecast,
            ReadingRequest::Compatibility { .. } => ReadingTemplate::Compatibility,
            ReadingRequest::DailyHoroscope { .. } => ReadingTemplate::DailyHoroscope,
            ReadingRequest::Lunar { .. } => ReadingTemplate::LunarInsight,
        }
    }
}

/// A rendered prompt: persona, user message and sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub template: ReadingTemplate,
    pub system: String,
    pub user: String,
    pub params: GenerationParams,
}

pub fn build_prompt(request: &ReadingRequest<'_>) -> Prompt {
    let template = request.template();
    let user = match *request {
        ReadingRequest::Moment { date, planets, moon } => moment_prompt(date, planets, moon),
        ReadingRequest::Natal { signs } => natal_prompt(signs),
        ReadingRequest::Transit {
            name,
            target_date,
            aspects,
        } => transit_prompt(name, target_date, aspects),
        ReadingRequest::Synastry {
            person1,
            person2,
            target_date,
            report,
        } => synastry_prompt(person1, person2, target_date, report),
        ReadingRequest::Compatibility { person1, person2 } => compatibility_prompt(person1, person2),
        ReadingRequest::DailyHoroscope { sign } => horoscope_prompt(sign),
        ReadingRequest::Lunar { moon } => lunar_prompt(moon),
    };
    Prompt {
        template,
        system: template.system_persona().to_string(),
        user,
        params: template.params(),
    }
}

fn iso(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn moment_prompt(date: DateTime<Utc>, planets: &[BodyPosition], moon: Option<&MoonPhaseSnapshot>) -> String {
    let planet_info = planets
        .iter()
        .map(|p| {
            let retro = if p.retrograde { " [RETROGRADE]" } else { "" };
            format!(
                "{}: {} {:.2}°{} (Speed: {:.4}°/day)",
                p.body, p.sign, p.degree, retro, p.speed
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let moon_line = match moon {
        Some(m) => format!("{} ({:.1}% illuminated)", m.name, m.illumination),
        None => "unavailable".to_string(),
    };

    format!(
        r#"You are an expert astronomical interpreter. Analyze the EXACT planetary positions for {date} and provide a precise cosmic forecast.

EXACT PLANETARY POSITIONS:
{planet_info}

MOON PHASE: {moon_line}

Based on these PRECISE astronomical positions (not generic sign meanings), provide:

1. What is the energetic tone of this moment based on exact degrees?
2. Which planetary configurations are most significant right now?
3. What actions or themes are supported by these specific alignments?
4. What should be approached with caution given these exact positions?

Provide your interpretation in a flowing, poetic yet precise manner. Focus on the EXACT degrees and positions, not generic zodiac sign descriptions. Consider retrograde motion and planetary speeds in your analysis.

Return ONLY a valid JSON object with these exact keys:
{{
  "energetic_tone": "A paragraph describing the precise energetic quality of this moment based on exact planetary positions.",
  "key_alignments": "A paragraph highlighting the most significant exact degree-based configurations right now.",
  "supported_actions": "Specific guidance on what types of activities or themes are cosmically aligned at this exact moment.",
  "caution_areas": "What should be approached carefully given these precise astronomical positions.",
  "power_moment": "Is this a particularly powerful or significant moment? Why or why not based on the data?"
}}

Use evocative, precise language that references the actual degrees and positions. No generic horoscope language."#,
        date = iso(date),
    )
}

fn natal_prompt(s: &NatalSigns) -> String {
    let name_line = if s.name.trim().is_empty() {
        String::new()
    } else {
        format!("Name: {}\n", s.name.trim())
    };
    format!(
        r#"You are a mystical astrologer with deep knowledge of celestial wisdom. Generate a personalized, poetic cosmic synthesis for someone with the following birth chart:

Sun Sign (Identity): {sun}
Moon Sign (Emotion): {moon}
Rising Sign (Persona): {rising}
Mercury Sign (Mind): {mercury}
Venus Sign (Heart): {venus}
Mars Sign (Drive): {mars}
{name_line}
Write in second person ("you"), be specific to these exact sign combinations, and use evocative, mystical, premium language. Avoid clichéd horoscope generalities.

Return ONLY a valid JSON object with these exact keys, each a paragraph of plain text:
{{
  "sun_moon_dynamic": "The core tension and harmony between the {sun} Sun and {moon} Moon.",
  "rising_gateway": "How the {rising} Rising sign acts as the gateway for the {mercury} mind and {venus} heart.",
  "drive_and_destiny": "How the {mars} drive provides the energy to fulfill the {sun} destiny.",
  "soul_purpose": "All six celestial signatures woven into a cohesive narrative about the soul's specific purpose."
}}"#,
        sun = s.sun,
        moon = s.moon,
        rising = s.rising,
        mercury = s.mercury,
        venus = s.venus,
        mars = s.mars,
    )
}

fn transit_prompt(name: &str, target_date: DateTime<Utc>, aspects: &[AspectMatch]) -> String {
    let mut lines = String::new();
    if aspects.is_empty() {
        lines.push_str("- No major transits are within orb.\n");
    }
    for a in aspects {
        let _ = writeln!(
            lines,
            "- Transiting {} {} natal {}: {} (orb: {:.1}°)",
            a.first,
            a.kind,
            a.second,
            a.kind.meaning(),
            a.orb
        );
    }
    format!(
        r#"You are an expert predictive astrologer. Analyze the ACTIVE TRANSITS to {name}'s natal chart for {date}.

ACTIVE TRANSITS (sorted by exactness):
{lines}
Based on these SPECIFIC transits (NOT generic horoscopes), provide guidance. Return ALL values as PLAIN TEXT STRINGS, not objects:

1. "overall_theme" - The dominant theme these transits create (1-2 sentences)
2. "key_transits" - Which of these transits matter most and why
3. "opportunities" - What these transits open up
4. "challenges" - Where these transits create pressure
5. "timing_advice" - How to move with this timing

Return ONLY valid JSON with string values. Reference the SPECIFIC TRANSITS in your answer."#,
        name = name,
        date = iso(target_date),
        lines = lines,
    )
}

fn synastry_prompt(person1: &str, person2: &str, target_date: DateTime<Utc>, report: &SynastryReport) -> String {
    let d = &report.dynamics;
    let target = iso(target_date);
    let sun = report
        .sun_connection
        .as_ref()
        .map(|s| {
            format!(
                "SUN CONNECTION:\n- Aspects: {}\n- Power Dynamic: {}",
                s.how_they_see_each_other, s.power_dynamic
            )
        })
        .unwrap_or_default();
    let venus_mars = report
        .venus_mars
        .as_ref()
        .map(|v| {
            format!(
                "VENUS-MARS DYNAMICS (Romantic/Sexual):\n- Aspects: {}\n- Style: {}",
                v.romantic_and_sexual, v.style
            )
        })
        .unwrap_or_default();
    let key_aspects = report
        .aspects
        .iter()
        .map(|a| {
            format!(
                "- {} {} {}: {} (orb: {:.1}°)",
                a.first,
                a.kind,
                a.second,
                a.kind.meaning(),
                a.orb
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert relationship astrologer. Analyze this SYNASTRY REPORT for {person1} and {person2} as of {target}:

SYNASTRY ANALYSIS:
- Overall Dynamics: {overall}
- Harmonious Aspects (Trines, Sextiles): {harmonious}
- Challenging Aspects (Squares, Oppositions): {challenging}
- Blending Aspects (Conjunctions): {blending}

{sun}

{venus_mars}

KEY ASPECTS (sorted by significance):
{key_aspects}

Based on this ASTROLOGICAL ANALYSIS (NOT generic horoscopes), provide SPECIFIC guidance. Return ALL values as PLAIN TEXT STRINGS, not objects:

1. "relationship_energy" - What is the CORE energetic quality based on these ASPECTS? (1-2 sentences, plain text)
2. "how_person1_should_approach" - What should {person1} GIVE, TAKE, and AVOID with {person2}? (format: "Give: X. Take: Y. Avoid: Z." as plain text)
3. "how_person2_should_approach" - Same format for {person2}
4. "karmic_indicators" - Any fated patterns or relationship lessons (plain text)
5. "potential_challenges" - Where friction exists SPECIFICALLY (plain text)
6. "growth_opportunities" - How they grow TOGETHER (plain text)
7. "overall_verdict" - One powerful closing thought (plain text)

Return ONLY valid JSON with string values. Reference the SPECIFIC ASPECTS in your answer."#,
        overall = d.overall,
        harmonious = d.harmonious,
        challenging = d.challenging,
        blending = d.blending,
    )
}

fn compatibility_prompt(p1: &NatalSigns, p2: &NatalSigns) -> String {
    format!(
        r#"You are a master of synastry and relationship astrology.
Analyze the compatibility between two souls:
Person 1 ({n1}): Sun in {s1}, Moon in {m1}, Rising in {r1}.
Person 2 ({n2}): Sun in {s2}, Moon in {m2}, Rising in {r2}.

Also consider their personal planets:
Person 1: Mercury ({me1}), Venus ({v1}), Mars ({ma1}).
Person 2: Mercury ({me2}), Venus ({v2}), Mars ({ma2}).

Provide:
1. A compatibility score (0-100%).
2. A poetic, high-end interpretation of their spiritual and emotional connection.
3. Key strengths and potential challenges in their alignment.

Format the response as JSON:
{{
  "score": number,
  "interpretation": "...",
  "strengths": ["...", "..."],
  "challenges": ["...", "..."]
}}"#,
        n1 = p1.name,
        s1 = p1.sun,
        m1 = p1.moon,
        r1 = p1.rising,
        me1 = p1.mercury,
        v1 = p1.venus,
        ma1 = p1.mars,
        n2 = p2.name,
        s2 = p2.sun,
        m2 = p2.moon,
        r2 = p2.rising,
        me2 = p2.mercury,
        v2 = p2.venus,
        ma2 = p2.mars,
    )
}

fn horoscope_prompt(sign: ZodiacSign) -> String {
    format!(
        "You are a mystical astrologer. Generate a concise, poetic, and premium daily horoscope for the sign {}.\n\
         Focus on the energy of today, offering one piece of soulful advice.\n\
         Keep it to 2-3 sentences. Do not use generic cliches. Write in a sophisticated, mysterious tone.",
        sign
    )
}

fn lunar_prompt(moon: &MoonPhaseSnapshot) -> String {
    format!(
        "The moon is currently in its {} phase ({:.1}% illuminated).\n\
         Provide a 2-sentence mystical interpretation of what this lunar energy means for humanity right now.\n\
         Tone: Ethereal, insightful, premium.",
        moon.name, moon.illumination
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::AspectPoint;
    use crate::ephemeris::Body;
    use chrono::TimeZone;

    fn signs(name: &str) -> NatalSigns {
        NatalSigns {
            name: name.to_string(),
            sun: ZodiacSign::Capricorn,
            moon: ZodiacSign::Scorpio,
            rising: ZodiacSign::Libra,
            mercury: ZodiacSign::Sagittarius,
            venus: ZodiacSign::Sagittarius,
            mars: ZodiacSign::Aquarius,
        }
    }

    #[test]
    fn test_moment_prompt_lists_positions() {
        let planets = vec![BodyPosition {
            body: Body::Mars,
            longitude: 312.5,
            latitude: -1.0,
            distance: 1.8,
            speed: -0.12345,
            retrograde: true,
            sign: ZodiacSign::Aquarius,
            degree: 12.5,
        }];
        let moon = MoonPhaseSnapshot::from_measurements(100.0, 0.6);
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let prompt = build_prompt(&ReadingRequest::Moment {
            date,
            planets: &planets,
            moon: Some(&moon),
        });
        assert_eq!(prompt.template, ReadingTemplate::MomentForecast);
        assert!(prompt.user.contains("Mars: Aquarius 12.50° [RETROGRADE] (Speed: -0.1235°/day)"));
        assert!(prompt.user.contains("MOON PHASE: First Quarter (60.0% illuminated)"));
        assert!(prompt.user.contains("2024-05-01T12:00:00Z"));
        assert!(prompt.params.json_mode);
        assert_eq!(prompt.params.top_p, Some(0.9));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let p1 = vec![AspectPoint::new("Venus", 100.0), AspectPoint::new("Sun", 10.0)];
        let p2 = vec![AspectPoint::new("Mars", 190.0)];
        let report = SynastryReport::new(&p1, &p2);
        let request = ReadingRequest::Synastry {
            person1: "Ada",
            person2: "Bo",
            target_date: Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap(),
            report: &report,
        };
        let a = build_prompt(&request);
        let b = build_prompt(&request);
        assert_eq!(a, b);
        assert!(a.user.contains("for Ada and Bo as of 2024-02-14T00:00:00Z:"));
        assert!(a.user.contains("- Venus Square Mars: Tension requiring adjustment, growth through friction (orb: 0.0°)"));
        assert!(a.user.contains("What should Ada GIVE, TAKE, and AVOID with Bo?"));
    }

    #[test]
    fn test_plain_prompts() {
        let prompt = build_prompt(&ReadingRequest::DailyHoroscope { sign: ZodiacSign::Leo });
        assert!(prompt.user.contains("for the sign Leo."));
        assert!(!prompt.params.json_mode);
        assert_eq!(prompt.params.max_tokens, 300);

        let natal = signs("Ada");
        let prompt = build_prompt(&ReadingRequest::Natal { signs: &natal });
        assert!(prompt.user.contains("Rising Sign (Persona): Libra"));
        assert!(prompt.user.contains("Name: Ada"));
    }
}
