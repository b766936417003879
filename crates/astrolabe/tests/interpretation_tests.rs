use astrolabe::aspects::{AspectPoint, SynastryReport};
use astrolabe::interpretation::{
    build_prompt, DailyHoroscope, NatalReading, ParseOutcome, Reading, ReadingRequest, ReadingTemplate,
    SynastryReading,
};
use astrolabe::western::ZodiacSign;
use chrono::{TimeZone, Utc};

#[test]
fn test_malformed_synastry_response_gives_full_fallback() {
    let (reading, outcome) = SynastryReading::parse("The stars whisper, but not in JSON");

    assert_eq!(outcome, ParseOutcome::Fallback);
    assert_eq!(reading, SynastryReading::fallback());
    assert_eq!(reading.relationship_energy, "The stars align for this connection...");
    assert_eq!(reading.overall_verdict, "This connection holds beautiful promise...");
}

#[test]
fn test_missing_key_fills_only_that_key() {
    let raw = r#"{
        "relationship_energy": "Electric.",
        "how_person1_should_approach": "Slowly.",
        "how_person2_should_approach": "Boldly.",
        "potential_challenges": "Pride.",
        "growth_opportunities": "Trust.",
        "overall_verdict": "Worth it."
    }"#;

    let (reading, outcome) = SynastryReading::parse(raw);

    assert_eq!(reading.relationship_energy, "Electric.");
    assert_eq!(reading.overall_verdict, "Worth it.");
    assert_eq!(reading.karmic_indicators, "Destiny weaves subtle threads...");
    assert_eq!(
        outcome,
        ParseOutcome::Partial {
            missing: vec!["karmic_indicators".to_string()]
        }
    );
}

#[test]
fn test_nested_approach_object_is_flattened() {
    let raw = r#"{
        "sun_moon_dynamic": "a",
        "rising_gateway": "b",
        "drive_and_destiny": {"give": "time", "take": "space", "avoid": "haste"},
        "soul_purpose": "d"
    }"#;

    let (reading, outcome) = NatalReading::parse(raw);

    assert_eq!(outcome, ParseOutcome::Complete);
    assert_eq!(reading.drive_and_destiny, "Give: time\nTake: space\nAvoid: haste");
}

#[test]
fn test_plain_horoscope_uses_whole_text() {
    let (reading, outcome) = DailyHoroscope::parse("  Today favors patience.  ");
    assert_eq!(outcome, ParseOutcome::Complete);
    assert_eq!(reading.horoscope, "Today favors patience.");

    let (empty, outcome) = DailyHoroscope::parse("   ");
    assert_eq!(outcome, ParseOutcome::Fallback);
    assert_eq!(empty.horoscope, "The stars are silent today, but their presence remains.");
}

#[test]
fn test_prompts_are_deterministic() {
    let person1 = vec![AspectPoint::new("Sun", 280.0), AspectPoint::new("Venus", 100.0)];
    let person2 = vec![AspectPoint::new("Moon", 45.0), AspectPoint::new("Mars", 190.0)];
    let report = SynastryReport::new(&person1, &person2);
    let request = ReadingRequest::Synastry {
        person1: "Ada",
        person2: "Grace",
        target_date: Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap(),
        report: &report,
    };

    let a = build_prompt(&request);
    let b = build_prompt(&request);

    assert_eq!(a, b);
    assert_eq!(a.template, ReadingTemplate::SynastryForecast);
    assert!(a.user.contains("Ada"));
    assert!(a.params.json_mode);
}

#[test]
fn test_horoscope_prompt_is_plain_text() {
    let prompt = build_prompt(&ReadingRequest::DailyHoroscope {
        sign: ZodiacSign::Leo,
    });
    assert!(prompt.user.contains("Leo"));
    assert!(!prompt.params.json_mode);
    assert_eq!(prompt.params.max_tokens, 300);
}
