//! Aspect summaries for transit and synastry readings.

use serde::{Deserialize, Serialize};

use crate::aspects::calculator::{find_aspects, sort_by_orb, SYNASTRY_TOP_N, TRANSIT_TOP_N};
use crate::aspects::types::{AspectKind, AspectMatch, AspectNature, AspectPoint};

/// Moving bodies against a fixed natal chart, tightest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitReport {
    pub aspects: Vec<AspectMatch>,
}

impl TransitReport {
    pub fn new(transiting: &[AspectPoint], natal: &[AspectPoint]) -> Self {
        let mut aspects = find_aspects(transiting, Some(natal));
        sort_by_orb(&mut aspects);
        Self { aspects }
    }

    pub fn strongest(&self) -> &[AspectMatch] {
        &self.aspects[..self.aspects.len().min(TRANSIT_TOP_N)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryDynamics {
    pub harmonious: usize,
    pub challenging: usize,
    pub blending: usize,
    pub overall: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunConnection {
    pub how_they_see_each_other: String,
    pub power_dynamic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenusMarsDynamics {
    pub romantic_and_sexual: String,
    pub style: String,
}

/// Cross aspects between two natal charts with the relationship summary built on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryReport {
    pub dynamics: SynastryDynamics,
    /// The strongest cross aspects
    pub aspects: Vec<AspectMatch>,
    pub sun_connection: Option<SunConnection>,
    pub venus_mars: Option<VenusMarsDynamics>,
}

/// Phrase for the first kind present, checked conjunction, square, trine.
fn pick_phrase(aspects: &[&AspectMatch], phrases: [&str; 4]) -> String {
    let has = |kind: AspectKind| aspects.iter().any(|a| a.kind == kind);
    let phrase = if has(AspectKind::Conjunction) {
        phrases[0]
    } else if has(AspectKind::Square) {
        phrases[1]
    } else if has(AspectKind::Trine) {
        phrases[2]
    } else {
        phrases[3]
    };
    phrase.to_string()
}

impl SynastryReport {
    /// `person1` points come first in every match.
    pub fn new(person1: &[AspectPoint], person2: &[AspectPoint]) -> Self {
        let mut all = find_aspects(person1, Some(person2));
        sort_by_orb(&mut all);

        let count = |nature: AspectNature| all.iter().filter(|a| a.kind.nature() == nature).count();
        let harmonious = count(AspectNature::Harmonious);
        let challenging = count(AspectNature::Challenging);
        let blending = count(AspectNature::Blending);
        let overall = if harmonious > challenging {
            "Harmonious with growth potential"
        } else if challenging > harmonious {
            "Challenging but transformative"
        } else {
            "Balanced connection"
        };

        let sun: Vec<&AspectMatch> = all
            .iter()
            .filter(|a| a.first == "Sun" || a.second == "Sun")
            .collect();
        let sun_connection = (!sun.is_empty()).then(|| SunConnection {
            how_they_see_each_other: sun
                .iter()
                .map(|a| format!("{}-{}: {}", a.first, a.second, a.kind))
                .collect::<Vec<_>>()
                .join(", "),
            power_dynamic: pick_phrase(
                &sun,
                [
                    "Fused identities, strong mutual recognition",
                    "Different approaches creating productive tension",
                    "Natural understanding of each other's essence",
                    "Engaging with each other's core identity",
                ],
            ),
        });

        let venus_mars: Vec<&AspectMatch> = all
            .iter()
            .filter(|a| {
                (a.first == "Venus" && a.second == "Mars") || (a.first == "Mars" && a.second == "Venus")
            })
            .collect();
        let venus_mars = (!venus_mars.is_empty()).then(|| VenusMarsDynamics {
            romantic_and_sexual: venus_mars
                .iter()
                .map(|a| format!("{} (orb: {:.1}°)", a.kind, a.orb))
                .collect::<Vec<_>>()
                .join(", "),
            style: pick_phrase(
                &venus_mars,
                [
                    "Passionate, unified desires",
                    "Tension in attraction, sparking chemistry",
                    "Natural alignment in desire and action",
                    "Developing attraction and chemistry",
                ],
            ),
        });

        all.truncate(SYNASTRY_TOP_N);
        Self {
            dynamics: SynastryDynamics {
                harmonious,
                challenging,
                blending,
                overall: overall.to_string(),
            },
            aspects: all,
            sun_connection,
            venus_mars,
        }
    }
}
