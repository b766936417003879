use serde::{Deserialize, Serialize};
use std::fmt;

/// Named aspect types in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

/// How an aspect is read in relationship and transit summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectNature {
    Blending,
    Harmonious,
    Challenging,
}

impl AspectKind {
    /// Checked in this order; the first band that contains the separation wins.
    pub const PRIORITY: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "Conjunction",
            AspectKind::Sextile => "Sextile",
            AspectKind::Square => "Square",
            AspectKind::Trine => "Trine",
            AspectKind::Opposition => "Opposition",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "☌",
            AspectKind::Sextile => "✱",
            AspectKind::Square => "□",
            AspectKind::Trine => "△",
            AspectKind::Opposition => "☍",
        }
    }

    /// Exact angle for this aspect
    pub fn angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Opposition => 180.0,
        }
    }

    /// Maximum orb
    pub fn max_orb(self) -> f64 {
        match self {
            AspectKind::Sextile => 6.0,
            _ => 8.0,
        }
    }

    pub fn nature(self) -> AspectNature {
        match self {
            AspectKind::Conjunction => AspectNature::Blending,
            AspectKind::Sextile | AspectKind::Trine => AspectNature::Harmonious,
            AspectKind::Square | AspectKind::Opposition => AspectNature::Challenging,
        }
    }

    pub fn meaning(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "Blending of energies, shared focus",
            AspectKind::Sextile => "Harmonious opportunity, ease of expression",
            AspectKind::Square => "Tension requiring adjustment, growth through friction",
            AspectKind::Trine => "Natural flow, talents support each other",
            AspectKind::Opposition => "Polarities seeking integration, projection",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named longitude fed to the aspect engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectPoint {
    pub name: String,
    pub longitude: f64,
}

impl AspectPoint {
    pub fn new(name: impl Into<String>, longitude: f64) -> Self {
        Self {
            name: name.into(),
            longitude,
        }
    }
}

/// One matched aspect between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectMatch {
    /// Point from the first set
    pub first: String,
    /// Point from the second set (or the later point of a self-aspect pair)
    pub second: String,
    pub kind: AspectKind,
    /// |separation − exact angle|
    pub orb: f64,
    pub first_longitude: f64,
    pub second_longitude: f64,
}

impl AspectMatch {
    /// "Venus Square Mars"
    pub fn label(&self) -> String {
        format!("{} {} {}", self.first, self.kind, self.second)
    }
}
