//! Zodiac signs and the longitude → sign mapping.
//!
//! `sign = floor(normalized_longitude / 30)` holds without exception; everything that
//! labels a longitude goes through `sign_of`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ephemeris::time::normalize_degrees;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn from_index(index: usize) -> ZodiacSign {
        Self::ALL[index % 12]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "♈",
            ZodiacSign::Taurus => "♉",
            ZodiacSign::Gemini => "♊",
            ZodiacSign::Cancer => "♋",
            ZodiacSign::Leo => "♌",
            ZodiacSign::Virgo => "♍",
            ZodiacSign::Libra => "♎",
            ZodiacSign::Scorpio => "♏",
            ZodiacSign::Sagittarius => "♐",
            ZodiacSign::Capricorn => "♑",
            ZodiacSign::Aquarius => "♒",
            ZodiacSign::Pisces => "♓",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ZodiacSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZodiacSign::ALL
            .iter()
            .copied()
            .find(|sign| sign.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown zodiac sign: {}", s))
    }
}

/// Get sign index (0-11) from longitude
pub fn sign_index(longitude: f64) -> usize {
    // clamp guards the single float case where normalize returns a value that divides to 12.0
    ((normalize_degrees(longitude) / 30.0).floor() as usize).min(11)
}

pub fn sign_of(longitude: f64) -> ZodiacSign {
    ZodiacSign::from_index(sign_index(longitude))
}

/// Degree within the sign, [0, 30).
pub fn degree_in_sign(longitude: f64) -> f64 {
    let normalized = normalize_degrees(longitude);
    normalized - 30.0 * sign_index(normalized) as f64
}

/// A longitude with its sign labels precomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignPlacement {
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub degree: f64,
}

impl SignPlacement {
    pub fn new(longitude: f64) -> Self {
        let longitude = normalize_degrees(longitude);
        Self {
            longitude,
            sign: sign_of(longitude),
            degree: degree_in_sign(longitude),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_boundaries() {
        assert_eq!(sign_of(0.0), ZodiacSign::Aries);
        assert_eq!(sign_of(29.999), ZodiacSign::Aries);
        assert_eq!(sign_of(30.0), ZodiacSign::Taurus);
        assert_eq!(sign_of(280.0), ZodiacSign::Capricorn);
        assert_eq!(sign_of(359.999), ZodiacSign::Pisces);
    }

    #[test]
    fn test_sign_periodicity() {
        for k in -3..=3 {
            for &lon in &[0.0, 15.5, 89.9, 180.0, 271.3, 359.5] {
                assert_eq!(sign_of(lon), sign_of(lon + 360.0 * k as f64));
            }
        }
    }

    #[test]
    fn test_degree_in_sign_range() {
        for &lon in &[-725.3, -0.0001, 0.0, 29.9999, 30.0, 123.4, 359.9999, 1e6] {
            let deg = degree_in_sign(lon);
            assert!((0.0..30.0).contains(&deg), "{} -> {}", lon, deg);
            assert!(sign_index(lon) <= 11);
        }
    }

    #[test]
    fn test_sign_from_str() {
        assert_eq!("capricorn".parse::<ZodiacSign>().unwrap(), ZodiacSign::Capricorn);
        assert_eq!(" Leo ".parse::<ZodiacSign>().unwrap(), ZodiacSign::Leo);
        assert!("Ophiuchus".parse::<ZodiacSign>().is_err());
    }
}
