use crate::aspects::types::{AspectKind, AspectMatch, AspectPoint};
use crate::ephemeris::time::normalize_degrees;

/// Strongest aspects kept for synastry summaries.
pub const SYNASTRY_TOP_N: usize = 5;
/// Strongest aspects kept for transit and forecast summaries.
pub const TRANSIT_TOP_N: usize = 8;

/// Aspect calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct AspectCalculator;

impl AspectCalculator {
    /// Create a new aspect calculator
    pub fn new() -> Self {
        Self
    }

    /// Shorter arc between two longitudes, [0, 180].
    pub fn separation(lon1: f64, lon2: f64) -> f64 {
        let diff = (normalize_degrees(lon1) - normalize_degrees(lon2)).abs();
        if diff > 180.0 {
            360.0 - diff
        } else {
            diff
        }
    }

    /// Calculate the aspect between two longitudes, if any, with its orb.
    pub fn calculate_aspect(&self, lon1: f64, lon2: f64) -> Option<(AspectKind, f64)> {
        let angle_diff = Self::separation(lon1, lon2);
        AspectKind::PRIORITY.iter().find_map(|&kind| {
            let orb = (angle_diff - kind.angle()).abs();
            (orb <= kind.max_orb()).then_some((kind, orb))
        })
    }

    /// Aspects within one set (each unordered pair once, i < j), or across two sets
    /// (full cross product, `set_a` first in every match). Unsorted.
    pub fn find_aspects(&self, set_a: &[AspectPoint], set_b: Option<&[AspectPoint]>) -> Vec<AspectMatch> {
        let mut matches = Vec::new();
        match set_b {
            None => {
                for i in 0..set_a.len() {
                    for j in (i + 1)..set_a.len() {
                        self.push_match(&mut matches, &set_a[i], &set_a[j]);
                    }
                }
            }
            Some(set_b) => {
                for a in set_a {
                    for b in set_b {
                        self.push_match(&mut matches, a, b);
                    }
                }
            }
        }
        matches
    }

    fn push_match(&self, out: &mut Vec<AspectMatch>, a: &AspectPoint, b: &AspectPoint) {
        if let Some((kind, orb)) = self.calculate_aspect(a.longitude, b.longitude) {
            out.push(AspectMatch {
                first: a.name.clone(),
                second: b.name.clone(),
                kind,
                orb,
                first_longitude: normalize_degrees(a.longitude),
                second_longitude: normalize_degrees(b.longitude),
            });
        }
    }
}

/// Shorthand for `AspectCalculator::new().find_aspects(..)`.
pub fn find_aspects(set_a: &[AspectPoint], set_b: Option<&[AspectPoint]>) -> Vec<AspectMatch> {
    AspectCalculator::new().find_aspects(set_a, set_b)
}

/// Stable sort, tightest orb first. Ties keep iteration order.
pub fn sort_by_orb(aspects: &mut [AspectMatch]) {
    aspects.sort_by(|a, b| a.orb.total_cmp(&b.orb));
}

/// The `n` tightest aspects, in sorted order.
pub fn strongest(aspects: &[AspectMatch], n: usize) -> Vec<AspectMatch> {
    let mut sorted = aspects.to_vec();
    sort_by_orb(&mut sorted);
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separation_takes_shorter_arc() {
        assert_eq!(AspectCalculator::separation(350.0, 10.0), 20.0);
        assert_eq!(AspectCalculator::separation(0.0, 180.0), 180.0);
        assert_eq!(AspectCalculator::separation(-10.0, 10.0), 20.0);
    }

    #[test]
    fn test_orb_limits_inclusive() {
        let calc = AspectCalculator::new();
        assert_eq!(calc.calculate_aspect(0.0, 66.0).map(|a| a.0), Some(AspectKind::Sextile));
        assert_eq!(calc.calculate_aspect(0.0, 66.5), None);
        assert_eq!(calc.calculate_aspect(0.0, 8.0).map(|a| a.0), Some(AspectKind::Conjunction));
        assert_eq!(calc.calculate_aspect(0.0, 30.0), None);
    }

    #[test]
    fn test_kinds_checked_in_priority_order() {
        assert_eq!(
            AspectKind::PRIORITY,
            [
                AspectKind::Conjunction,
                AspectKind::Sextile,
                AspectKind::Square,
                AspectKind::Trine,
                AspectKind::Opposition,
            ]
        );
    }

    #[test]
    fn test_gaps_between_bands_match_nothing() {
        let calc = AspectCalculator::new();
        let (kind, orb) = calc.calculate_aspect(100.0, 163.0).unwrap();
        assert_eq!(kind, AspectKind::Sextile);
        assert!((orb - 3.0).abs() < 1e-9);
        assert_eq!(calc.calculate_aspect(100.0, 172.0), None);
        assert_eq!(calc.calculate_aspect(0.0, 150.0), None);
    }

    #[test]
    fn test_self_aspects_visit_each_pair_once() {
        let points = vec![
            AspectPoint::new("Sun", 0.0),
            AspectPoint::new("Moon", 0.0),
            AspectPoint::new("Mars", 0.0),
        ];
        let found = find_aspects(&points, None);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].first, "Sun");
        assert_eq!(found[0].second, "Moon");
    }

    #[test]
    fn test_strongest_is_stable() {
        let a = vec![AspectPoint::new("A", 0.0), AspectPoint::new("B", 90.0)];
        let b = vec![AspectPoint::new("X", 2.0), AspectPoint::new("Y", 92.0)];
        let found = find_aspects(&a, Some(&b));
        // A-X conj 2, A-Y square 2, B-X square 2, B-Y conj 2: all tied
        let top = strongest(&found, 3);
        let labels: Vec<_> = top.iter().map(|m| (m.first.as_str(), m.second.as_str())).collect();
        assert_eq!(labels, vec![("A", "X"), ("A", "Y"), ("B", "X")]);
    }
}
