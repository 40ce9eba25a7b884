/// Map a proficiency score onto a target tier using ordered thresholds.
///
/// Thresholds partition the score range into closed-open intervals with the
/// lower bound inclusive: with thresholds `[0.2, 0.4, 0.6, 0.8]`, a score in
/// `[0.0, 0.2)` maps to tier 1, `[0.2, 0.4)` to tier 2, and so on, with the
/// top interval closed at 1.0. A score exactly on a boundary always maps to
/// the tier above it.
pub fn target_tier(score: f64, thresholds: &[f64]) -> u8 {
    let mut tier: u8 = 1;
    for boundary in thresholds {
        if score >= *boundary {
            tier = tier.saturating_add(1);
        } else {
            break;
        }
    }
    tier
}

/// Order candidate tiers by distance from the target, nearest first,
/// with ties broken toward the lower tier to avoid over-challenging.
///
/// `tiers` is the set of tiers actually present in the catalog; the target
/// itself leads the order when present.
pub fn widening_order(target: u8, tiers: &[u8]) -> Vec<u8> {
    let mut order = tiers.to_vec();
    order.sort_by_key(|&t| ((t as i16 - target as i16).abs(), t));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

    #[test]
    fn test_extremes() {
        assert_eq!(target_tier(0.0, &THRESHOLDS), 1);
        assert_eq!(target_tier(1.0, &THRESHOLDS), 5);
    }

    #[test]
    fn test_neutral_score_maps_to_middle_tier() {
        assert_eq!(target_tier(0.5, &THRESHOLDS), 3);
    }

    #[test]
    fn test_boundaries_are_lower_inclusive() {
        assert_eq!(target_tier(0.2, &THRESHOLDS), 2);
        assert_eq!(target_tier(0.4, &THRESHOLDS), 3);
        assert_eq!(target_tier(0.6, &THRESHOLDS), 4);
        assert_eq!(target_tier(0.8, &THRESHOLDS), 5);
        assert_eq!(target_tier(0.199_999, &THRESHOLDS), 1);
    }

    #[test]
    fn test_no_thresholds_single_tier() {
        assert_eq!(target_tier(0.9, &[]), 1);
    }

    #[test]
    fn test_widening_prefers_nearest_then_lower() {
        assert_eq!(widening_order(3, &[1, 2, 3, 4, 5]), vec![3, 2, 4, 1, 5]);
    }

    #[test]
    fn test_widening_from_absent_target() {
        // Target 5 with only tiers 1 and 2 in the catalog: 2 is nearest.
        assert_eq!(widening_order(5, &[1, 2]), vec![2, 1]);
        // Target 1 with only higher tiers: closest above wins.
        assert_eq!(widening_order(1, &[3, 4]), vec![3, 4]);
    }

    #[test]
    fn test_widening_tie_goes_to_lower_tier() {
        // Tiers 2 and 4 are both distance 1 from target 3.
        assert_eq!(widening_order(3, &[2, 4]), vec![2, 4]);
    }
}
