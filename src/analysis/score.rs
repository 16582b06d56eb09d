use super::buckets::{Thresholds, Tier};

/// Tier boundaries for percentile scores on the 0–100 display scale.
pub const SCORE_TIERS: Thresholds = Thresholds([20.0, 40.0, 60.0, 80.0]);

/// Format a backend-supplied score for display: clamped to [0, 100],
/// one decimal, percent suffix. The score is ground truth from the
/// server and is never recomputed locally.
pub fn display_score(raw: f32) -> String {
    format!("{:.1}%", raw.clamp(0.0, 100.0))
}

/// Tier color for a score, using the same strict-bound rule as bucketing.
pub fn score_tier(score: f32) -> Tier {
    SCORE_TIERS.tier_for(score.clamp(0.0, 100.0))
}

/// Composite quality indicator: the mean of the pitch and volume
/// percentile scores.
pub fn energy_score(pitch_score: f32, volume_score: f32) -> f32 {
    (pitch_score + volume_score) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_one_decimal_with_suffix() {
        assert_eq!(display_score(82.46), "82.5%");
        assert_eq!(display_score(0.0), "0.0%");
    }

    #[test]
    fn display_clamps_out_of_range() {
        assert_eq!(display_score(123.4), "100.0%");
        assert_eq!(display_score(-5.0), "0.0%");
    }

    #[test]
    fn energy_is_mean_of_parts() {
        assert_eq!(energy_score(80.0, 60.0), 70.0);
        assert_eq!(energy_score(0.0, 0.0), 0.0);
    }

    #[test]
    fn score_tiers_follow_strict_bounds() {
        assert_eq!(score_tier(10.0), Tier::Red);
        // Exactly at a boundary → the tier above.
        assert_eq!(score_tier(20.0), Tier::Orange);
        assert_eq!(score_tier(59.9), Tier::Yellow);
        assert_eq!(score_tier(79.9), Tier::LightGreen);
        assert_eq!(score_tier(80.0), Tier::Green);
        assert_eq!(score_tier(100.0), Tier::Green);
    }
}
