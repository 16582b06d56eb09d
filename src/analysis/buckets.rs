use serde::{Deserialize, Serialize};

/// Display names for the five buckets, lowest to highest.
pub const BUCKET_LABELS: [&str; 5] = ["low", "slightly low", "medium", "slightly high", "high"];

/// Presentation tier for a value, lowest bucket to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Red,
    Orange,
    Yellow,
    LightGreen,
    Green,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Red,
        Tier::Orange,
        Tier::Yellow,
        Tier::LightGreen,
        Tier::Green,
    ];
}

/// Four ordered boundaries carving a value axis into five buckets.
///
/// A boundary is an exclusive upper bound on the bucket below it: a value
/// exactly equal to a boundary belongs to the bucket above. The same
/// comparison drives bucket counting and tier coloring, so the two can
/// never disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds(pub [f32; 4]);

/// Pitch buckets in Hz.
pub const PITCH_HZ: Thresholds = Thresholds([85.0, 125.0, 180.0, 255.0]);

/// Volume buckets in dB.
pub const VOLUME_DB: Thresholds = Thresholds([40.0, 60.0, 75.0, 85.0]);

impl Thresholds {
    /// Which of the five buckets (0..=4) a value falls into.
    pub fn bucket_index(&self, value: f32) -> usize {
        let [t1, t2, t3, t4] = self.0;
        if value < t1 {
            0
        } else if value < t2 {
            1
        } else if value < t3 {
            2
        } else if value < t4 {
            3
        } else {
            4
        }
    }

    pub fn tier_for(&self, value: f32) -> Tier {
        Tier::ALL[self.bucket_index(value)]
    }
}

/// Bucket counts plus running statistics for one sample series.
///
/// Invariant: the five counts sum to the length of the series that
/// produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranges {
    pub low: usize,
    pub slightly_low: usize,
    pub medium: usize,
    pub slightly_high: usize,
    pub high: usize,
    pub min: f32,
    pub max: f32,
    pub avg: f32,
}

impl Ranges {
    pub fn total(&self) -> usize {
        self.low + self.slightly_low + self.medium + self.slightly_high + self.high
    }

    /// Counts in bucket order, for rendering the distribution strip.
    pub fn counts(&self) -> [usize; 5] {
        [
            self.low,
            self.slightly_low,
            self.medium,
            self.slightly_high,
            self.high,
        ]
    }
}

/// Partition a series into the five buckets in a single pass, accumulating
/// min, max, and average along the way.
///
/// Returns None for an empty series: there is no meaningful min/avg/max,
/// and callers render "no samples" instead of formatting a NaN.
pub fn bucketize(series: &[f32], thresholds: Thresholds) -> Option<Ranges> {
    let first = *series.first()?;

    let mut counts = [0usize; 5];
    let mut min = first;
    let mut max = first;
    let mut sum = 0.0f64;

    for &sample in series {
        counts[thresholds.bucket_index(sample)] += 1;
        min = min.min(sample);
        max = max.max(sample);
        sum += sample as f64;
    }

    Some(Ranges {
        low: counts[0],
        slightly_low: counts[1],
        medium: counts[2],
        slightly_high: counts[3],
        high: counts[4],
        min,
        max,
        avg: (sum / series.len() as f64) as f32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_has_no_ranges() {
        assert!(bucketize(&[], PITCH_HZ).is_none());
    }

    #[test]
    fn one_sample_per_bucket() {
        let series = [10.0, 90.0, 150.0, 200.0, 300.0];
        let ranges = bucketize(&series, PITCH_HZ).unwrap();
        assert_eq!(ranges.counts(), [1, 1, 1, 1, 1]);
        assert_eq!(ranges.min, 10.0);
        assert_eq!(ranges.max, 300.0);
        assert!((ranges.avg - 150.0).abs() < 1e-4);
    }

    #[test]
    fn counts_sum_to_series_length() {
        let series: Vec<f32> = (0..997).map(|i| (i as f32 * 0.37) % 320.0).collect();
        let ranges = bucketize(&series, PITCH_HZ).unwrap();
        assert_eq!(ranges.total(), series.len());

        let ranges = bucketize(&series, VOLUME_DB).unwrap();
        assert_eq!(ranges.total(), series.len());
    }

    #[test]
    fn boundary_value_lands_in_upper_bucket() {
        // 85 Hz is the exclusive upper bound of "low": it belongs to
        // "slightly low", not "low".
        let ranges = bucketize(&[85.0], PITCH_HZ).unwrap();
        assert_eq!(ranges.low, 0);
        assert_eq!(ranges.slightly_low, 1);

        assert_eq!(PITCH_HZ.bucket_index(85.0), 1);
        assert_eq!(PITCH_HZ.bucket_index(84.999), 0);
        assert_eq!(PITCH_HZ.bucket_index(255.0), 4);
    }

    #[test]
    fn tier_matches_bucket() {
        for value in [10.0, 85.0, 125.0, 180.0, 255.0, 400.0] {
            let tier = PITCH_HZ.tier_for(value);
            assert_eq!(tier, Tier::ALL[PITCH_HZ.bucket_index(value)]);
        }
    }

    #[test]
    fn volume_thresholds() {
        let series = [35.0, 50.0, 70.0, 80.0, 90.0];
        let ranges = bucketize(&series, VOLUME_DB).unwrap();
        assert_eq!(ranges.counts(), [1, 1, 1, 1, 1]);
    }

    #[test]
    fn single_sample_stats() {
        let ranges = bucketize(&[140.0], PITCH_HZ).unwrap();
        assert_eq!(ranges.min, 140.0);
        assert_eq!(ranges.max, 140.0);
        assert_eq!(ranges.avg, 140.0);
        assert_eq!(ranges.medium, 1);
    }

    #[test]
    fn ranges_roundtrip_json() {
        let ranges = bucketize(&[10.0, 90.0, 150.0], PITCH_HZ).unwrap();
        let json = serde_json::to_string(&ranges).unwrap();
        let loaded: Ranges = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, ranges);
    }
}
