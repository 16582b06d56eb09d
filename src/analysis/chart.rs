/// Analysis payloads arrive sampled at a fixed 100 Hz.
pub const PAYLOAD_RATE_HZ: usize = 100;

/// One axis label per this many raw samples (one per second at 100 Hz).
pub const LABEL_STRIDE: usize = 100;

/// Plot-ready form of a raw series: full-fidelity values plus sparse
/// axis labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// Tick labels in seconds, one per LABEL_STRIDE samples.
    pub labels: Vec<String>,
    /// The input series, untouched. The chart keeps every sample and
    /// compensates by growing its width with the series length.
    pub values: Vec<f32>,
}

/// Reduce a raw series for plotting. Values pass through unchanged;
/// labels are thinned to one per second.
pub fn reduce_for_chart(series: &[f32]) -> ChartSeries {
    let labels = (0..series.len())
        .step_by(LABEL_STRIDE)
        .map(|i| format!("{:.1}", i as f32 / PAYLOAD_RATE_HZ as f32))
        .collect();

    ChartSeries {
        labels,
        values: series.to_vec(),
    }
}

/// Duration of a payload series in seconds at the fixed sample rate.
pub fn duration_seconds(series_len: usize) -> f32 {
    series_len as f32 / PAYLOAD_RATE_HZ as f32
}
