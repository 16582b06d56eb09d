use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::analysis::buckets::Tier;
use crate::analysis::chart::PAYLOAD_RATE_HZ;
use crate::analysis::view::{AnalysisKind, AnalysisPayload};
use crate::config::ChartConfig;

const COLOR_LINE: RGBColor = RGBColor(40, 40, 40);
const COLOR_THRESHOLD: RGBColor = RGBColor(200, 200, 200);

/// Render one signal analysis (pitch or volume) as a PNG line chart:
/// every sample plotted, bucket thresholds as dashed lines, min/avg/max
/// annotated in their tier colors.
pub fn render_signal_chart(
    kind: AnalysisKind,
    payload: &AnalysisPayload,
    output_path: &Path,
    cfg: &ChartConfig,
) -> Result<()> {
    let series = payload.chart_series();
    anyhow::ensure!(!series.values.is_empty(), "nothing to plot");

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // The values keep full fidelity, so the bitmap grows with the series.
    let width = chart_width_px(payload.duration_seconds, cfg);

    let root = BitMapBackend::new(output_path, (width, cfg.height_px)).into_drawing_area();
    root.fill(&WHITE).context("Failed to fill background")?;

    let y_max = (payload.ranges.max * 1.1).max(1.0);
    let caption = format!(
        "{} over time — score {:.1}%",
        kind.title(),
        payload.score.clamp(0.0, 100.0)
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0..series.values.len(), 0f32..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(series.labels.len().clamp(2, 12))
        .x_label_formatter(&|x| format!("{:.1}s", *x as f32 / PAYLOAD_RATE_HZ as f32))
        .y_label_formatter(&|y: &f32| format!("{y:.0} {}", kind.unit()))
        .draw()?;

    // Bucket boundaries
    for &threshold in kind.thresholds().0.iter() {
        if threshold < y_max {
            chart.draw_series(DashedLineSeries::new(
                vec![(0usize, threshold), (series.values.len(), threshold)],
                5,
                3,
                COLOR_THRESHOLD.into(),
            ))?;
        }
    }

    chart.draw_series(LineSeries::new(
        series.values.iter().copied().enumerate(),
        &COLOR_LINE,
    ))?;

    // min/avg/max annotation, tinted like the terminal view
    let thresholds = kind.thresholds();
    let stats = [
        ("min", payload.ranges.min),
        ("avg", payload.ranges.avg),
        ("max", payload.ranges.max),
    ];
    for (i, (label, value)) in stats.iter().enumerate() {
        let color = tier_color(thresholds.tier_for(*value));
        root.draw(&Text::new(
            format!("{label} {value:.1} {}", kind.unit()),
            (70 + (i as i32) * 140, 34),
            ("sans-serif", 16).into_font().color(&color),
        ))?;
    }

    root.present().context("Failed to write chart PNG")?;
    Ok(())
}

/// Bitmap width for a series: px-per-second scaling, clamped.
fn chart_width_px(duration_seconds: f32, cfg: &ChartConfig) -> u32 {
    let scaled = (duration_seconds * cfg.px_per_second as f32) as u32;
    scaled.clamp(cfg.min_width_px, cfg.max_width_px)
}

fn tier_color(tier: Tier) -> RGBColor {
    match tier {
        Tier::Red => RGBColor(231, 76, 60),
        Tier::Orange => RGBColor(230, 126, 34),
        Tier::Yellow => RGBColor(212, 172, 13),
        Tier::LightGreen => RGBColor(125, 206, 130),
        Tier::Green => RGBColor(39, 174, 96),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_duration() {
        let cfg = ChartConfig::default();
        // Short series pin to the minimum width
        assert_eq!(chart_width_px(1.0, &cfg), cfg.min_width_px);
        // Long series cap at the maximum
        assert_eq!(chart_width_px(10_000.0, &cfg), cfg.max_width_px);
        // In between scales linearly
        let mid = chart_width_px(50.0, &cfg);
        assert_eq!(mid, 50 * cfg.px_per_second);
    }
}
