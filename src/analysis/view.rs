use anyhow::{Context, Result};
use console::{style, Style};
use serde::{Deserialize, Serialize};

use crate::api::types::TranscriptAnalysis;
use crate::api::ApiClient;
use crate::cache;
use crate::config::ChartConfig;
use crate::paths;
use crate::report;

use super::buckets::{self, Ranges, Thresholds, Tier, BUCKET_LABELS};
use super::chart::{self, ChartSeries};
use super::energy::ScoreBoard;
use super::score;

/// Which per-recording analysis a command is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Pitch,
    Volume,
}

impl AnalysisKind {
    /// Cache key component, also used in chart file names.
    pub fn key(self) -> &'static str {
        match self {
            AnalysisKind::Pitch => "pitch",
            AnalysisKind::Volume => "volume",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            AnalysisKind::Pitch => "Hz",
            AnalysisKind::Volume => "dB",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AnalysisKind::Pitch => "Pitch",
            AnalysisKind::Volume => "Volume",
        }
    }

    pub fn thresholds(self) -> Thresholds {
        match self {
            AnalysisKind::Pitch => buckets::PITCH_HZ,
            AnalysisKind::Volume => buckets::VOLUME_DB,
        }
    }
}

/// Derived per-recording, per-kind analysis: the raw series plus
/// everything the display needs. This is the shape that lives in the
/// cache: fetched once, derived once, then reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub raw_series: Vec<f32>,
    /// Backend-supplied percentile score on the 0–100 scale.
    pub score: f32,
    pub duration_seconds: f32,
    pub ranges: Ranges,
}

impl AnalysisPayload {
    pub fn chart_series(&self) -> ChartSeries {
        chart::reduce_for_chart(&self.raw_series)
    }
}

/// Load the derived payload for a kind, preferring the cache. A miss (or
/// `refresh`) fetches the unified analysis, derives the payload, and
/// writes it back.
pub fn load_payload(
    client: &ApiClient,
    kind: AnalysisKind,
    file_id: &str,
    refresh: bool,
) -> Result<AnalysisPayload> {
    if !refresh {
        if let Some(payload) = cache::load::<AnalysisPayload>(kind.key(), file_id)? {
            log::debug!("cache hit: {} analysis for {file_id}", kind.key());
            return Ok(payload);
        }
    }

    let wire = client.fetch_analysis(file_id)?;
    let payload = build_payload(kind, &wire)
        .with_context(|| format!("No usable {} analysis for {file_id}", kind.key()))?;
    cache::store(kind.key(), file_id, &payload)?;
    Ok(payload)
}

fn build_payload(
    kind: AnalysisKind,
    wire: &crate::api::types::WireAnalysis,
) -> Result<AnalysisPayload> {
    let (series, score) = match kind {
        AnalysisKind::Pitch => wire.pitch(),
        AnalysisKind::Volume => wire
            .volume()
            .context("payload carries no volume analysis")?,
    };

    let ranges =
        buckets::bucketize(series, kind.thresholds()).context("analysis contains no samples")?;

    Ok(AnalysisPayload {
        raw_series: series.to_vec(),
        score,
        duration_seconds: chart::duration_seconds(series.len()),
        ranges,
    })
}

/// Load the transcript-side analysis, cache-first like the signal kinds.
pub fn load_transcript(
    client: &ApiClient,
    file_id: &str,
    refresh: bool,
) -> Result<TranscriptAnalysis> {
    if !refresh {
        if let Some(cached) = cache::load::<TranscriptAnalysis>("transcript", file_id)? {
            log::debug!("cache hit: transcript for {file_id}");
            return Ok(cached);
        }
    }

    let transcript = client.fetch_analysis(file_id)?.into_transcript();
    cache::store("transcript", file_id, &transcript)?;
    Ok(transcript)
}

/// Show one signal analysis (pitch or volume) for a recording.
pub fn run_signal(
    client: &ApiClient,
    kind: AnalysisKind,
    file_id: &str,
    refresh: bool,
    render_chart: bool,
    chart_cfg: &ChartConfig,
) -> Result<()> {
    let payload = load_payload(client, kind, file_id, refresh)?;
    print_signal_view(kind, &payload);

    if render_chart {
        let out = paths::chart_path(file_id, kind.key());
        report::charts::render_signal_chart(kind, &payload, &out, chart_cfg)?;
        println!();
        println!("  Chart written to {}", style(out.display()).green());
    }

    Ok(())
}

/// Show the composite energy view: both scores plus their mean.
pub fn run_energy(client: &ApiClient, file_id: &str, refresh: bool) -> Result<()> {
    let board = ScoreBoard::new();
    board.subscribe(|energy| log::debug!("energy score updated: {energy:.1}"));

    let pitch = load_payload(client, AnalysisKind::Pitch, file_id, refresh)?;
    board.set_pitch_score(pitch.score);

    let volume = load_payload(client, AnalysisKind::Volume, file_id, refresh)?;
    board.set_volume_score(volume.score);

    let energy = board
        .energy_score()
        .context("both scores are required for the energy view")?;

    println!();
    println!("{}", style(format!("Energy — {file_id}")).bold());
    println!();
    print_score_bar("Pitch score", pitch.score);
    print_score_bar("Volume score", volume.score);
    print_score_bar("Energy score", energy);

    Ok(())
}

/// Show the transcript and its NLP annotations.
pub fn run_transcript(client: &ApiClient, file_id: &str, refresh: bool) -> Result<()> {
    let analysis = load_transcript(client, file_id, refresh)?;

    println!();
    println!("{}", style(format!("Transcript — {file_id}")).bold());
    println!();

    if analysis.transcript.is_empty() {
        println!("  {}", style("(no transcript)").dim());
    } else {
        for line in analysis.transcript.lines() {
            println!("  {line}");
        }
    }
    println!();

    if let Some(rate) = analysis.speech_rate {
        println!("  Speech rate:  {rate:.2} words/s");
    }
    if let Some(speed) = analysis.speed_score {
        print_score_bar("Speed score", speed);
    }

    if let Some(ratio) = analysis.hate_speech_ratio {
        let pct = ratio * 100.0;
        println!("  Hate speech:  {pct:.1}% of sentences");
    }
    for line in &analysis.hate_speech {
        let tag = line.label.as_deref().unwrap_or("flagged");
        match line.score {
            Some(s) => println!(
                "    {} {} ({s:.2})",
                style(tag).red(),
                line.sentence
            ),
            None => println!("    {} {}", style(tag).red(), line.sentence),
        }
    }

    if !analysis.silence_durations.is_empty() {
        let total: f32 = analysis.silence_durations.iter().sum();
        println!(
            "  Silence:      {} gaps, {total:.1}s total",
            analysis.silence_durations.len()
        );
    }

    if !analysis.keywords.is_empty() {
        println!("  Keywords:     {}", analysis.keywords.join(", "));
    }

    print_word_counts("Pattern words", &analysis.regex_word_counts);
    print_word_counts("Common words", &analysis.normal_word_counts);

    Ok(())
}

fn print_signal_view(kind: AnalysisKind, payload: &AnalysisPayload) {
    let unit = kind.unit();
    let ranges = &payload.ranges;
    let thresholds = kind.thresholds();

    println!();
    println!("{}", style(format!("{} analysis", kind.title())).bold());
    println!();
    println!(
        "  Duration: {:.1}s ({} samples)",
        payload.duration_seconds,
        ranges.total()
    );
    println!();

    // Distribution strip: one colored block per bucket, width proportional
    // to its share of the samples.
    println!("  {}", distribution_strip(ranges));
    println!();

    let counts = ranges.counts();
    for (i, label) in BUCKET_LABELS.iter().enumerate() {
        let count = counts[i];
        if count == 0 {
            continue;
        }
        let share = 100.0 * count as f32 / ranges.total() as f32;
        let bounds = bucket_bounds(thresholds, i, unit);
        println!(
            "  {:>14}  {:>5.1}%  {}",
            tier_style(Tier::ALL[i]).apply_to(*label),
            share,
            style(bounds).dim()
        );
    }
    println!();

    println!(
        "  min {}  ·  avg {}  ·  max {}",
        tinted_value(ranges.min, thresholds, unit),
        tinted_value(ranges.avg, thresholds, unit),
        tinted_value(ranges.max, thresholds, unit),
    );
    println!();
    print_score_bar(&format!("{} score", kind.title()), payload.score);
}

/// Human-readable bounds for bucket i, e.g. "< 85 Hz" or "125–180 Hz".
fn bucket_bounds(thresholds: Thresholds, i: usize, unit: &str) -> String {
    let [t1, t2, t3, t4] = thresholds.0;
    match i {
        0 => format!("< {t1} {unit}"),
        1 => format!("{t1}–{t2} {unit}"),
        2 => format!("{t2}–{t3} {unit}"),
        3 => format!("{t3}–{t4} {unit}"),
        _ => format!(">= {t4} {unit}"),
    }
}

fn tinted_value(value: f32, thresholds: Thresholds, unit: &str) -> String {
    tier_style(thresholds.tier_for(value))
        .apply_to(format!("{value:.1} {unit}"))
        .to_string()
}

/// Fixed-width strip showing the bucket distribution, colored per tier.
fn distribution_strip(ranges: &Ranges) -> String {
    const WIDTH: usize = 50;
    let total = ranges.total().max(1);

    let mut strip = String::new();
    for (i, count) in ranges.counts().iter().enumerate() {
        let cells = (count * WIDTH).div_ceil(total).min(WIDTH);
        if *count == 0 {
            continue;
        }
        strip.push_str(
            &tier_style(Tier::ALL[i])
                .apply_to("█".repeat(cells))
                .to_string(),
        );
    }
    strip
}

fn print_score_bar(label: &str, raw: f32) {
    const WIDTH: usize = 20;
    let clamped = raw.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * WIDTH as f32).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(WIDTH - filled));

    println!(
        "  {:<13} {} {}",
        format!("{label}:"),
        tier_style(score::score_tier(clamped)).apply_to(bar),
        score::display_score(raw)
    );
}

fn print_word_counts(label: &str, counts: &std::collections::BTreeMap<String, u64>) {
    if counts.is_empty() {
        return;
    }
    let mut sorted: Vec<(&String, &u64)> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let listing = sorted
        .iter()
        .take(8)
        .map(|(word, n)| format!("{word} ({n})"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("  {label}: {listing}");
}

fn tier_style(tier: Tier) -> Style {
    match tier {
        Tier::Red => Style::new().red(),
        Tier::Orange => Style::new().color256(208),
        Tier::Yellow => Style::new().yellow(),
        Tier::LightGreen => Style::new().color256(120),
        Tier::Green => Style::new().green(),
    }
}
