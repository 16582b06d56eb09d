use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

/// WAV spec for captured artifacts: mono 16-bit PCM, the format the
/// backend's upload endpoint expects.
pub fn artifact_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Create a WavWriter at the given path, creating parent directories as
/// needed.
pub fn create_writer(
    path: &Path,
    spec: WavSpec,
) -> Result<WavWriter<std::io::BufWriter<std::fs::File>>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))
}

/// Clamp and quantize an f32 sample for the 16-bit writer.
pub fn to_i16(sample: f32) -> i16 {
    (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn artifact_spec_values() {
        let spec = artifact_spec(48000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, SampleFormat::Int);
    }

    #[test]
    fn to_i16_clamps() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(2.0), i16::MAX);
        assert!(to_i16(-2.0) <= i16::MIN + 1);
    }

    #[test]
    fn writer_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("take.wav");
        let spec = artifact_spec(44100);

        let original: Vec<f32> = (0..500).map(|i| (i as f32 / 500.0) * 2.0 - 1.0).collect();
        {
            let mut writer = create_writer(&path, spec).unwrap();
            for &sample in &original {
                writer.write_sample(to_i16(sample)).unwrap();
            }
            writer.finalize().unwrap();
        }

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 44100);
        let loaded: Vec<f32> = reader
            .samples::<i16>()
            .map(|s| s.unwrap() as f32 / i16::MAX as f32)
            .collect();
        assert_eq!(loaded.len(), original.len());
        for (orig, back) in original.iter().zip(loaded.iter()) {
            assert!((orig - back).abs() < 0.001);
        }
    }
}
