use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;

use crate::audio::wav;
use crate::error::ClientError;

use super::session::{Capture, CaptureBackend};

/// The real microphone backend.
///
/// Architecture (one live capture):
///   cpal audio callback (audio thread)
///     → publishes chunk RMS into an AtomicU32 (f32 bits) for the meter
///     → sends f32 sample chunks via mpsc channel
///       → writer thread drains the channel into a 16-bit WAV via hound
///   AtomicBool stop flag ← finish()
pub struct MicBackend;

impl CaptureBackend for MicBackend {
    fn open(&self, artifact_path: &Path) -> Result<Box<dyn Capture>, ClientError> {
        let capture = MicCapture::open(artifact_path)?;
        Ok(Box::new(capture))
    }
}

pub struct MicCapture {
    /// Kept alive for the duration of the capture; dropping it stops the
    /// callback and closes the writer's channel.
    stream: Option<cpal::Stream>,
    stop: Arc<AtomicBool>,
    live_rms: Arc<AtomicU32>,
    writer: Option<JoinHandle<Result<()>>>,
    path: PathBuf,
}

impl MicCapture {
    fn open(artifact_path: &Path) -> Result<Self, ClientError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| ClientError::PermissionDenied("no input device found".into()))?;

        let config = device
            .default_input_config()
            .map_err(|e| ClientError::PermissionDenied(format!("no usable input config: {e}")))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        let format = config.sample_format();

        let (tx, rx) = mpsc::channel::<Vec<f32>>();
        let stop = Arc::new(AtomicBool::new(false));
        let live_rms = Arc::new(AtomicU32::new(0_f32.to_bits()));

        let stop_stream = Arc::clone(&stop);
        let rms_stream = Arc::clone(&live_rms);

        let stream = match format {
            SampleFormat::F32 => device
                .build_input_stream(
                    &config.into(),
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if stop_stream.load(Ordering::Relaxed) {
                            return;
                        }
                        // Downmix to mono if multi-channel
                        let mono: Vec<f32> = if channels > 1 {
                            data.iter().step_by(channels).copied().collect()
                        } else {
                            data.to_vec()
                        };
                        rms_stream.store(compute_rms(&mono).to_bits(), Ordering::Relaxed);
                        let _ = tx.send(mono);
                    },
                    |err| log::error!("input stream error: {err}"),
                    None,
                )
                .map_err(|e| ClientError::PermissionDenied(format!("input stream refused: {e}")))?,
            SampleFormat::I16 => device
                .build_input_stream(
                    &config.into(),
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if stop_stream.load(Ordering::Relaxed) {
                            return;
                        }
                        let mono: Vec<f32> = if channels > 1 {
                            data.iter()
                                .step_by(channels)
                                .map(|&s| s as f32 / i16::MAX as f32)
                                .collect()
                        } else {
                            data.iter()
                                .map(|&s| s as f32 / i16::MAX as f32)
                                .collect()
                        };
                        rms_stream.store(compute_rms(&mono).to_bits(), Ordering::Relaxed);
                        let _ = tx.send(mono);
                    },
                    |err| log::error!("input stream error: {err}"),
                    None,
                )
                .map_err(|e| ClientError::PermissionDenied(format!("input stream refused: {e}")))?,
            other => {
                return Err(ClientError::PermissionDenied(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        };

        stream
            .play()
            .map_err(|e| ClientError::PermissionDenied(format!("failed to start capture: {e}")))?;

        // Writer thread: drains sample chunks into the artifact.
        let wav_path = artifact_path.to_path_buf();
        let writer = std::thread::spawn(move || -> Result<()> {
            let spec = wav::artifact_spec(sample_rate);
            let mut writer = wav::create_writer(&wav_path, spec)?;

            // rx.iter() ends when the stream (and its tx) is dropped
            for chunk in rx.iter() {
                for &sample in &chunk {
                    writer.write_sample(wav::to_i16(sample))?;
                }
            }

            writer.finalize().context("Failed to finalize WAV artifact")?;
            Ok(())
        });

        Ok(Self {
            stream: Some(stream),
            stop,
            live_rms,
            writer: Some(writer),
            path: artifact_path.to_path_buf(),
        })
    }
}

impl Capture for MicCapture {
    fn pause(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.as_ref() {
            stream.pause().context("Failed to pause capture stream")?;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.as_ref() {
            stream.play().context("Failed to resume capture stream")?;
        }
        Ok(())
    }

    fn meter_dbfs(&self) -> f32 {
        let rms = f32::from_bits(self.live_rms.load(Ordering::Relaxed));
        crate::util::level_dbfs(rms)
    }

    fn finish(mut self: Box<Self>) -> Result<PathBuf> {
        // Stop the callback from sending, then drop the stream. Dropping
        // closes the channel, which ends the writer thread's drain loop.
        self.stop.store(true, Ordering::Relaxed);
        drop(self.stream.take());

        if let Some(writer) = self.writer.take() {
            writer
                .join()
                .map_err(|_| anyhow::anyhow!("WAV writer thread panicked"))??;
        }

        Ok(self.path.clone())
    }
}

/// RMS of a sample buffer (linear, not dB).
pub fn compute_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}
