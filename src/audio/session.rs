use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::ClientError;

/// Width of the live waveform window.
pub const WAVEFORM_SLOTS: usize = 50;

/// Meter floor: -160 dBFS maps to 0.0, full scale to 1.0.
const METER_RANGE_DB: f32 = 160.0;

/// Normalize an instantaneous dBFS reading into [0, 1] for the waveform.
pub fn normalize_dbfs(dbfs: f32) -> f32 {
    ((dbfs + METER_RANGE_DB) / METER_RANGE_DB).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Recording,
    Paused,
    Stopped,
}

/// A live capture handle: the session controller's view of the microphone.
///
/// The real implementation is the cpal/hound pipeline in `capture.rs`;
/// tests drive the controller with a scripted fake.
pub trait Capture {
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
    /// Instantaneous input level in dBFS (≤ 0; -inf when silent).
    fn meter_dbfs(&self) -> f32;
    /// Stop the stream, finalize the artifact, and hand back its path.
    fn finish(self: Box<Self>) -> Result<PathBuf>;
}

/// Opens the microphone. Failing to get a device or a stream maps to
/// `PermissionDenied`; from the user's side both look the same.
pub trait CaptureBackend {
    fn open(&self, artifact_path: &Path) -> Result<Box<dyn Capture>, ClientError>;
}

/// One in-progress capture session.
///
/// State machine: Idle → Recording ⇄ Paused → Stopped, with at most one
/// active session. Starting while one is live implicitly stops it first.
/// The two tick methods are driven externally (1 s and 100 ms cadences)
/// and only have an effect while Recording; the driver stops scheduling
/// them on any transition out of Recording, and `stop` tears the capture
/// down only after that, so no tick can observe a dead handle.
pub struct RecordingSession {
    status: SessionStatus,
    elapsed_seconds: u64,
    waveform: VecDeque<f32>,
    artifact_path: Option<PathBuf>,
    capture: Option<Box<dyn Capture>>,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            elapsed_seconds: 0,
            waveform: VecDeque::new(),
            artifact_path: None,
            capture: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact_path.as_deref()
    }

    /// Snapshot of the waveform window, oldest first.
    pub fn waveform(&self) -> Vec<f32> {
        self.waveform.iter().copied().collect()
    }

    /// Begin a new capture. An active session is stopped first; its
    /// artifact is finalized and then superseded.
    pub fn start(&mut self, backend: &dyn CaptureBackend, artifact_path: PathBuf) -> Result<()> {
        if matches!(self.status, SessionStatus::Recording | SessionStatus::Paused) {
            let superseded = self.stop()?;
            log::warn!(
                "session already active; stopped it first (artifact kept at {})",
                superseded.display()
            );
        }

        let capture = backend.open(&artifact_path)?;
        self.capture = Some(capture);
        self.status = SessionStatus::Recording;
        self.elapsed_seconds = 0;
        self.waveform = std::iter::repeat(0.0).take(WAVEFORM_SLOTS).collect();
        self.artifact_path = None;
        Ok(())
    }

    /// Suspend capture and both tickers. Valid only while Recording.
    pub fn pause(&mut self) -> Result<()> {
        if self.status != SessionStatus::Recording {
            anyhow::bail!("can only pause while recording");
        }
        if let Some(capture) = self.capture.as_mut() {
            capture.pause()?;
        }
        self.status = SessionStatus::Paused;
        Ok(())
    }

    /// Resume capture and both tickers. Valid only while Paused.
    pub fn resume(&mut self) -> Result<()> {
        if self.status != SessionStatus::Paused {
            anyhow::bail!("can only resume while paused");
        }
        if let Some(capture) = self.capture.as_mut() {
            capture.resume()?;
        }
        self.status = SessionStatus::Recording;
        Ok(())
    }

    /// Finalize the artifact. Valid while Recording or Paused.
    pub fn stop(&mut self) -> Result<PathBuf> {
        if !matches!(self.status, SessionStatus::Recording | SessionStatus::Paused) {
            anyhow::bail!("no active recording to stop");
        }

        // Leaving the Recording state first guarantees the tickers are
        // done before the capture handle is torn down.
        self.status = SessionStatus::Stopped;
        self.elapsed_seconds = 0;
        self.waveform.clear();

        let capture = self
            .capture
            .take()
            .ok_or_else(|| anyhow::anyhow!("capture handle missing"))?;
        let path = capture.finish()?;
        self.artifact_path = Some(path.clone());
        Ok(path)
    }

    /// 1-second tick: advances the elapsed clock. No-op unless Recording.
    pub fn sample_tick(&mut self) {
        if self.status == SessionStatus::Recording {
            self.elapsed_seconds += 1;
        }
    }

    /// 100 ms tick: samples the meter into the waveform window. No-op
    /// unless Recording.
    pub fn volume_tick(&mut self) {
        if self.status != SessionStatus::Recording {
            return;
        }
        let Some(capture) = self.capture.as_ref() else {
            return;
        };

        let level = normalize_dbfs(capture.meter_dbfs());
        if self.waveform.len() >= WAVEFORM_SLOTS {
            self.waveform.pop_front();
        }
        self.waveform.push_back(level);
    }

    /// Back to Idle after the artifact has been saved or discarded.
    pub fn reset(&mut self) {
        self.status = SessionStatus::Idle;
        self.elapsed_seconds = 0;
        self.waveform.clear();
        self.artifact_path = None;
        self.capture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted capture: fixed meter level, counts pause/resume calls.
    struct FakeCapture {
        path: PathBuf,
        meter: f32,
        pauses: Arc<AtomicUsize>,
        resumes: Arc<AtomicUsize>,
    }

    impl Capture for FakeCapture {
        fn pause(&mut self) -> Result<()> {
            self.pauses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn resume(&mut self) -> Result<()> {
            self.resumes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn meter_dbfs(&self) -> f32 {
            self.meter
        }

        fn finish(self: Box<Self>) -> Result<PathBuf> {
            Ok(self.path)
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        meter: f32,
        opens: AtomicUsize,
        pauses: Arc<AtomicUsize>,
        resumes: Arc<AtomicUsize>,
        deny: bool,
    }

    impl CaptureBackend for FakeBackend {
        fn open(&self, artifact_path: &Path) -> Result<Box<dyn Capture>, ClientError> {
            if self.deny {
                return Err(ClientError::PermissionDenied("no input device".into()));
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeCapture {
                path: artifact_path.to_path_buf(),
                meter: self.meter,
                pauses: Arc::clone(&self.pauses),
                resumes: Arc::clone(&self.resumes),
            }))
        }
    }

    fn backend_with_meter(meter: f32) -> FakeBackend {
        FakeBackend {
            meter,
            ..FakeBackend::default()
        }
    }

    #[test]
    fn full_lifecycle_leaves_one_artifact_and_reset_clock() {
        let backend = backend_with_meter(-20.0);
        let mut session = RecordingSession::new();

        session
            .start(&backend, PathBuf::from("/tmp/a.wav"))
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Recording);
        assert_eq!(session.waveform().len(), WAVEFORM_SLOTS);

        session.sample_tick();
        session.sample_tick();
        assert_eq!(session.elapsed_seconds(), 2);

        session.pause().unwrap();
        session.resume().unwrap();
        let path = session.stop().unwrap();

        assert_eq!(path, PathBuf::from("/tmp/a.wav"));
        assert_eq!(session.artifact_path(), Some(Path::new("/tmp/a.wav")));
        assert_eq!(session.status(), SessionStatus::Stopped);
        assert_eq!(session.elapsed_seconds(), 0);
        assert!(session.waveform().is_empty());
        assert_eq!(backend.pauses.load(Ordering::SeqCst), 1);
        assert_eq!(backend.resumes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ticks_are_noops_while_paused() {
        let backend = backend_with_meter(-20.0);
        let mut session = RecordingSession::new();
        session
            .start(&backend, PathBuf::from("/tmp/a.wav"))
            .unwrap();
        session.sample_tick();
        session.pause().unwrap();

        for _ in 0..5 {
            session.sample_tick();
            session.volume_tick();
        }
        assert_eq!(session.elapsed_seconds(), 1);
        // Waveform unchanged: still the 50 zeros from start
        assert!(session.waveform().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn volume_tick_slides_fixed_window() {
        let backend = backend_with_meter(-40.0);
        let mut session = RecordingSession::new();
        session
            .start(&backend, PathBuf::from("/tmp/a.wav"))
            .unwrap();

        for _ in 0..120 {
            session.volume_tick();
        }

        let waveform = session.waveform();
        assert_eq!(waveform.len(), WAVEFORM_SLOTS);
        // -40 dBFS → (−40+160)/160 = 0.75; the window has fully slid over
        let expected = normalize_dbfs(-40.0);
        assert!(waveform.iter().all(|&v| (v - expected).abs() < 1e-6));
    }

    #[test]
    fn normalize_dbfs_bounds() {
        assert_eq!(normalize_dbfs(0.0), 1.0);
        assert_eq!(normalize_dbfs(-160.0), 0.0);
        assert_eq!(normalize_dbfs(f32::NEG_INFINITY), 0.0);
        assert_eq!(normalize_dbfs(10.0), 1.0);
        assert!((normalize_dbfs(-80.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn start_while_active_stops_previous_session() {
        let backend = backend_with_meter(-20.0);
        let mut session = RecordingSession::new();

        session
            .start(&backend, PathBuf::from("/tmp/first.wav"))
            .unwrap();
        session
            .start(&backend, PathBuf::from("/tmp/second.wav"))
            .unwrap();

        assert_eq!(session.status(), SessionStatus::Recording);
        assert_eq!(backend.opens.load(Ordering::SeqCst), 2);
        // The new session owns the state; the old artifact is superseded.
        assert!(session.artifact_path().is_none());
    }

    #[test]
    fn denied_permission_surfaces_and_stays_idle() {
        let backend = FakeBackend {
            deny: true,
            ..FakeBackend::default()
        };
        let mut session = RecordingSession::new();

        let err = session
            .start(&backend, PathBuf::from("/tmp/a.wav"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::PermissionDenied(_))
        ));
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[test]
    fn pause_requires_recording() {
        let mut session = RecordingSession::new();
        assert!(session.pause().is_err());
        assert!(session.resume().is_err());
        assert!(session.stop().is_err());
    }

    #[test]
    fn stop_then_reset_returns_to_idle() {
        let backend = backend_with_meter(-20.0);
        let mut session = RecordingSession::new();
        session
            .start(&backend, PathBuf::from("/tmp/a.wav"))
            .unwrap();
        session.stop().unwrap();
        assert!(session.artifact_path().is_some());

        session.reset();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.artifact_path().is_none());
    }
}
