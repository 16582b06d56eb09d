use std::sync::Mutex;

use super::score;

type EnergyListener = Box<dyn Fn(f32) + Send>;

struct Inner {
    pitch: Option<f32>,
    volume: Option<f32>,
    listeners: Vec<EnergyListener>,
}

/// Shared observable store for the per-recording scores.
///
/// The pitch and volume analyzers each write their score here as it
/// arrives; the energy aggregate is recomputed on every write and pushed
/// to subscribers once both constituents are known.
pub struct ScoreBoard {
    inner: Mutex<Inner>,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                pitch: None,
                volume: None,
                listeners: Vec::new(),
            }),
        }
    }

    pub fn set_pitch_score(&self, score: f32) {
        self.update(|inner| inner.pitch = Some(score));
    }

    pub fn set_volume_score(&self, score: f32) {
        self.update(|inner| inner.volume = Some(score));
    }

    pub fn pitch_score(&self) -> Option<f32> {
        self.inner.lock().ok().and_then(|i| i.pitch)
    }

    pub fn volume_score(&self) -> Option<f32> {
        self.inner.lock().ok().and_then(|i| i.volume)
    }

    /// The composite score, available once both constituents are set.
    pub fn energy_score(&self) -> Option<f32> {
        let inner = self.inner.lock().ok()?;
        Some(score::energy_score(inner.pitch?, inner.volume?))
    }

    /// Register a callback fired with the energy score whenever a write
    /// completes the pair or changes the aggregate.
    pub fn subscribe(&self, listener: impl Fn(f32) + Send + 'static) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.listeners.push(Box::new(listener));
        }
    }

    fn update(&self, apply: impl FnOnce(&mut Inner)) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        apply(&mut inner);

        if let (Some(pitch), Some(volume)) = (inner.pitch, inner.volume) {
            let energy = score::energy_score(pitch, volume);
            for listener in inner.listeners.iter() {
                listener(energy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn no_energy_until_both_scores() {
        let board = ScoreBoard::new();
        assert!(board.energy_score().is_none());

        board.set_pitch_score(80.0);
        assert!(board.energy_score().is_none());

        board.set_volume_score(60.0);
        assert_eq!(board.energy_score(), Some(70.0));
    }

    #[test]
    fn recomputes_on_update() {
        let board = ScoreBoard::new();
        board.set_pitch_score(80.0);
        board.set_volume_score(60.0);
        assert_eq!(board.energy_score(), Some(70.0));

        board.set_volume_score(100.0);
        assert_eq!(board.energy_score(), Some(90.0));
    }

    #[test]
    fn subscribers_fire_when_pair_completes() {
        let board = ScoreBoard::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_for_listener = Arc::clone(&calls);
        board.subscribe(move |energy| {
            assert!((0.0..=100.0).contains(&energy));
            calls_for_listener.fetch_add(1, Ordering::SeqCst);
        });

        board.set_pitch_score(50.0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        board.set_volume_score(50.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        board.set_pitch_score(70.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
