//! Sound cues for game events. Playback is fire-and-forget: every cue runs as its own task and
//! failures are logged at debug level and otherwise ignored.

use std::f32::consts::TAU;
use std::io::Write;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::{self, JoinSet};
use tracing::debug;

use crate::types::GameEvent;

pub const SAMPLE_RATE: u32 = 16_000;
const AMPLITUDE: f32 = 120.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Pellet,
    Power,
    GhostEaten,
    PlayerDied,
}

impl Cue {
    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::PelletCollected { .. } => Cue::Pellet,
            GameEvent::PowerCollected { .. } => Cue::Power,
            GameEvent::GhostEaten { .. } => Cue::GhostEaten,
            GameEvent::PlayerDied { .. } => Cue::PlayerDied,
        }
    }

    pub fn frequency_hz(self) -> f32 {
        match self {
            Cue::Pellet => 1200.0,
            Cue::Power => 400.0,
            Cue::GhostEaten => 250.0,
            Cue::PlayerDied => 180.0,
        }
    }

    pub fn duration_ms(self) -> u64 {
        match self {
            Cue::Pellet => 50,
            Cue::Power => 220,
            Cue::GhostEaten => 260,
            Cue::PlayerDied => 400,
        }
    }
}

/// Signed 8-bit mono sine tone at [`SAMPLE_RATE`] with a linear fade over the last third.
pub fn synthesize(cue: Cue) -> Vec<i8> {
    let len = (SAMPLE_RATE as u64 * cue.duration_ms() / 1000) as usize;
    let freq = cue.frequency_hz();
    (0..len)
        .map(|i| {
            let angle = TAU * i as f32 * freq / SAMPLE_RATE as f32;
            let envelope = (1.5 * (1.0 - i as f32 / len as f32)).min(1.0);
            (angle.sin() * AMPLITUDE * envelope) as i8
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("playback failed: {0}")]
    Playback(#[from] std::io::Error),
}

pub trait AudioOutput: Send + Sync + 'static {
    fn play(&self, cue: Cue, samples: &[i8]) -> Result<(), AudioError>;
}

/// Discards every cue. Used by headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn play(&self, _cue: Cue, _samples: &[i8]) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Rings the terminal bell for cues loud enough to notice; pellet ticks are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalBell;

impl AudioOutput for TerminalBell {
    fn play(&self, cue: Cue, samples: &[i8]) -> Result<(), AudioError> {
        if samples.is_empty() {
            return Err(AudioError::UnsupportedFormat(format!("empty {cue:?} tone")));
        }
        if cue == Cue::Pellet {
            return Ok(());
        }
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

pub struct AudioDispatcher {
    output: Arc<dyn AudioOutput>,
    tasks: JoinSet<()>,
}

impl AudioDispatcher {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            output,
            tasks: JoinSet::new(),
        }
    }

    /// Starts one background playback per event. Must be called inside a tokio runtime.
    pub fn dispatch(&mut self, events: &[GameEvent]) {
        self.reap_finished();
        for event in events {
            let cue = Cue::for_event(event);
            let output = Arc::clone(&self.output);
            // Device writes block until the tone drains, so they run on the blocking pool.
            let playback = task::spawn_blocking(move || output.play(cue, &synthesize(cue)));
            self.tasks.spawn(async move {
                match playback.await {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => debug!(?cue, %error, "audio cue dropped"),
                    Err(error) => debug!(?cue, %error, "audio playback panicked"),
                }
            });
        }
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(error) = result {
                if !error.is_cancelled() {
                    debug!(%error, "audio task failed");
                }
            }
        }
    }

    /// Abandons in-flight playback without waiting for it. A device write already in progress
    /// finishes on its own thread; nothing is reported for it.
    pub fn shutdown(&mut self) {
        self.tasks.abort_all();
    }
}
