//! Real-time loop: one engine step per interval tick, input applied before the step, the frame
//! presented and audio dispatched after it.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::audio::AudioDispatcher;
use crate::constants::{frame_dt_ms, TICK_US};
use crate::engine::GameEngine;
use crate::types::{Direction, GameSummary, GridInit, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputCommand {
    Move(Direction),
    TogglePause,
    Quit,
}

impl InputCommand {
    /// `w`/`a`/`s`/`d` move, `p` toggles pause, `q` quits.
    pub fn parse(line: &str) -> Option<Self> {
        let key = line.trim().to_ascii_lowercase();
        match key.as_str() {
            "p" => Some(InputCommand::TogglePause),
            "q" => Some(InputCommand::Quit),
            other => Direction::parse_move(other).map(InputCommand::Move),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverExit {
    Ended,
    Quit,
    InputClosed,
    TickLimit,
}

#[derive(Clone, Debug)]
pub struct DriverOptions {
    pub tick: Duration,
    pub max_frames: Option<u64>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_micros(TICK_US),
            max_frames: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DriverReport {
    pub exit: DriverExit,
    pub frames: u64,
    pub summary: GameSummary,
}

enum Drained {
    Continue,
    Quit,
    Closed,
}

/// Applies queued commands. At most one move is taken per tick; later moves wait in the channel.
fn drain_input(engine: &mut GameEngine, input: &mut mpsc::Receiver<InputCommand>) -> Drained {
    loop {
        match input.try_recv() {
            Ok(InputCommand::Move(dir)) => {
                engine.request_direction(dir);
                return Drained::Continue;
            }
            Ok(InputCommand::TogglePause) => engine.toggle_pause(),
            Ok(InputCommand::Quit) => return Drained::Quit,
            Err(TryRecvError::Empty) => return Drained::Continue,
            Err(TryRecvError::Disconnected) => return Drained::Closed,
        }
    }
}

pub async fn run<F>(
    engine: &mut GameEngine,
    input: &mut mpsc::Receiver<InputCommand>,
    audio: &mut AudioDispatcher,
    options: DriverOptions,
    mut present: F,
) -> DriverReport
where
    F: FnMut(&GridInit, &Snapshot),
{
    let init = engine.grid_init();
    let tick_us = (options.tick.as_micros() as u64).max(1_000);
    let mut interval = tokio::time::interval(Duration::from_micros(tick_us));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frames = 0u64;

    let exit = loop {
        if options.max_frames.is_some_and(|max| frames >= max) {
            break DriverExit::TickLimit;
        }
        interval.tick().await;

        match drain_input(engine, input) {
            Drained::Continue => {}
            Drained::Quit => break DriverExit::Quit,
            Drained::Closed => break DriverExit::InputClosed,
        }

        engine.step(frame_dt_ms(frames, tick_us));
        let snapshot = engine.build_snapshot(true);
        audio.dispatch(&snapshot.events);
        present(&init, &snapshot);
        frames += 1;

        if snapshot.ended {
            break DriverExit::Ended;
        }
    };

    if exit != DriverExit::Ended {
        audio.shutdown();
    }
    let summary = engine.build_summary();
    info!(?exit, frames, score = summary.score, "driver stopped");
    DriverReport {
        exit,
        frames,
        summary,
    }
}
