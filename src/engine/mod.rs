use std::f32::consts::TAU;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::ai::PlayerSnapshot;
use crate::constants::{
    AGENT_RADIUS, MAX_GHOSTS, PLAYER_SPEED, POWER_DURATION_MS, STARTING_LIVES, TICK_RATE,
};
use crate::grid::Grid;
use crate::motion::{at_center, collides_in_direction, Body, Steering};
use crate::profile::{color_for_index, profile_for_index, DifficultyProfile};
use crate::release::ReleaseScheduler;
use crate::rng::Rng;
use crate::types::{
    Direction, GameConfig, GameEvent, GameOutcome, GameSummary, GhostColor, GhostMode, GhostView,
    GridInit, PlayerView, PointF, Snapshot, Vec2,
};

mod collision_system;
mod ghost_system;
mod player_system;

use self::ghost_system::GhostContext;

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub steering: Steering,
    pub score: u32,
    pub lives: u32,
    pub powered_until: u64,
    pub mouth: f32,
    mouth_opening: bool,
    pub facing: Direction,
}

impl Player {
    fn new(center: PointF, lives: u32) -> Self {
        Self {
            body: Body::new(center, PLAYER_SPEED, AGENT_RADIUS),
            steering: Steering::Manual,
            score: 0,
            lives,
            powered_until: 0,
            mouth: 0.0,
            mouth_opening: true,
            facing: Direction::Right,
        }
    }

    pub fn is_powered(&self, now_ms: u64) -> bool {
        now_ms < self.powered_until
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            tile: self.body.tile(),
            dir: self.body.dir,
            requested: self.body.requested,
            facing: self.facing,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: usize,
    pub body: Body,
    pub steering: Steering,
    pub color: GhostColor,
    pub base_speed: f32,
    pub vulnerable_speed: f32,
    pub alive: bool,
    pub respawn_at: u64,
    pub vulnerable: bool,
    pub vulnerable_until: u64,
    pub home_tile: Vec2,
    pub home_center: PointF,
    pub housed: bool,
    pub release_at: u64,
    awaiting_release: bool,
    bob_phase: f32,
    rng: Rng,
}

impl Ghost {
    pub fn mode(&self) -> GhostMode {
        if !self.alive {
            GhostMode::Dead
        } else if self.housed {
            GhostMode::Housed
        } else {
            GhostMode::Roaming
        }
    }

    fn view(&self) -> GhostView {
        GhostView {
            id: self.id,
            color: self.color,
            x: self.body.x,
            y: self.body.y,
            dir: self.body.dir,
            mode: self.mode(),
            alive: self.alive,
            vulnerable: self.vulnerable,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub seed: u32,
    pub starting_lives: Option<u32>,
    pub power_duration_ms: Option<u64>,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            starting_lives: None,
            power_duration_ms: None,
        }
    }
}

#[derive(Debug)]
pub struct GameEngine {
    pub config: GameConfig,
    pub grid: Grid,
    pub player: Player,
    pub ghosts: Vec<Ghost>,

    release: ReleaseScheduler,
    events: Vec<GameEvent>,
    elapsed_ms: u64,
    tick_counter: u64,
    paused: bool,
    ended: bool,
    outcome: Option<GameOutcome>,
}

impl GameEngine {
    pub fn new(options: GameEngineOptions) -> Self {
        Self::with_grid(Grid::standard(), options)
    }

    pub fn with_grid(grid: Grid, options: GameEngineOptions) -> Self {
        let mut rng = Rng::new(options.seed);
        let config = GameConfig {
            tick_rate: TICK_RATE,
            starting_lives: options.starting_lives.unwrap_or(STARTING_LIVES),
            power_duration_ms: options.power_duration_ms.unwrap_or(POWER_DURATION_MS),
            seed: options.seed,
        };

        let start = grid.player_start;
        let player = Player::new(grid.tile_center(start.x, start.y), config.starting_lives);

        let ghost_count = grid.ghost_starts.len().min(MAX_GHOSTS);
        let release = ReleaseScheduler::new(0, ghost_count);
        let ghosts = grid
            .ghost_starts
            .iter()
            .take(ghost_count)
            .enumerate()
            .map(|(idx, home)| {
                let profile = profile_for_index(idx);
                let home_center = grid.tile_center(home.x, home.y);
                let mut ghost_rng = rng.fork(idx as u32);
                let bob_phase = ghost_rng.next_f32() * TAU;
                let mut body = Body::new(home_center, profile.base_speed, AGENT_RADIUS);
                body.dir = Direction::Up;
                Ghost {
                    id: idx,
                    body,
                    steering: Steering::Profile(profile),
                    color: color_for_index(idx),
                    base_speed: profile.base_speed,
                    vulnerable_speed: profile.vulnerable_speed,
                    alive: true,
                    respawn_at: 0,
                    vulnerable: false,
                    vulnerable_until: 0,
                    home_tile: *home,
                    home_center,
                    housed: true,
                    release_at: release.schedule(0),
                    awaiting_release: false,
                    bob_phase,
                    rng: ghost_rng,
                }
            })
            .collect();

        info!(seed = options.seed, ghosts = ghost_count, "game created");

        Self {
            config,
            grid,
            player,
            ghosts,
            release,
            events: Vec::new(),
            elapsed_ms: 0,
            tick_counter: 0,
            paused: false,
            ended: false,
            outcome: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        debug!(paused = self.paused, "pause toggled");
    }

    /// Queues a turn for the player; it is retried every tick until it can be taken.
    pub fn request_direction(&mut self, dir: Direction) {
        if dir.is_none() {
            return;
        }
        self.player.body.requested = dir;
    }

    pub fn grid_init(&self) -> GridInit {
        self.grid.to_init()
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.ended || self.paused {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now_ms = self.elapsed_ms;
        let dt_sec = dt_ms as f32 / 1000.0;

        self.update_player(dt_sec);
        self.apply_pickups(now_ms);
        self.update_ghosts(dt_sec, now_ms);
        self.resolve_ghost_collisions(now_ms);
        self.check_victory();
        self.expire_vulnerability(now_ms);
    }

    /// Runs every ghost's update in parallel, then hands out release slots to ghosts revived this
    /// tick in id order.
    fn update_ghosts(&mut self, dt_sec: f32, now_ms: u64) {
        let ctx = GhostContext {
            grid: &self.grid,
            player: self.player.snapshot(),
            now_ms,
            dt_sec,
        };
        self.ghosts
            .par_iter_mut()
            .for_each(|ghost| ghost.update(&ctx));

        for ghost in self.ghosts.iter_mut().filter(|ghost| ghost.awaiting_release) {
            ghost.reserve_release(&self.release, now_ms);
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let now_ms = self.elapsed_ms;
        let snapshot = Snapshot {
            tick: self.tick_counter,
            now_ms,
            paused: self.paused,
            ended: self.ended,
            outcome: self.outcome,
            config: self.config.clone(),
            player: PlayerView {
                x: self.player.body.x,
                y: self.player.body.y,
                dir: self.player.body.dir,
                facing: self.player.facing,
                mouth: self.player.mouth,
                score: self.player.score,
                lives: self.player.lives,
                powered: self.player.is_powered(now_ms),
                powered_until: self.player.powered_until,
            },
            ghosts: self.ghosts.iter().map(Ghost::view).collect(),
            pellets: self.grid.pellet_cells(),
            power_pellets: self.grid.power_cells(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            outcome: self.outcome,
            ticks: self.tick_counter,
            duration_ms: self.elapsed_ms,
            score: self.player.score,
            lives: self.player.lives,
            pellets_left: self.grid.remaining_collectibles(),
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.outcome = Some(outcome);
        info!(
            ?outcome,
            score = self.player.score,
            ticks = self.tick_counter,
            "game over"
        );
    }
}

/// Updates `body.dir` from its steering. Manual agents take their queued turn once it is open;
/// profile agents consult `decide` at tile centers. An agent without a decision source passes a
/// `decide` that returns `None` and keeps its heading.
fn steer<F>(grid: &Grid, body: &mut Body, steering: Steering, decide: F)
where
    F: FnOnce(&Body, &DifficultyProfile) -> Option<Direction>,
{
    match steering {
        Steering::Manual => {
            let requested = body.requested;
            if !requested.is_none()
                && (body.dir.is_none() || at_center(grid, body))
                && !collides_in_direction(grid, body, requested)
            {
                body.dir = requested;
                body.requested = Direction::None;
            }
        }
        Steering::Profile(profile) => {
            if at_center(grid, body) {
                if let Some(dir) = decide(body, &profile) {
                    body.dir = dir;
                }
            }
        }
    }
}
