pub const TICK_RATE: u32 = 60;
pub const TICK_US: u64 = 1_000_000 / TICK_RATE as u64;

pub const TILE: i32 = 24;
pub const GRID_W: i32 = 28;
pub const GRID_H: i32 = 31;
pub const SCREEN_W: f32 = (TILE * GRID_W) as f32;
pub const SCREEN_H: f32 = (TILE * GRID_H) as f32;

/// Half-width of the window around a tile center in which an agent counts as aligned.
pub const CENTER_TOLERANCE: f32 = 3.0;
pub const PICKUP_TOLERANCE: f32 = 6.0;
pub const CAPTURE_RADIUS_FACTOR: f32 = 0.7;
pub const AGENT_RADIUS: f32 = (TILE / 2 - 2) as f32;

pub const PLAYER_SPEED: f32 = 125.0;
pub const STARTING_LIVES: u32 = 3;
pub const MOUTH_RATE: f32 = 4.0;

pub const POWER_DURATION_MS: u64 = 8_000;
pub const GHOST_RESPAWN_MS: u64 = 4_000;
pub const REVIVE_RELEASE_DELAY_MS: u64 = 3_000;

pub const INITIAL_RELEASE_DELAY_MS: u64 = 500;
pub const INITIAL_RELEASE_GAP_MS: u64 = 1_000;
pub const STANDARD_RELEASE_GAP_MS: u64 = 3_000;
pub const MAX_GHOSTS: usize = 4;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_SCORE: u32 = 50;
pub const GHOST_SCORE: u32 = 200;

pub const BACKFILL_SEED: u32 = 123;
pub const BACKFILL_PELLET_CHANCE: f32 = 0.9;

/// Whole milliseconds to step on frame `frame` so the engine clock stays within a millisecond of
/// `frame * tick_us`. At 60 Hz this alternates 16 and 17.
pub fn frame_dt_ms(frame: u64, tick_us: u64) -> u64 {
    ((frame + 1) * tick_us) / 1000 - (frame * tick_us) / 1000
}

pub fn tile_center_px(index: i32) -> f32 {
    (index * TILE + TILE / 2) as f32
}

pub fn tile_index(coord: f32) -> i32 {
    (coord / TILE as f32).floor() as i32
}
