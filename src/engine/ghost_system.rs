use super::*;
use crate::ai::{self, random_direction};
use crate::constants::REVIVE_RELEASE_DELAY_MS;
use crate::motion::{advance, collides_in_direction, snap_to_tile_center};

const BOB_X_AMPLITUDE: f32 = 4.0;
const BOB_Y_AMPLITUDE: f32 = 1.5;

/// Everything a ghost may read during its update. Shared by reference across the parallel tasks.
pub(super) struct GhostContext<'a> {
    pub grid: &'a Grid,
    pub player: PlayerSnapshot,
    pub now_ms: u64,
    pub dt_sec: f32,
}

impl Ghost {
    pub(super) fn update(&mut self, ctx: &GhostContext<'_>) {
        if !self.alive {
            if ctx.now_ms < self.respawn_at {
                return;
            }
            self.revive(ctx.now_ms);
        }

        if self.housed {
            self.bob(ctx.now_ms);
            if ctx.now_ms < self.release_at {
                return;
            }
            self.leave_house();
        }

        self.roam(ctx);
    }

    /// Back in the house with no release time yet; the engine reserves one after the parallel
    /// update so simultaneous revivals are ordered by id.
    fn revive(&mut self, now_ms: u64) {
        self.alive = true;
        self.body.place_at(self.home_center);
        self.body.dir = Direction::Up;
        self.vulnerable = false;
        self.vulnerable_until = 0;
        self.body.speed = self.base_speed;
        self.housed = true;
        self.release_at = u64::MAX;
        self.awaiting_release = true;
        debug!(ghost = self.id, now_ms, "ghost back in the house");
    }

    pub(super) fn reserve_release(&mut self, release: &ReleaseScheduler, now_ms: u64) {
        self.release_at = release.schedule(now_ms + REVIVE_RELEASE_DELAY_MS);
        self.awaiting_release = false;
        info!(ghost = self.id, release_at = self.release_at, "ghost revived");
    }

    fn bob(&mut self, now_ms: u64) {
        let t = now_ms as f32 / 1000.0;
        self.body.x = self.home_center.x + (t * 2.0 + self.bob_phase).sin() * BOB_X_AMPLITUDE;
        self.body.y = self.home_center.y + (t * 3.0 + self.bob_phase).cos() * BOB_Y_AMPLITUDE;
    }

    fn leave_house(&mut self) {
        self.housed = false;
        self.body.dir = Direction::Up;
        self.body.x = self.home_center.x;
        self.body.y = self.home_center.y - self.body.radius;
        debug!(ghost = self.id, "ghost left the house");
    }

    /// Puts the ghost back in the house after the player lost a life.
    pub(super) fn send_home(&mut self, release_at: u64) {
        self.body.place_at(self.home_center);
        self.body.dir = Direction::Up;
        self.body.speed = self.base_speed;
        self.alive = true;
        self.vulnerable = false;
        self.vulnerable_until = 0;
        self.housed = true;
        self.release_at = release_at;
        self.awaiting_release = false;
    }

    fn roam(&mut self, ctx: &GhostContext<'_>) {
        let grid = ctx.grid;
        if self.vulnerable && ctx.now_ms >= self.vulnerable_until {
            self.vulnerable = false;
        }
        self.body.speed = if self.vulnerable {
            self.vulnerable_speed
        } else {
            self.base_speed
        };

        let vulnerable = self.vulnerable;
        let rng = &mut self.rng;
        steer(grid, &mut self.body, self.steering, |body, profile| {
            ai::decide(
                grid,
                profile,
                rng,
                body.tile(),
                body.dir,
                vulnerable,
                &ctx.player,
            )
        });

        if let Steering::Profile(profile) = self.steering {
            if self.rng.bool(profile.random_turn_chance * 0.5) {
                self.body.dir = random_direction(&mut self.rng);
            }
        }

        let dir = self.body.dir;
        if dir.is_none() {
            return;
        }
        if !collides_in_direction(grid, &self.body, dir) {
            let speed = self.body.speed;
            advance(&mut self.body, dir, speed, ctx.dt_sec);
        } else {
            snap_to_tile_center(grid, &mut self.body);
            self.body.dir = match self.steering {
                Steering::Profile(_) => random_direction(&mut self.rng),
                Steering::Manual => Direction::None,
            };
        }
    }
}
