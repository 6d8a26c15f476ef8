use super::*;
use crate::constants::{
    CAPTURE_RADIUS_FACTOR, GHOST_RESPAWN_MS, GHOST_SCORE, PELLET_SCORE, PICKUP_TOLERANCE,
    POWER_SCORE,
};

impl GameEngine {
    pub(super) fn apply_pickups(&mut self, now_ms: u64) {
        let tile = self.player.body.tile();
        if !self.grid.in_bounds(tile.x, tile.y) {
            return;
        }
        let center = self.grid.tile_center(tile.x, tile.y);
        if (self.player.body.x - center.x).abs() >= PICKUP_TOLERANCE
            || (self.player.body.y - center.y).abs() >= PICKUP_TOLERANCE
        {
            return;
        }

        if self.grid.take_pellet(tile.x, tile.y) {
            self.player.score += PELLET_SCORE;
            self.events.push(GameEvent::PelletCollected {
                x: tile.x,
                y: tile.y,
            });
        } else if self.grid.take_power(tile.x, tile.y) {
            self.player.score += POWER_SCORE;
            self.player.powered_until = now_ms + self.config.power_duration_ms;
            let until = self.player.powered_until;
            for ghost in &mut self.ghosts {
                ghost.vulnerable = true;
                ghost.vulnerable_until = until;
                ghost.body.speed = ghost.vulnerable_speed;
            }
            self.events.push(GameEvent::PowerCollected {
                x: tile.x,
                y: tile.y,
            });
            debug!(until, "player powered up");
        }
    }

    pub(super) fn resolve_ghost_collisions(&mut self, now_ms: u64) {
        for idx in 0..self.ghosts.len() {
            let ghost = &self.ghosts[idx];
            if !ghost.alive || ghost.housed {
                continue;
            }
            let reach = (self.player.body.radius + ghost.body.radius) * CAPTURE_RADIUS_FACTOR;
            if self.player.body.distance_to(&ghost.body) >= reach {
                continue;
            }

            if ghost.vulnerable {
                let ghost = &mut self.ghosts[idx];
                ghost.alive = false;
                ghost.respawn_at = now_ms + GHOST_RESPAWN_MS;
                self.player.score += GHOST_SCORE;
                self.events.push(GameEvent::GhostEaten { ghost: idx });
                info!(ghost = idx, score = self.player.score, "ghost eaten");
                continue;
            }

            self.player.lives = self.player.lives.saturating_sub(1);
            let lives = self.player.lives;
            self.events.push(GameEvent::PlayerDied { lives });
            info!(ghost = idx, lives, "player caught");
            if lives == 0 {
                self.finish(GameOutcome::Defeat);
            } else {
                self.reset_positions(now_ms);
            }
            return;
        }
    }

    /// Sends every agent back to its start. Score, lives and the remaining collectibles are kept.
    pub(super) fn reset_positions(&mut self, now_ms: u64) {
        let start = self.grid.player_start;
        let body = &mut self.player.body;
        body.place_at(self.grid.tile_center(start.x, start.y));
        body.dir = Direction::None;
        body.requested = Direction::None;
        self.player.facing = Direction::Right;

        self.release.reset(now_ms, self.ghosts.len());
        for ghost in &mut self.ghosts {
            ghost.send_home(self.release.schedule(now_ms));
        }
    }

    pub(super) fn check_victory(&mut self) {
        if !self.ended && self.grid.remaining_collectibles() == 0 {
            self.finish(GameOutcome::Victory);
        }
    }

    pub(super) fn expire_vulnerability(&mut self, now_ms: u64) {
        if self.player.is_powered(now_ms) {
            return;
        }
        for ghost in &mut self.ghosts {
            if ghost.vulnerable && now_ms >= ghost.vulnerable_until {
                ghost.vulnerable = false;
                ghost.body.speed = ghost.base_speed;
            }
        }
    }
}
