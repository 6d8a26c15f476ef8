use super::*;
use crate::constants::MOUTH_RATE;
use crate::motion::{advance, at_center, collides_in_direction, snap_to_tile_center};

impl Player {
    fn animate_mouth(&mut self, dt_sec: f32) {
        let sign = if self.mouth_opening { 1.0 } else { -1.0 };
        self.mouth += dt_sec * MOUTH_RATE * sign;
        if self.mouth > 1.0 {
            self.mouth = 1.0;
            self.mouth_opening = false;
        } else if self.mouth < 0.0 {
            self.mouth = 0.0;
            self.mouth_opening = true;
        }
    }
}

impl GameEngine {
    pub(super) fn update_player(&mut self, dt_sec: f32) {
        let grid = &self.grid;
        let player = &mut self.player;
        player.animate_mouth(dt_sec);

        steer(grid, &mut player.body, player.steering, |_, _| None);

        let dir = player.body.dir;
        if dir.is_none() {
            return;
        }
        if !collides_in_direction(grid, &player.body, dir) {
            let speed = player.body.speed;
            advance(&mut player.body, dir, speed, dt_sec);
            player.facing = dir;
        } else {
            if !at_center(grid, &player.body) {
                snap_to_tile_center(grid, &mut player.body);
            }
            player.body.dir = Direction::None;
        }
    }
}
