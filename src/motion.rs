use crate::constants::{tile_index, CENTER_TOLERANCE, SCREEN_H, SCREEN_W, TILE};
use crate::grid::Grid;
use crate::profile::DifficultyProfile;
use crate::types::{Direction, PointF, Vec2};

/// What decides a body's heading. Motion code never looks at this.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Steering {
    Manual,
    Profile(DifficultyProfile),
}

/// Movement state shared by the player and the ghosts.
#[derive(Clone, Debug)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub requested: Direction,
    pub speed: f32,
    pub radius: f32,
}

impl Body {
    pub fn new(center: PointF, speed: f32, radius: f32) -> Self {
        Self {
            x: center.x,
            y: center.y,
            dir: Direction::None,
            requested: Direction::None,
            speed,
            radius,
        }
    }

    pub fn tile(&self) -> Vec2 {
        Vec2::new(tile_index(self.x), tile_index(self.y))
    }

    pub fn place_at(&mut self, center: PointF) {
        self.x = center.x;
        self.y = center.y;
    }

    pub fn distance_to(&self, other: &Body) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

pub fn at_center(grid: &Grid, body: &Body) -> bool {
    let tile = body.tile();
    if !grid.in_bounds(tile.x, tile.y) {
        return false;
    }
    let center = grid.tile_center(tile.x, tile.y);
    (body.x - center.x).abs() < CENTER_TOLERANCE && (body.y - center.y).abs() < CENTER_TOLERANCE
}

pub fn collides_in_direction(grid: &Grid, body: &Body, dir: Direction) -> bool {
    if dir.is_none() {
        return false;
    }
    let look = TILE as f32 / 2.0;
    let (dx, dy) = dir.delta();
    let tx = tile_index(body.x + dx as f32 * look);
    let ty = tile_index(body.y + dy as f32 * look);

    if !grid.in_bounds(tx, ty) {
        return !(dir.is_horizontal() && grid.is_tunnel_row(tile_index(body.y)));
    }
    grid.is_wall(tx, ty)
}

pub fn advance(body: &mut Body, dir: Direction, speed: f32, dt_sec: f32) {
    let (dx, dy) = dir.delta();
    body.x += dx as f32 * speed * dt_sec;
    body.y += dy as f32 * speed * dt_sec;

    let half = TILE as f32 / 2.0;
    if body.x < -half {
        body.x = SCREEN_W - half;
    } else if body.x > SCREEN_W + half {
        body.x = half;
    }
    body.y = body.y.clamp(body.radius, SCREEN_H - body.radius);
}

/// Moves the body onto the center of the tile it occupies, if that tile is on the grid.
pub fn snap_to_tile_center(grid: &Grid, body: &mut Body) {
    let tile = body.tile();
    if grid.in_bounds(tile.x, tile.y) {
        body.place_at(grid.tile_center(tile.x, tile.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AGENT_RADIUS;

    fn body_at(grid: &Grid, tx: i32, ty: i32) -> Body {
        Body::new(grid.tile_center(tx, ty), 100.0, AGENT_RADIUS)
    }

    #[test]
    fn at_center_respects_tolerance() {
        let grid = Grid::standard();
        let mut body = body_at(&grid, 1, 1);
        assert!(at_center(&grid, &body));
        body.x += 2.9;
        assert!(at_center(&grid, &body));
        body.x += 0.2;
        assert!(!at_center(&grid, &body));
    }

    #[test]
    fn at_center_is_false_off_grid() {
        let grid = Grid::standard();
        let mut body = body_at(&grid, 0, 14);
        body.x = -12.0;
        assert!(!at_center(&grid, &body));
    }

    #[test]
    fn walls_block_and_corridors_do_not() {
        let grid = Grid::standard();
        let mut body = body_at(&grid, 1, 1);
        body.x -= 1.0;
        body.y -= 1.0;
        assert!(collides_in_direction(&grid, &body, Direction::Left));
        assert!(collides_in_direction(&grid, &body, Direction::Up));
        assert!(!collides_in_direction(&grid, &body, Direction::Right));
        assert!(!collides_in_direction(&grid, &body, Direction::Down));
        assert!(!collides_in_direction(&grid, &body, Direction::None));
    }

    #[test]
    fn leaving_grid_is_allowed_only_on_tunnel_rows() {
        let grid = Grid::standard();
        let tunnel = body_at(&grid, 0, 14);
        assert!(!collides_in_direction(&grid, &tunnel, Direction::Left));

        let mut edge = body_at(&grid, 1, 1);
        edge.y = 2.0;
        assert!(collides_in_direction(&grid, &edge, Direction::Up));
    }

    #[test]
    fn moving_left_off_a_tunnel_row_wraps_to_the_right_edge() {
        let grid = Grid::standard();
        let mut body = body_at(&grid, 0, 14);
        let y_before = body.y;
        body.dir = Direction::Left;
        let dt = 1.0 / 60.0;
        let mut wrapped = false;
        for _ in 0..120 {
            assert!(!collides_in_direction(&grid, &body, Direction::Left));
            advance(&mut body, Direction::Left, 125.0, dt);
            if body.x > SCREEN_W / 2.0 {
                wrapped = true;
                break;
            }
        }
        assert!(wrapped);
        assert_eq!(body.x, SCREEN_W - TILE as f32 / 2.0);
        assert_eq!(body.y, y_before);
        assert_eq!(body.dir, Direction::Left);
    }

    #[test]
    fn moving_left_on_a_walled_row_is_blocked_at_the_boundary() {
        let grid = Grid::standard();
        let mut body = body_at(&grid, 1, 5);
        body.x -= 1.0;
        assert!(collides_in_direction(&grid, &body, Direction::Left));
        assert!(!grid.is_tunnel_row(5));
    }

    #[test]
    fn right_wrap_and_vertical_clamp() {
        let mut body = Body::new(
            PointF {
                x: SCREEN_W + 11.0,
                y: 5.0,
            },
            0.0,
            AGENT_RADIUS,
        );
        advance(&mut body, Direction::Right, 120.0, 1.0 / 60.0);
        assert_eq!(body.x, TILE as f32 / 2.0);
        advance(&mut body, Direction::Up, 120.0, 1.0);
        assert_eq!(body.y, AGENT_RADIUS);
    }

    #[test]
    fn snap_moves_to_tile_center() {
        let grid = Grid::standard();
        let mut body = body_at(&grid, 3, 5);
        body.x += 7.0;
        snap_to_tile_center(&grid, &mut body);
        assert_eq!(body.x, grid.tile_center(3, 5).x);
        assert_eq!(body.y, grid.tile_center(3, 5).y);
    }
}
