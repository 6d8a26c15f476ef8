//! Breadth-first player controller used by the headless simulator.

use std::collections::{HashSet, VecDeque};

use crate::constants::tile_index;
use crate::grid::Grid;
use crate::types::{Direction, GhostMode, Snapshot, Vec2};

/// Tiles within this Manhattan distance of a hostile ghost are avoided when another route exists.
const DANGER_RADIUS: i32 = 2;

/// First step of the shortest route to the nearest pellet or power pellet.
pub fn choose_direction(grid: &Grid, snapshot: &Snapshot) -> Option<Direction> {
    let start = Vec2::new(
        tile_index(snapshot.player.x),
        tile_index(snapshot.player.y),
    );
    if !grid.in_bounds(start.x, start.y) {
        return None;
    }

    let danger = danger_cells(snapshot);
    first_step_to_collectible(grid, start, &danger)
        .or_else(|| first_step_to_collectible(grid, start, &HashSet::new()))
}

fn danger_cells(snapshot: &Snapshot) -> HashSet<(i32, i32)> {
    let mut out = HashSet::new();
    for ghost in &snapshot.ghosts {
        if ghost.mode != GhostMode::Roaming || ghost.vulnerable {
            continue;
        }
        let (gx, gy) = (tile_index(ghost.x), tile_index(ghost.y));
        for dy in -DANGER_RADIUS..=DANGER_RADIUS {
            let span = DANGER_RADIUS - dy.abs();
            for dx in -span..=span {
                out.insert((gx + dx, gy + dy));
            }
        }
    }
    out
}

/// Open neighbor of `cell`, wrapping horizontally across tunnel rows.
fn neighbor(grid: &Grid, cell: Vec2, dir: Direction) -> Option<Vec2> {
    let mut next = cell.step(dir);
    if !grid.in_bounds(next.x, next.y) {
        if !(dir.is_horizontal() && grid.is_tunnel_row(cell.y)) {
            return None;
        }
        next.x = next.x.rem_euclid(grid.width);
    }
    if grid.is_wall(next.x, next.y) {
        None
    } else {
        Some(next)
    }
}

fn first_step_to_collectible(
    grid: &Grid,
    start: Vec2,
    avoid: &HashSet<(i32, i32)>,
) -> Option<Direction> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert((start.x, start.y));

    for dir in Direction::CARDINALS {
        let Some(next) = neighbor(grid, start, dir) else {
            continue;
        };
        if avoid.contains(&(next.x, next.y)) || !visited.insert((next.x, next.y)) {
            continue;
        }
        queue.push_back((next, dir));
    }

    while let Some((cell, first)) = queue.pop_front() {
        if grid.has_pellet(cell.x, cell.y) || grid.has_power(cell.x, cell.y) {
            return Some(first);
        }
        for dir in Direction::CARDINALS {
            let Some(next) = neighbor(grid, cell, dir) else {
                continue;
            };
            if avoid.contains(&(next.x, next.y)) {
                continue;
            }
            if visited.insert((next.x, next.y)) {
                queue.push_back((next, first));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GameEngine, GameEngineOptions};

    fn engine() -> GameEngine {
        GameEngine::new(GameEngineOptions::default())
    }

    fn place_player(snapshot: &mut Snapshot, grid: &Grid, tx: i32, ty: i32) {
        let center = grid.tile_center(tx, ty);
        snapshot.player.x = center.x;
        snapshot.player.y = center.y;
    }

    #[test]
    fn heads_for_the_adjacent_pellet_first() {
        let mut engine = engine();
        let snapshot = engine.build_snapshot(false);
        // Both neighbors of the start hold pellets; left is tried first.
        assert_eq!(
            choose_direction(&engine.grid, &snapshot),
            Some(Direction::Left)
        );
    }

    #[test]
    fn detours_around_a_hostile_ghost() {
        let mut engine = engine();
        let mut snapshot = engine.build_snapshot(false);
        let ghost_center = engine.grid.tile_center(11, 22);
        snapshot.ghosts[0].mode = GhostMode::Roaming;
        snapshot.ghosts[0].vulnerable = false;
        snapshot.ghosts[0].x = ghost_center.x;
        snapshot.ghosts[0].y = ghost_center.y;

        assert_eq!(
            choose_direction(&engine.grid, &snapshot),
            Some(Direction::Right)
        );

        snapshot.ghosts[0].vulnerable = true;
        assert_eq!(
            choose_direction(&engine.grid, &snapshot),
            Some(Direction::Left)
        );
    }

    #[test]
    fn uses_the_tunnel_when_it_is_shorter() {
        let mut engine = engine();
        for (x, y) in engine.grid.collectible_cells() {
            if (x, y) != (21, 14) {
                engine.grid.take_pellet(x, y);
                engine.grid.take_power(x, y);
            }
        }
        let mut snapshot = engine.build_snapshot(false);
        place_player(&mut snapshot, &engine.grid, 0, 14);
        assert_eq!(
            choose_direction(&engine.grid, &snapshot),
            Some(Direction::Left)
        );
    }

    #[test]
    fn nothing_left_means_no_direction() {
        let mut engine = engine();
        for (x, y) in engine.grid.collectible_cells() {
            engine.grid.take_pellet(x, y);
            engine.grid.take_power(x, y);
        }
        let snapshot = engine.build_snapshot(false);
        assert_eq!(choose_direction(&engine.grid, &snapshot), None);
    }
}
