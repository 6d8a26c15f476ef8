//! Ghost decision procedure. Everything here is a pure function of the grid, the ghost's own
//! random stream and a read-only view of the player, so ghosts can decide in parallel.

use crate::grid::Grid;
use crate::profile::{DifficultyProfile, ProfileKind};
use crate::rng::Rng;
use crate::types::{Direction, Vec2};

/// Extra tiles the relentless profile looks past its predicted tile.
const BLEND_EXTENSION_TILES: i32 = 2;

/// Read-only view of the player handed to every ghost task for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    pub tile: Vec2,
    pub dir: Direction,
    pub requested: Direction,
    pub facing: Direction,
}

impl PlayerSnapshot {
    fn heading_or_request(&self) -> Direction {
        if self.dir.is_none() {
            self.requested
        } else {
            self.dir
        }
    }

    fn heading_or_facing(&self) -> Direction {
        if self.dir.is_none() {
            self.facing
        } else {
            self.dir
        }
    }
}

pub fn random_direction(rng: &mut Rng) -> Direction {
    rng.pick(&Direction::CARDINALS).unwrap_or(Direction::Up)
}

/// Open neighbors of `tile`, minus the reverse of `current` unless it is the only way out.
pub fn open_options(grid: &Grid, tile: Vec2, current: Direction) -> Vec<Direction> {
    let mut options: Vec<Direction> = Direction::CARDINALS
        .into_iter()
        .filter(|dir| {
            let next = tile.step(*dir);
            !grid.blocks(next.x, next.y)
        })
        .collect();
    let reverse = current.opposite();
    if options.len() > 1 && !reverse.is_none() {
        options.retain(|dir| *dir != reverse);
    }
    options
}

/// Option whose neighbor tile is nearest to (or farthest from) `target`; the first best wins.
pub fn choose_by_distance(
    options: &[Direction],
    from: Vec2,
    target: Vec2,
    farthest: bool,
) -> Direction {
    let mut choice = options.first().copied().unwrap_or(Direction::None);
    let mut best = if farthest {
        f32::NEG_INFINITY
    } else {
        f32::INFINITY
    };
    for dir in options {
        let next = from.step(*dir);
        let dist = ((target.x - next.x) as f32).hypot((target.y - next.y) as f32);
        let better = if farthest { dist > best } else { dist < best };
        if better {
            best = dist;
            choice = *dir;
        }
    }
    choice
}

pub fn advance_until_wall(grid: &Grid, start: Vec2, dir: Direction, steps: i32) -> Vec2 {
    if dir.is_none() {
        return start;
    }
    let mut cell = start;
    for _ in 0..steps {
        let next = cell.step(dir);
        if grid.is_wall(next.x, next.y) {
            break;
        }
        cell = next;
    }
    cell
}

fn clamp_to_grid(grid: &Grid, cell: Vec2) -> Vec2 {
    Vec2::new(
        cell.x.clamp(0, grid.width - 1),
        cell.y.clamp(0, grid.height - 1),
    )
}

/// Player tile extrapolated `steps` tiles along its current (or requested) heading.
pub fn predicted_tile(grid: &Grid, player: &PlayerSnapshot, steps: i32) -> Vec2 {
    let heading = player.heading_or_request();
    if heading.is_none() {
        return player.tile;
    }
    clamp_to_grid(grid, advance_until_wall(grid, player.tile, heading, steps))
}

/// Predicted tile pushed further along the heading, then pulled 1/3 of the way back to the player.
pub fn blended_target(grid: &Grid, player: &PlayerSnapshot, depth: i32) -> Vec2 {
    let predicted = predicted_tile(grid, player, depth);
    let extended = advance_until_wall(
        grid,
        predicted,
        player.heading_or_facing(),
        BLEND_EXTENSION_TILES,
    );
    let blend_x = ((extended.x * 2 + player.tile.x) as f32 / 3.0).round() as i32;
    let blend_y = ((extended.y * 2 + player.tile.y) as f32 / 3.0).round() as i32;
    clamp_to_grid(grid, Vec2::new(blend_x, blend_y))
}

pub fn chase_target(grid: &Grid, profile: &DifficultyProfile, player: &PlayerSnapshot) -> Vec2 {
    if profile.kind == ProfileKind::Relentless {
        return blended_target(grid, player, profile.prediction_tiles);
    }
    if profile.prediction_tiles > 0 {
        return predicted_tile(grid, player, profile.prediction_tiles);
    }
    player.tile
}

/// Direction picked at a cell center, or `None` when the tile has no open neighbor.
pub fn decide(
    grid: &Grid,
    profile: &DifficultyProfile,
    rng: &mut Rng,
    tile: Vec2,
    current: Direction,
    vulnerable: bool,
    player: &PlayerSnapshot,
) -> Option<Direction> {
    let options = open_options(grid, tile, current);
    let mut selected = rng.pick(&options)?;

    if vulnerable {
        selected = choose_by_distance(&options, tile, player.tile, true);
    } else {
        let target = chase_target(grid, profile, player);
        if rng.bool(profile.chase_bias) {
            selected = choose_by_distance(&options, tile, target, false);
        }
    }

    if rng.bool(profile.random_turn_chance) {
        selected = rng.pick(&options).unwrap_or(selected);
    }
    Some(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::profile::{BALANCED, ERRATIC, PRECISE, RELENTLESS};

    fn snapshot(tile: Vec2, dir: Direction) -> PlayerSnapshot {
        PlayerSnapshot {
            tile,
            dir,
            requested: Direction::None,
            facing: Direction::Right,
        }
    }

    #[test]
    fn reverse_is_excluded_when_other_options_exist() {
        let grid = Grid::standard();
        // (6, 5) is a four-way junction.
        let options = open_options(&grid, Vec2::new(6, 5), Direction::Right);
        assert_eq!(options.len(), 3);
        assert!(!options.contains(&Direction::Left));
    }

    #[test]
    fn reverse_is_kept_in_a_dead_end() {
        let mut grid = Grid::standard();
        grid.set_tile(
            2,
            1,
            Tile {
                wall: true,
                pellet: false,
                power: false,
            },
        );
        let options = open_options(&grid, Vec2::new(1, 1), Direction::Up);
        assert_eq!(options, vec![Direction::Down]);
    }

    #[test]
    fn no_backtrack_holds_over_every_open_tile() {
        let grid = Grid::standard();
        for y in 0..grid.height {
            for x in 0..grid.width {
                if grid.is_wall(x, y) {
                    continue;
                }
                for current in Direction::CARDINALS {
                    let options = open_options(&grid, Vec2::new(x, y), current);
                    if options.len() >= 2 {
                        assert!(!options.contains(&current.opposite()));
                    }
                }
            }
        }
    }

    #[test]
    fn tunnel_exit_counts_as_an_option() {
        let grid = Grid::standard();
        let options = open_options(&grid, Vec2::new(0, 14), Direction::Left);
        assert!(options.contains(&Direction::Left));
    }

    #[test]
    fn distance_choice_prefers_first_on_ties() {
        let from = Vec2::new(5, 5);
        let options = [Direction::Up, Direction::Down];
        assert_eq!(
            choose_by_distance(&options, from, Vec2::new(10, 5), false),
            Direction::Up
        );
        assert_eq!(
            choose_by_distance(&options, from, Vec2::new(5, 0), false),
            Direction::Up
        );
        assert_eq!(
            choose_by_distance(&options, from, Vec2::new(5, 0), true),
            Direction::Down
        );
    }

    #[test]
    fn prediction_stops_at_walls() {
        let grid = Grid::standard();
        let player = snapshot(Vec2::new(1, 5), Direction::Right);
        assert_eq!(predicted_tile(&grid, &player, 3), Vec2::new(4, 5));

        let against_wall = snapshot(Vec2::new(1, 5), Direction::Left);
        assert_eq!(predicted_tile(&grid, &against_wall, 3), Vec2::new(1, 5));
    }

    #[test]
    fn prediction_uses_request_when_stopped() {
        let grid = Grid::standard();
        let mut player = snapshot(Vec2::new(1, 5), Direction::None);
        assert_eq!(predicted_tile(&grid, &player, 2), Vec2::new(1, 5));
        player.requested = Direction::Right;
        assert_eq!(predicted_tile(&grid, &player, 2), Vec2::new(3, 5));
    }

    #[test]
    fn blended_target_weights_toward_extension() {
        let grid = Grid::standard();
        let player = snapshot(Vec2::new(1, 5), Direction::Right);
        // predicted (7,5), extended (9,5), blend round((18 + 1) / 3) = 6
        assert_eq!(blended_target(&grid, &player, 6), Vec2::new(6, 5));
    }

    #[test]
    fn chase_target_depends_on_profile() {
        let grid = Grid::standard();
        let player = snapshot(Vec2::new(1, 5), Direction::Right);
        assert_eq!(chase_target(&grid, &ERRATIC, &player), Vec2::new(1, 5));
        assert_eq!(chase_target(&grid, &BALANCED, &player), Vec2::new(2, 5));
        assert_eq!(chase_target(&grid, &PRECISE, &player), Vec2::new(4, 5));
        assert_eq!(chase_target(&grid, &RELENTLESS, &player), Vec2::new(6, 5));
    }

    #[test]
    fn relentless_always_moves_toward_target() {
        let grid = Grid::standard();
        let player = snapshot(Vec2::new(1, 5), Direction::None);
        let mut rng = Rng::new(3);
        for _ in 0..50 {
            let dir = decide(
                &grid,
                &RELENTLESS,
                &mut rng,
                Vec2::new(6, 5),
                Direction::Down,
                false,
                &player,
            );
            assert_eq!(dir, Some(Direction::Left));
        }
    }

    #[test]
    fn vulnerable_ghost_flees_from_player() {
        let grid = Grid::standard();
        let player = snapshot(Vec2::new(1, 5), Direction::None);
        let mut rng = Rng::new(11);
        let dir = decide(
            &grid,
            &RELENTLESS,
            &mut rng,
            Vec2::new(6, 5),
            Direction::Up,
            true,
            &player,
        );
        assert_eq!(dir, Some(Direction::Right));
    }

    #[test]
    fn decisions_are_reproducible_for_a_seed() {
        let grid = Grid::standard();
        let player = snapshot(Vec2::new(13, 22), Direction::Left);
        let run = |seed: u32| {
            let mut rng = Rng::new(seed);
            let mut current = Direction::Up;
            let mut out = Vec::new();
            for _ in 0..64 {
                let dir = decide(
                    &grid,
                    &ERRATIC,
                    &mut rng,
                    Vec2::new(6, 5),
                    current,
                    false,
                    &player,
                )
                .expect("junction has options");
                out.push(dir);
                current = dir;
            }
            out
        };
        assert_eq!(run(2024), run(2024));
    }

    #[test]
    fn enclosed_tile_yields_no_decision() {
        let grid = Grid::standard();
        let player = snapshot(Vec2::new(1, 5), Direction::None);
        let mut rng = Rng::new(1);
        // (3, 3) is inside a wall block.
        let dir = decide(
            &grid,
            &BALANCED,
            &mut rng,
            Vec2::new(3, 3),
            Direction::Up,
            false,
            &player,
        );
        assert_eq!(dir, None);
    }
}
