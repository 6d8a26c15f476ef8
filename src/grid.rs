use std::collections::BTreeSet;

use crate::constants::{
    tile_center_px, BACKFILL_PELLET_CHANCE, BACKFILL_SEED, GRID_H, GRID_W, MAX_GHOSTS, TILE,
};
use crate::rng::Rng;
use crate::types::{GridInit, PointF, Vec2};

/// `#` wall, `.` pellet, `o` power, `G` ghost start, `P` player start; anything else is corridor.
pub const LAYOUT: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "     #.##### ## #####.#     ",
    "     #.##          ##.#     ",
    "     #.## ###--### ##.#     ",
    "######.## #      # ##.######",
    "      .   # G  G #   .      ",
    "######.## #      # ##.######",
    "     #.## ######## ##.#     ",
    "     #.##          ##.#     ",
    "     #.## ######## ##.#     ",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P........##..o#",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
    "                            ",
    "                            ",
];

const GHOST_START_OFFSETS: [(i32, i32); 9] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
    (0, 0),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub wall: bool,
    pub pellet: bool,
    pub power: bool,
}

#[derive(Clone, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
    tunnel_rows: Vec<bool>,
    pub ghost_starts: Vec<Vec2>,
    pub player_start: Vec2,
}

impl Grid {
    pub fn standard() -> Self {
        Self::from_layout(&LAYOUT)
    }

    pub fn from_layout(rows: &[&str]) -> Self {
        let width = GRID_W;
        let height = GRID_H;
        let mut tiles = vec![Tile::default(); (width * height) as usize];
        let mut ghost_starts = Vec::new();
        let mut player_start = None;

        for y in 0..height {
            let row: Vec<char> = rows
                .get(y as usize)
                .map(|row| row.chars().collect())
                .unwrap_or_default();
            for x in 0..width {
                let ch = row.get(x as usize).copied().unwrap_or(' ');
                let tile = &mut tiles[(y * width + x) as usize];
                match ch {
                    '#' => tile.wall = true,
                    '.' => tile.pellet = true,
                    'o' => tile.power = true,
                    'G' => ghost_starts.push(Vec2::new(x, y)),
                    'P' => player_start = Some(Vec2::new(x, y)),
                    _ => {}
                }
                if y >= height - 2 {
                    *tile = Tile {
                        wall: true,
                        pellet: false,
                        power: false,
                    };
                }
            }
        }

        let mut grid = Self {
            width,
            height,
            tiles,
            tunnel_rows: vec![false; height as usize],
            ghost_starts,
            player_start: Vec2::new(width / 2, height - 5),
        };
        grid.detect_tunnel_rows();
        grid.ensure_ghost_starts();
        grid.player_start = match player_start {
            Some(start) => start,
            None => grid
                .nearest_open(Vec2::new(width / 2, height - 5))
                .unwrap_or(Vec2::new(1, 1)),
        };
        if grid.remaining_collectibles() == 0 {
            grid.backfill_collectibles();
        }
        grid
    }

    pub fn in_bounds(&self, tx: i32, ty: i32) -> bool {
        tx >= 0 && ty >= 0 && tx < self.width && ty < self.height
    }

    fn tile(&self, tx: i32, ty: i32) -> Option<&Tile> {
        if !self.in_bounds(tx, ty) {
            return None;
        }
        self.tiles.get((ty * self.width + tx) as usize)
    }

    fn tile_mut(&mut self, tx: i32, ty: i32) -> Option<&mut Tile> {
        if !self.in_bounds(tx, ty) {
            return None;
        }
        self.tiles.get_mut((ty * self.width + tx) as usize)
    }

    /// Out-of-bounds tiles count as walls.
    pub fn is_wall(&self, tx: i32, ty: i32) -> bool {
        self.tile(tx, ty).map(|tile| tile.wall).unwrap_or(true)
    }

    /// Like `is_wall`, except a horizontal exit off a tunnel row is open.
    pub fn blocks(&self, tx: i32, ty: i32) -> bool {
        if ty >= 0 && ty < self.height && (tx < 0 || tx >= self.width) {
            return !self.is_tunnel_row(ty);
        }
        self.is_wall(tx, ty)
    }

    pub fn is_tunnel_row(&self, ty: i32) -> bool {
        ty >= 0 && (ty as usize) < self.tunnel_rows.len() && self.tunnel_rows[ty as usize]
    }

    pub fn tile_center(&self, tx: i32, ty: i32) -> PointF {
        PointF {
            x: tile_center_px(tx),
            y: tile_center_px(ty),
        }
    }

    pub fn has_pellet(&self, tx: i32, ty: i32) -> bool {
        self.tile(tx, ty).map(|tile| tile.pellet).unwrap_or(false)
    }

    pub fn has_power(&self, tx: i32, ty: i32) -> bool {
        self.tile(tx, ty).map(|tile| tile.power).unwrap_or(false)
    }

    pub fn take_pellet(&mut self, tx: i32, ty: i32) -> bool {
        match self.tile_mut(tx, ty) {
            Some(tile) if tile.pellet => {
                tile.pellet = false;
                true
            }
            _ => false,
        }
    }

    pub fn take_power(&mut self, tx: i32, ty: i32) -> bool {
        match self.tile_mut(tx, ty) {
            Some(tile) if tile.power => {
                tile.power = false;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_tile(&mut self, tx: i32, ty: i32, tile: Tile) {
        if let Some(slot) = self.tile_mut(tx, ty) {
            *slot = tile;
        }
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| tile.pellet || tile.power)
            .count()
    }

    pub fn pellet_cells(&self) -> Vec<(i32, i32)> {
        self.cells_where(|tile| tile.pellet)
    }

    pub fn power_cells(&self) -> Vec<(i32, i32)> {
        self.cells_where(|tile| tile.power)
    }

    pub fn collectible_cells(&self) -> BTreeSet<(i32, i32)> {
        self.cells_where(|tile| tile.pellet || tile.power)
            .into_iter()
            .collect()
    }

    fn cells_where(&self, predicate: impl Fn(&Tile) -> bool) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.tile(x, y).map(&predicate).unwrap_or(false) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    pub fn to_init(&self) -> GridInit {
        let tiles = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| if self.is_wall(x, y) { '#' } else { ' ' })
                    .collect::<String>()
            })
            .collect();
        GridInit {
            width: self.width,
            height: self.height,
            tile: TILE,
            tiles,
            tunnel_rows: (0..self.height).filter(|&y| self.is_tunnel_row(y)).collect(),
        }
    }

    fn detect_tunnel_rows(&mut self) {
        for y in 0..self.height {
            if y >= self.height - 2 {
                continue;
            }
            let left_open = !self.is_wall(0, y) && !self.is_wall(1, y);
            let right_open =
                !self.is_wall(self.width - 1, y) && !self.is_wall(self.width - 2, y);
            self.tunnel_rows[y as usize] = left_open && right_open;
        }
    }

    fn ensure_ghost_starts(&mut self) {
        if self.ghost_starts.len() >= MAX_GHOSTS {
            return;
        }
        let center = Vec2::new(self.width / 2, self.height / 2);
        for (dx, dy) in GHOST_START_OFFSETS {
            let candidate = Vec2::new(center.x + dx, center.y + dy);
            if !self.in_bounds(candidate.x, candidate.y) || self.is_wall(candidate.x, candidate.y)
            {
                continue;
            }
            if !self.ghost_starts.contains(&candidate) {
                self.ghost_starts.push(candidate);
            }
            if self.ghost_starts.len() >= MAX_GHOSTS {
                break;
            }
        }
    }

    fn nearest_open(&self, origin: Vec2) -> Option<Vec2> {
        let mut best: Option<(i32, Vec2)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_wall(x, y) {
                    continue;
                }
                let dist = (x - origin.x).abs() + (y - origin.y).abs();
                if best.map(|(d, _)| dist < d).unwrap_or(true) {
                    best = Some((dist, Vec2::new(x, y)));
                }
            }
        }
        best.map(|(_, cell)| cell)
    }

    fn backfill_collectibles(&mut self) {
        let mut rng = Rng::new(BACKFILL_SEED);
        for y in 0..self.height {
            for x in 0..self.width {
                let roll = rng.bool(BACKFILL_PELLET_CHANCE);
                if let Some(tile) = self.tile_mut(x, y) {
                    if !tile.wall && roll {
                        tile.pellet = true;
                    }
                }
            }
        }

        let corners = [
            Vec2::new(1, 1),
            Vec2::new(self.width - 2, 1),
            Vec2::new(1, self.height - 3),
            Vec2::new(self.width - 2, self.height - 3),
        ];
        for corner in corners {
            if let Some(cell) = self.nearest_open(corner) {
                if let Some(tile) = self.tile_mut(cell.x, cell.y) {
                    tile.pellet = false;
                    tile.power = true;
                }
            }
        }
    }
}
