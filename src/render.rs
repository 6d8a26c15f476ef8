//! Plain-text frame renderer. One character per tile, HUD above the maze, status line below.

use crate::constants::tile_index;
use crate::types::{Direction, GameOutcome, GhostMode, GridInit, Snapshot};

const WALL: char = '#';
const PELLET: char = '.';
const POWER: char = 'o';
const GHOST: char = 'M';
const FRIGHTENED: char = 'W';

fn player_glyph(facing: Direction, mouth: f32) -> char {
    if mouth < 0.25 {
        return 'O';
    }
    match facing {
        Direction::Left => '>',
        Direction::Up => 'v',
        Direction::Down => '^',
        Direction::Right | Direction::None => '<',
    }
}

pub fn hud_line(snapshot: &Snapshot) -> String {
    let pellets = snapshot.pellets.len() + snapshot.power_pellets.len();
    let mut hud = format!(
        "Score: {}  Lives: {}  Pellets: {}",
        snapshot.player.score, snapshot.player.lives, pellets
    );
    if snapshot.player.powered {
        let left_ms = snapshot.player.powered_until.saturating_sub(snapshot.now_ms);
        hud.push_str(&format!("  Power: {:.1}s", left_ms as f32 / 1000.0));
    }
    hud
}

/// Bottom line: ending banner, pause notice, or controls.
pub fn status_line(snapshot: &Snapshot) -> String {
    match snapshot.outcome {
        Some(GameOutcome::Victory) => {
            format!("YOU WIN!  Final score: {}  (q to quit)", snapshot.player.score)
        }
        Some(GameOutcome::Defeat) => {
            format!("GAME OVER  Final score: {}  (q to quit)", snapshot.player.score)
        }
        None if snapshot.paused => "PAUSED  (p to resume)".to_string(),
        None => "w/a/s/d move  p pause  q quit".to_string(),
    }
}

pub fn render_frame(init: &GridInit, snapshot: &Snapshot) -> String {
    let width = init.width.max(0) as usize;
    let height = init.height.max(0) as usize;
    let mut cells: Vec<Vec<char>> = init
        .tiles
        .iter()
        .take(height)
        .map(|row| {
            let mut chars: Vec<char> = row
                .chars()
                .map(|ch| if ch == WALL { WALL } else { ' ' })
                .collect();
            chars.resize(width, ' ');
            chars
        })
        .collect();
    cells.resize(height, vec![' '; width]);

    let mut put = |x: i32, y: i32, glyph: char| {
        if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
            return;
        }
        cells[y as usize][x as usize] = glyph;
    };

    for &(x, y) in &snapshot.pellets {
        put(x, y, PELLET);
    }
    for &(x, y) in &snapshot.power_pellets {
        put(x, y, POWER);
    }

    // Hostile ghosts are drawn last so they win a shared tile.
    for frightened in [true, false] {
        for ghost in &snapshot.ghosts {
            if ghost.mode == GhostMode::Dead || ghost.vulnerable != frightened {
                continue;
            }
            let glyph = if frightened { FRIGHTENED } else { GHOST };
            put(tile_index(ghost.x), tile_index(ghost.y), glyph);
        }
    }

    let player = &snapshot.player;
    put(
        tile_index(player.x),
        tile_index(player.y),
        player_glyph(player.facing, player.mouth),
    );

    let mut out = String::with_capacity((width + 1) * (height + 2));
    out.push_str(&hud_line(snapshot));
    out.push('\n');
    for row in &cells {
        out.extend(row.iter());
        out.push('\n');
    }
    out.push_str(&status_line(snapshot));
    out.push('\n');
    out
}
