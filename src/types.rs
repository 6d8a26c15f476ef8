use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Neighbor enumeration order used by ghost decisions.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" | "w" => Some(Self::Up),
            "down" | "s" => Some(Self::Down),
            "left" | "a" => Some(Self::Left),
            "right" | "d" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostColor {
    Red,
    Pink,
    Cyan,
    Orange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Dead,
    Housed,
    Roaming,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Victory,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PelletCollected { x: i32, y: i32 },
    PowerCollected { x: i32, y: i32 },
    GhostEaten { ghost: usize },
    PlayerDied { lives: u32 },
}

#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    #[serde(rename = "tickRate")]
    pub tick_rate: u32,
    #[serde(rename = "startingLives")]
    pub starting_lives: u32,
    #[serde(rename = "powerDurationMs")]
    pub power_duration_ms: u64,
    pub seed: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GridInit {
    pub width: i32,
    pub height: i32,
    pub tile: i32,
    pub tiles: Vec<String>,
    #[serde(rename = "tunnelRows")]
    pub tunnel_rows: Vec<i32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub facing: Direction,
    pub mouth: f32,
    pub score: u32,
    pub lives: u32,
    pub powered: bool,
    #[serde(rename = "poweredUntil")]
    pub powered_until: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub color: GhostColor,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub mode: GhostMode,
    pub alive: bool,
    pub vulnerable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub paused: bool,
    pub ended: bool,
    pub outcome: Option<GameOutcome>,
    pub config: GameConfig,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub pellets: Vec<(i32, i32)>,
    #[serde(rename = "powerPellets")]
    pub power_pellets: Vec<(i32, i32)>,
    pub events: Vec<GameEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub outcome: Option<GameOutcome>,
    pub ticks: u64,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub score: u32,
    pub lives: u32,
    #[serde(rename = "pelletsLeft")]
    pub pellets_left: usize,
}
