use serde::Serialize;

use crate::types::GhostColor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Relentless,
    Balanced,
    Precise,
    Erratic,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DifficultyProfile {
    pub kind: ProfileKind,
    #[serde(rename = "baseSpeed")]
    pub base_speed: f32,
    #[serde(rename = "vulnerableSpeed")]
    pub vulnerable_speed: f32,
    #[serde(rename = "chaseBias")]
    pub chase_bias: f32,
    #[serde(rename = "randomTurnChance")]
    pub random_turn_chance: f32,
    #[serde(rename = "predictionTiles")]
    pub prediction_tiles: i32,
}

pub const RELENTLESS: DifficultyProfile = DifficultyProfile {
    kind: ProfileKind::Relentless,
    base_speed: 120.0,
    vulnerable_speed: 60.0,
    chase_bias: 1.0,
    random_turn_chance: 0.0,
    prediction_tiles: 6,
};

pub const BALANCED: DifficultyProfile = DifficultyProfile {
    kind: ProfileKind::Balanced,
    base_speed: 85.0,
    vulnerable_speed: 50.0,
    chase_bias: 0.70,
    random_turn_chance: 0.08,
    prediction_tiles: 1,
};

pub const PRECISE: DifficultyProfile = DifficultyProfile {
    kind: ProfileKind::Precise,
    base_speed: 98.0,
    vulnerable_speed: 55.0,
    chase_bias: 0.90,
    random_turn_chance: 0.01,
    prediction_tiles: 3,
};

pub const ERRATIC: DifficultyProfile = DifficultyProfile {
    kind: ProfileKind::Erratic,
    base_speed: 70.0,
    vulnerable_speed: 45.0,
    chase_bias: 0.35,
    random_turn_chance: 0.20,
    prediction_tiles: 0,
};

pub fn profile_for_index(index: usize) -> DifficultyProfile {
    match index % 4 {
        0 => RELENTLESS,
        1 => BALANCED,
        2 => PRECISE,
        _ => ERRATIC,
    }
}

pub fn color_for_index(index: usize) -> GhostColor {
    match index % 4 {
        0 => GhostColor::Red,
        1 => GhostColor::Pink,
        2 => GhostColor::Cyan,
        _ => GhostColor::Orange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_rotate_by_spawn_index() {
        assert_eq!(profile_for_index(0).kind, ProfileKind::Relentless);
        assert_eq!(profile_for_index(1).kind, ProfileKind::Balanced);
        assert_eq!(profile_for_index(2).kind, ProfileKind::Precise);
        assert_eq!(profile_for_index(3).kind, ProfileKind::Erratic);
        assert_eq!(profile_for_index(4).kind, ProfileKind::Relentless);
        assert_eq!(color_for_index(5), GhostColor::Pink);
    }

    #[test]
    fn probabilities_are_in_unit_range() {
        for profile in [RELENTLESS, BALANCED, PRECISE, ERRATIC] {
            assert!((0.0..=1.0).contains(&profile.chase_bias));
            assert!((0.0..=1.0).contains(&profile.random_turn_chance));
            assert!(profile.prediction_tiles >= 0);
            assert!(profile.vulnerable_speed < profile.base_speed);
        }
    }

    #[test]
    fn relentless_predicts_deepest() {
        let deepest = [RELENTLESS, BALANCED, PRECISE, ERRATIC]
            .into_iter()
            .max_by_key(|profile| profile.prediction_tiles)
            .map(|profile| profile.kind);
        assert_eq!(deepest, Some(ProfileKind::Relentless));
    }
}
