//! Read-only snapshot of a fighter, as observed by controllers and tools.

use serde::{Deserialize, Serialize};

use crate::fighter::FighterId;
use crate::state::MovableLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterWatch {
    pub fighter: FighterId,
    pub nickname: String,
    pub state: String,
    pub movable: MovableLevel,
    pub position: [f32; 3],
    pub heading: f32,
    pub hp_ratio: f32,
    pub target: Option<FighterId>,
    pub distance_to_target: Option<f32>,
    /// Absolute horizontal angle toward the target
    pub bearing_to_target: Option<f32>,
}

impl FighterWatch {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
