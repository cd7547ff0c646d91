//! Tunable constants for learning, heuristics, rewards, and episode length.
//! Every struct deserializes with per-field defaults so run files only name what they change.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningParams {
    /// Step size toward the update target.
    pub alpha: f64,
    /// Weight on future value; 0 is fully myopic, 1 fully far-sighted.
    pub gamma: f64,
    /// Probability of picking a random feasible action.
    pub epsilon: f64,
    /// Reserved for multi-step updates; the one-step rule ignores it.
    pub trace_depth: u32,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self { alpha: 0.1, gamma: 0.6, epsilon: 0.1, trace_depth: 1 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicParams {
    /// Weight of the opponent's expected output in the combat score.
    pub tau: f64,
    /// Health fraction below which moving away from enemies scores positively.
    pub zeta: f64,
    /// Weight of tile defense times avoid in the movement score.
    pub phi: f64,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self { tau: 0.9, zeta: 0.3, phi: 3.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardParams {
    pub victory: f64,
    pub defeat: f64,
    pub death: f64,
    pub kill: f64,
    pub step: f64,
}

impl Default for RewardParams {
    fn default() -> Self {
        Self { victory: 1.0, defeat: -1.0, death: -1.0, kill: 0.0, step: 0.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Full Blue/Red cycles before Red is awarded the battle.
    pub turn_limit: u32,
    pub table_version: String,
    pub run_name: String,
    pub learning: LearningParams,
    pub heuristics: HeuristicParams,
    pub rewards: RewardParams,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            turn_limit: 100,
            table_version: "5".to_string(),
            run_name: "default".to_string(),
            learning: LearningParams::default(),
            heuristics: HeuristicParams::default(),
            rewards: RewardParams::default(),
        }
    }
}
