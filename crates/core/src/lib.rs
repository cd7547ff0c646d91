pub mod action;
pub mod battle;
pub mod combat;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod heuristics;
pub mod map;
pub mod mask;
pub mod observation;
pub mod policy;
pub mod random;
pub mod scenario;
pub mod store;
pub mod types;
pub mod unit;

#[cfg(test)]
mod test_support;

pub use action::{Action, ActionPayload};
pub use battle::Battle;
pub use combat::{CombatResolver, CombatSummary, FormulaCombat, ParticipantSummary};
pub use config::{BattleConfig, HeuristicParams, LearningParams, RewardParams};
pub use controller::{
    ActionChoice, Controller, DecisionContext, LearningController, ScriptedController,
};
pub use error::*;
pub use map::{GridMap, MapService, Terrain, TileStats};
pub use mask::ActionMask;
pub use observation::State;
pub use policy::{QLearner, QTable};
pub use scenario::{Scenario, UnitTemplate};
pub use store::{FileQTableStore, MemoryQTableStore, QTableKey, QTableStore};
pub use types::*;
pub use unit::{Stats, Unit};
