//! Per-unit decision makers and the read-only view they decide from.
//! Blue's learning units and Red's scripted units share one capability set;
//! the battle picks an implementation at construction and never inspects which.

use rand_chacha::ChaCha8Rng;

use crate::combat::CombatResolver;
use crate::error::{DecisionError, QTableError};
use crate::map::MapService;
use crate::mask::ActionMask;
use crate::observation::{State, observe};
use crate::store::QTableStore;
use crate::types::{ActionKind, DecisionMode, Pos, UnitId, Units};
use crate::unit::Unit;

mod learning;
mod scripted;

pub use learning::LearningController;
pub use scripted::ScriptedController;

/// Everything a controller may read while deciding for `unit`.
#[derive(Clone, Copy)]
pub struct DecisionContext<'a> {
    pub units: &'a Units,
    pub map: &'a dyn MapService,
    pub combat: &'a dyn CombatResolver,
    pub unit: UnitId,
    pub allies: &'a [UnitId],
    pub enemies: &'a [UnitId],
}

impl<'a> DecisionContext<'a> {
    pub fn me(&self) -> &'a Unit {
        &self.units[self.unit]
    }

    pub fn observe(&self) -> State {
        observe(self.map, self.units, self.unit, self.allies, self.enemies)
    }

    pub fn mask(&self) -> ActionMask {
        ActionMask::compute(self.map, self.units, self.unit, self.allies, self.enemies)
    }

    pub fn legal_destinations(&self) -> Vec<Pos> {
        self.map.legal_destinations(self.units, self.unit, self.allies, self.enemies)
    }

    /// Enemies in range of the unit's current tile.
    pub fn attackable_here(&self) -> Vec<UnitId> {
        self.map.attackable_units(self.units, self.unit, self.enemies, self.me().pos)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionChoice {
    pub kind: ActionKind,
    pub mode: DecisionMode,
}

pub trait Controller {
    fn decide_action(&mut self, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> ActionChoice;

    /// Tile to move to before carrying out `kind`.
    fn decide_move(
        &mut self,
        kind: ActionKind,
        ctx: &DecisionContext<'_>,
        rng: &mut ChaCha8Rng,
    ) -> Result<Pos, DecisionError>;

    /// Enemy to attack from the unit's current tile.
    fn decide_target(
        &mut self,
        ctx: &DecisionContext<'_>,
        rng: &mut ChaCha8Rng,
    ) -> Result<UnitId, DecisionError>;

    /// Inventory slot of the consumable to use.
    fn decide_item(
        &mut self,
        ctx: &DecisionContext<'_>,
        rng: &mut ChaCha8Rng,
    ) -> Result<usize, DecisionError>;

    /// Feedback for the action just applied; `ctx` reflects the state after it.
    fn learn(&mut self, _ctx: &DecisionContext<'_>, _reward: f64) {}

    /// Final hook before the unit is discarded. A pending reward is credited
    /// to the last decision before anything is persisted.
    fn dispose(
        &mut self,
        terminal_reward: Option<f64>,
        store: &mut dyn QTableStore,
    ) -> Result<(), QTableError>;

    fn is_learning(&self) -> bool {
        false
    }
}
