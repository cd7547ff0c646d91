//! Episode state and the Blue/Red phase machine that drives it.
//! This file wires focused battle submodules together.

use rand_chacha::ChaCha8Rng;
use slotmap::SecondaryMap;

use crate::combat::CombatResolver;
use crate::config::BattleConfig;
use crate::controller::Controller;
use crate::error::BattleError;
use crate::map::MapService;
use crate::store::QTableStore;
use crate::types::*;

mod bootstrap;
mod hash;
mod turn;


/// One episode: the unit arena, both rosters, a controller per unit, and the
/// injected map, combat, and table-store collaborators.
pub struct Battle {
    seed: u64,
    config: BattleConfig,
    rng: ChaCha8Rng,
    units: Units,
    blue: Vec<UnitId>,
    red: Vec<UnitId>,
    controllers: SecondaryMap<UnitId, Box<dyn Controller>>,
    map: Box<dyn MapService>,
    combat: Box<dyn CombatResolver>,
    store: Box<dyn QTableStore>,
    phase: Side,
    // Roster snapshot taken when the phase began; dead ids are skipped.
    queue: Vec<UnitId>,
    cursor: usize,
    turn: u32,
    outcome: StepOutcome,
    log: Vec<BattleEvent>,
}

impl Battle {
    /// Steps until one side has won.
    pub fn run_to_end(&mut self) -> Result<StepOutcome, BattleError> {
        loop {
            let outcome = self.step()?;
            if outcome.is_finished() {
                return Ok(outcome);
            }
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn roster(&self, side: Side) -> &[UnitId] {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }

    pub fn map(&self) -> &dyn MapService {
        self.map.as_ref()
    }

    pub fn phase(&self) -> Side {
        self.phase
    }

    /// Completed Blue/Red cycles.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn outcome(&self) -> StepOutcome {
        self.outcome
    }

    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    fn rosters(&self, side: Side) -> (Vec<UnitId>, Vec<UnitId>) {
        (self.roster(side).to_vec(), self.roster(side.opponent()).to_vec())
    }

    fn is_alive(&self, id: UnitId) -> bool {
        self.units.get(id).is_some_and(|unit| !unit.is_defeated())
    }
}
