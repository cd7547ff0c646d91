//! Battle construction from a scenario.
//! This module exists to isolate roster setup and table loading from turn flow.
//! It does not own activation or episode termination.

use rand_chacha::rand_core::SeedableRng;

use super::*;
use crate::combat::FormulaCombat;
use crate::controller::{LearningController, ScriptedController};
use crate::error::ScenarioError;
use crate::scenario::Scenario;
use crate::store::QTableKey;

impl Battle {
    /// Builds every unit, and loads a value table for each Blue unit that learns.
    pub fn new(
        scenario: &Scenario,
        config: BattleConfig,
        map: Box<dyn MapService>,
        combat: Box<dyn CombatResolver>,
        store: Box<dyn QTableStore>,
        seed: u64,
    ) -> Result<Self, BattleError> {
        if config.turn_limit == 0 {
            return Err(ScenarioError::ZeroTurnLimit.into());
        }
        let mut units = Units::with_key();
        let mut rosters = (Vec::new(), Vec::new());
        let mut controllers: SecondaryMap<UnitId, Box<dyn Controller>> = SecondaryMap::new();

        for side in [Side::Blue, Side::Red] {
            let templates = scenario.roster(side);
            if templates.is_empty() {
                return Err(ScenarioError::EmptyRoster(side).into());
            }
            for template in templates {
                let unit = template.build(side)?;
                let id = units.insert(unit);
                units[id].id = id;

                let controller: Box<dyn Controller> = if side == Side::Blue && template.learning {
                    let key = QTableKey {
                        unit_name: template.name.clone(),
                        version: config.table_version.clone(),
                        run_name: config.run_name.clone(),
                        alpha: config.learning.alpha,
                        gamma: config.learning.gamma,
                    };
                    Box::new(LearningController::load(
                        key,
                        config.learning.clone(),
                        config.heuristics.clone(),
                        store.as_ref(),
                    )?)
                } else {
                    Box::new(ScriptedController)
                };
                controllers.insert(id, controller);

                match side {
                    Side::Blue => rosters.0.push(id),
                    Side::Red => rosters.1.push(id),
                }
            }
        }

        let (blue, red) = rosters;
        let mut battle = Self {
            seed,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            units,
            blue,
            red,
            controllers,
            map,
            combat,
            store,
            phase: Side::Blue,
            queue: Vec::new(),
            cursor: 0,
            turn: 0,
            outcome: StepOutcome::Continue,
            log: Vec::new(),
        };
        battle.begin_phase();
        Ok(battle)
    }

    /// Builds the scenario's own grid map and pairs it with [`FormulaCombat`].
    pub fn from_scenario(
        scenario: &Scenario,
        config: BattleConfig,
        store: Box<dyn QTableStore>,
        seed: u64,
    ) -> Result<Self, BattleError> {
        let map = scenario.grid_map()?;
        Self::new(scenario, config, Box::new(map), Box::new(FormulaCombat), store, seed)
    }
}
