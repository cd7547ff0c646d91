//! Shared fixtures for unit tests across the crate.
//! This module exists to avoid repeating unit and resolver setup in every test module.
//! It does not own production gameplay logic.

use rand_chacha::ChaCha8Rng;

use crate::combat::{CombatResolver, CombatSummary, ParticipantSummary};
use crate::content::{MovementClass, construct_inventory};
use crate::map::MapService;
use crate::types::{CombatResult, Pos, Side, UnitId, Units};
use crate::unit::{Stats, Unit};

pub(crate) fn stats(max_hp: i32) -> Stats {
    Stats {
        max_hp,
        strength: 5,
        magic: 0,
        skill: 5,
        speed: 5,
        luck: 0,
        defense: 0,
        resistance: 0,
    }
}

pub(crate) fn unit_with(max_hp: i32, items: &[u16]) -> Unit {
    Unit {
        id: UnitId::default(),
        character_code: 0,
        name: "Fixture".to_string(),
        job: "Mercenary",
        side: Side::Blue,
        pos: Pos::new(0, 0),
        stats: stats(max_hp),
        hp: max_hp,
        movement: 5,
        movement_class: MovementClass::Infantry,
        inventory: construct_inventory(items).expect("fixture items should exist"),
        terminal: false,
    }
}

pub(crate) fn roster_units() -> Units {
    Units::with_key()
}

pub(crate) fn place(units: &mut Units, side: Side, pos: Pos, items: &[u16]) -> UnitId {
    let mut unit = unit_with(20, items);
    unit.side = side;
    unit.pos = pos;
    let id = units.insert(unit);
    units[id].id = id;
    id
}

/// Resolver with scripted forecasts and a scripted exchange result.
pub(crate) struct FixedCombat {
    pub favoured: Option<UnitId>,
    pub outcome: CombatResult,
}

impl FixedCombat {
    pub(crate) fn favouring(target: UnitId) -> Self {
        Self { favoured: Some(target), outcome: CombatResult::NoDeath }
    }

    pub(crate) fn always(outcome: CombatResult) -> Self {
        Self { favoured: None, outcome }
    }
}

impl CombatResolver for FixedCombat {
    fn summary_at(
        &self,
        _attacker: &Unit,
        _from: Pos,
        defender: &Unit,
        _map: &dyn MapService,
    ) -> CombatSummary {
        let might = if self.favoured == Some(defender.id) { 10 } else { 1 };
        CombatSummary {
            attacker: ParticipantSummary {
                hit_chance: 1.0,
                might,
                crit_chance: 0.0,
                doubling: false,
                can_strike: true,
            },
            defender: ParticipantSummary {
                hit_chance: 0.5,
                might: 1,
                crit_chance: 0.0,
                doubling: false,
                can_strike: true,
            },
        }
    }

    fn simulate(
        &self,
        _summary: &CombatSummary,
        attacker: &mut Unit,
        defender: &mut Unit,
        _rng: &mut ChaCha8Rng,
    ) -> CombatResult {
        match self.outcome {
            CombatResult::DefenderDeath => defender.take_damage(defender.hp),
            CombatResult::AttackerDeath => attacker.take_damage(attacker.hp),
            CombatResult::NoDeath => {}
        }
        self.outcome
    }
}
