//! Combat forecasts and exchange resolution.
//! The decision heuristics read forecasts; the battle applies exchanges.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::content::ItemKind;
use crate::map::{MapService, manhattan};
use crate::random::unit_interval;
use crate::types::{CombatResult, Pos};
use crate::unit::Unit;

/// One side's forecast for a single exchange.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticipantSummary {
    /// Probability in `[0, 1]` that one strike connects.
    pub hit_chance: f64,
    /// Damage one connecting, non-critical strike deals.
    pub might: i32,
    /// Probability in `[0, 1]` that a connecting strike is critical.
    pub crit_chance: f64,
    pub doubling: bool,
    /// Whether this side has a weapon reaching the opponent at all.
    pub can_strike: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatSummary {
    pub attacker: ParticipantSummary,
    pub defender: ParticipantSummary,
}

pub trait CombatResolver {
    /// Forecast with the attacker standing on `from` instead of its current tile.
    fn summary_at(
        &self,
        attacker: &Unit,
        from: Pos,
        defender: &Unit,
        map: &dyn MapService,
    ) -> CombatSummary;

    fn summary(&self, attacker: &Unit, defender: &Unit, map: &dyn MapService) -> CombatSummary {
        self.summary_at(attacker, attacker.pos, defender, map)
    }

    /// Plays out the exchange described by `summary`, applying damage to both units.
    fn simulate(
        &self,
        summary: &CombatSummary,
        attacker: &mut Unit,
        defender: &mut Unit,
        rng: &mut ChaCha8Rng,
    ) -> CombatResult;
}

/// Speed lead needed for a follow-up strike.
pub const DOUBLING_THRESHOLD: i32 = 4;
pub const CRIT_MULTIPLIER: i32 = 3;

/// Stat-formula resolver: weapon might plus strength (or magic for tomes)
/// against defense (or resistance) and the defender's tile.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormulaCombat;

impl FormulaCombat {
    fn forecast(
        striker: &Unit,
        striker_tile: Pos,
        target: &Unit,
        target_tile: Pos,
        map: &dyn MapService,
    ) -> ParticipantSummary {
        let distance = manhattan(striker_tile, target_tile);
        let Some(weapon) = striker.equipped_weapon() else {
            return ParticipantSummary::default();
        };
        if !striker.can_reach(distance) {
            return ParticipantSummary::default();
        }
        let terrain = map.tile_at(target_tile);

        let (power, mitigation) = match weapon.kind {
            ItemKind::Tome => (striker.stats.magic, target.stats.resistance),
            _ => (striker.stats.strength, target.stats.defense),
        };
        let might = (power + weapon.might - mitigation - terrain.defense).max(0);

        let accuracy = weapon.hit + striker.stats.skill * 2 + striker.stats.luck / 2;
        let avoid = target.stats.speed * 2 + target.stats.luck + terrain.avoid;
        let hit = (accuracy - avoid).clamp(0, 100);
        let crit = (weapon.crit + striker.stats.skill / 2 - target.stats.luck).clamp(0, 100);

        ParticipantSummary {
            hit_chance: f64::from(hit) / 100.0,
            might,
            crit_chance: f64::from(crit) / 100.0,
            doubling: striker.stats.speed - target.stats.speed >= DOUBLING_THRESHOLD,
            can_strike: true,
        }
    }

    /// Returns `true` when the strike leaves the target defeated.
    fn strike(
        forecast: &ParticipantSummary,
        target: &mut Unit,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        if unit_interval(rng) < forecast.hit_chance {
            let critical = unit_interval(rng) < forecast.crit_chance;
            let damage = if critical { forecast.might * CRIT_MULTIPLIER } else { forecast.might };
            target.take_damage(damage);
        }
        target.is_defeated()
    }
}

impl CombatResolver for FormulaCombat {
    fn summary_at(
        &self,
        attacker: &Unit,
        from: Pos,
        defender: &Unit,
        map: &dyn MapService,
    ) -> CombatSummary {
        CombatSummary {
            attacker: Self::forecast(attacker, from, defender, defender.pos, map),
            defender: Self::forecast(defender, defender.pos, attacker, from, map),
        }
    }

    fn simulate(
        &self,
        summary: &CombatSummary,
        attacker: &mut Unit,
        defender: &mut Unit,
        rng: &mut ChaCha8Rng,
    ) -> CombatResult {
        let (offense, counter) = (&summary.attacker, &summary.defender);

        if offense.can_strike && Self::strike(offense, defender, rng) {
            return CombatResult::DefenderDeath;
        }
        if counter.can_strike && Self::strike(counter, attacker, rng) {
            return CombatResult::AttackerDeath;
        }
        if offense.can_strike && offense.doubling && Self::strike(offense, defender, rng) {
            return CombatResult::DefenderDeath;
        }
        if counter.can_strike && counter.doubling && Self::strike(counter, attacker, rng) {
            return CombatResult::AttackerDeath;
        }
        CombatResult::NoDeath
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::content::{construct_inventory, keys};
    use crate::map::{GridMap, Terrain};
    use crate::test_support::unit_with;

    fn duel() -> (Unit, Unit) {
        let mut attacker = unit_with(20, &[keys::ITEM_IRON_SWORD]);
        attacker.pos = Pos::new(1, 1);
        attacker.stats.strength = 6;
        attacker.stats.skill = 8;
        attacker.stats.speed = 10;
        attacker.stats.luck = 6;

        let mut defender = unit_with(21, &[keys::ITEM_IRON_AXE]);
        defender.pos = Pos::new(2, 1);
        defender.stats.strength = 4;
        defender.stats.skill = 1;
        defender.stats.speed = 4;
        defender.stats.defense = 3;
        (attacker, defender)
    }

    #[test]
    fn forecast_accounts_for_stats_terrain_and_speed() {
        let mut map = GridMap::open(4, 4);
        map.set_terrain(Pos::new(2, 1), Terrain::Forest);
        let (attacker, defender) = duel();

        let summary = FormulaCombat.summary(&attacker, &defender, &map);
        // 6 str + 5 might - 3 def - 1 forest
        assert_eq!(summary.attacker.might, 7);
        // 90 + 16 + 3 - (8 + 0 + 20)
        assert_eq!(summary.attacker.hit_chance, 0.81);
        assert_eq!(summary.attacker.crit_chance, 0.04);
        assert!(summary.attacker.doubling);
        assert!(summary.attacker.can_strike);

        assert_eq!(summary.defender.might, 4 + 8);
        assert!(!summary.defender.doubling);
    }

    #[test]
    fn out_of_range_defender_cannot_counter() {
        let map = GridMap::open(6, 6);
        let (mut attacker, defender) = duel();
        attacker.inventory = construct_inventory(&[keys::ITEM_IRON_BOW]).unwrap();

        let summary = FormulaCombat.summary_at(&attacker, Pos::new(0, 1), &defender, &map);
        assert!(summary.attacker.can_strike);
        assert!(!summary.defender.can_strike);
        assert_eq!(summary.defender.might, 0);
        assert_eq!(summary.defender.hit_chance, 0.0);
        assert_eq!(summary.defender.crit_chance, 0.0);
        assert!(!summary.defender.doubling);
    }

    #[test]
    fn certain_lethal_strike_kills_before_any_counter() {
        let (mut attacker, mut defender) = duel();
        let summary = CombatSummary {
            attacker: ParticipantSummary {
                hit_chance: 1.0,
                might: 50,
                crit_chance: 0.0,
                doubling: false,
                can_strike: true,
            },
            defender: ParticipantSummary {
                hit_chance: 1.0,
                might: 50,
                crit_chance: 0.0,
                doubling: false,
                can_strike: true,
            },
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = FormulaCombat.simulate(&summary, &mut attacker, &mut defender, &mut rng);
        assert_eq!(result, CombatResult::DefenderDeath);
        assert_eq!(attacker.hp, attacker.stats.max_hp);
        assert_eq!(defender.hp, 0);
    }

    #[test]
    fn missed_exchange_leaves_both_standing() {
        let (mut attacker, mut defender) = duel();
        let summary = CombatSummary::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = FormulaCombat.simulate(&summary, &mut attacker, &mut defender, &mut rng);
        assert_eq!(result, CombatResult::NoDeath);
        assert_eq!(defender.hp, defender.stats.max_hp);
    }
}
