//! Reduction of a unit's situation to the discrete learning state.

use serde::{Deserialize, Serialize};

use crate::map::MapService;
use crate::types::{UnitId, Units};

/// Slots per state dimension in the value table.
pub const STATE_SLOTS: usize = 10;

/// `(threats, health_bucket)` as seen by one unit at decision time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    /// Distinct enemies able to strike this unit this turn.
    pub threats: usize,
    /// Health decile, clamped to `[0, 9]`.
    pub health_bucket: usize,
}

impl State {
    pub fn new(threats: usize, health_bucket: usize) -> Self {
        Self { threats, health_bucket }
    }
}

/// `floor(hp / max_hp * 10)`, with full health folded into the top bucket.
pub fn health_bucket(hp: i32, max_hp: i32) -> usize {
    if max_hp <= 0 {
        return 0;
    }
    let bucket = (i64::from(hp.max(0)) * 10) / i64::from(max_hp);
    (bucket as usize).min(STATE_SLOTS - 1)
}

/// Counts each enemy at most once if any of its legal destinations puts `unit` in its range.
pub fn threat_count(
    map: &dyn MapService,
    units: &Units,
    unit: UnitId,
    allies: &[UnitId],
    enemies: &[UnitId],
) -> usize {
    let target = [unit];
    enemies
        .iter()
        .filter(|enemy| {
            map.legal_destinations(units, **enemy, enemies, allies)
                .into_iter()
                .any(|from| !map.attackable_units(units, **enemy, &target, from).is_empty())
        })
        .count()
}

pub fn observe(
    map: &dyn MapService,
    units: &Units,
    unit: UnitId,
    allies: &[UnitId],
    enemies: &[UnitId],
) -> State {
    let me = &units[unit];
    State {
        threats: threat_count(map, units, unit, allies, enemies),
        health_bucket: health_bucket(me.hp, me.stats.max_hp),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::content::keys;
    use crate::map::GridMap;
    use crate::test_support::{place, roster_units};
    use crate::types::{Pos, Side};

    #[test]
    fn full_health_folds_into_bucket_nine() {
        assert_eq!(health_bucket(20, 20), 9);
        assert_eq!(health_bucket(19, 20), 9);
        assert_eq!(health_bucket(18, 20), 9);
        assert_eq!(health_bucket(17, 20), 8);
        assert_eq!(health_bucket(0, 20), 0);
        assert_eq!(health_bucket(1, 20), 0);
    }

    proptest! {
        #[test]
        fn bucket_is_floored_decile_clamped_to_nine(max_hp in 1i32..200, numerator in 0u32..=1000) {
            let hp = ((numerator as i64 * max_hp as i64) / 1000) as i32;
            let expected = ((hp as f64 / max_hp as f64) * 10.0).floor() as usize;
            let bucket = health_bucket(hp, max_hp);
            prop_assert!(bucket <= 9);
            // Float floor can land one below an exact integer; the integer form never does.
            prop_assert!(bucket == expected.min(9) || bucket == (expected + 1).min(9));
            if hp == max_hp {
                prop_assert_eq!(bucket, 9);
            }
        }
    }

    #[test]
    fn each_enemy_counts_once_regardless_of_how_many_tiles_threaten() {
        let map = GridMap::open(12, 12);
        let mut units = roster_units();
        let me = place(&mut units, Side::Blue, Pos::new(5, 5), &[keys::ITEM_IRON_SWORD]);
        let close = place(&mut units, Side::Red, Pos::new(7, 5), &[keys::ITEM_IRON_AXE]);
        let archer = place(&mut units, Side::Red, Pos::new(5, 8), &[keys::ITEM_IRON_BOW]);
        let distant = place(&mut units, Side::Red, Pos::new(0, 11), &[keys::ITEM_IRON_AXE]);
        for id in [close, archer, distant] {
            units[id].movement = 3;
        }

        let state = observe(&map, &units, me, &[me], &[close, archer, distant]);
        assert_eq!(state.threats, 2);
        assert_eq!(state.health_bucket, 9);
    }

    #[test]
    fn unarmed_enemies_are_not_threats() {
        let map = GridMap::open(6, 6);
        let mut units = roster_units();
        let me = place(&mut units, Side::Blue, Pos::new(2, 2), &[keys::ITEM_IRON_SWORD]);
        let healer = place(&mut units, Side::Red, Pos::new(3, 2), &[keys::ITEM_VULNERARY]);

        assert_eq!(threat_count(&map, &units, me, &[me], &[healer]), 0);
    }
}
