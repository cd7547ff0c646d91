//! Per-decision feasibility of the three abstract actions.

use crate::map::MapService;
use crate::types::{ActionKind, UnitId, Units};

/// Which abstract actions are currently infeasible. Wait is always feasible,
/// so only Item and Attack carry a flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ActionMask {
    pub item: bool,
    pub attack: bool,
}

impl ActionMask {
    pub fn new(item_masked: bool, attack_masked: bool) -> Self {
        Self { item: item_masked, attack: attack_masked }
    }

    pub fn compute(
        map: &dyn MapService,
        units: &Units,
        unit: UnitId,
        allies: &[UnitId],
        enemies: &[UnitId],
    ) -> Self {
        let attack_masked = map
            .legal_destinations(units, unit, allies, enemies)
            .into_iter()
            .all(|from| map.attackable_units(units, unit, enemies, from).is_empty());
        Self { item: !units[unit].has_consumable(), attack: attack_masked }
    }

    pub fn is_masked(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Wait => false,
            ActionKind::Item => self.item,
            ActionKind::Attack => self.attack,
        }
    }

    /// Feasible actions in table-index order.
    pub fn feasible(&self) -> Vec<ActionKind> {
        ActionKind::ALL.into_iter().filter(|kind| !self.is_masked(*kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::keys;
    use crate::map::GridMap;
    use crate::test_support::{place, roster_units};
    use crate::types::{Pos, Side};

    #[test]
    fn attack_is_masked_until_an_enemy_is_within_move_plus_range() {
        let map = GridMap::open(12, 3);
        let mut units = roster_units();
        let me = place(&mut units, Side::Blue, Pos::new(0, 1), &[keys::ITEM_IRON_SWORD]);
        let enemy = place(&mut units, Side::Red, Pos::new(8, 1), &[keys::ITEM_IRON_AXE]);
        units[me].movement = 5;

        let far = ActionMask::compute(&map, &units, me, &[me], &[enemy]);
        assert!(far.attack);
        assert!(far.item);
        assert_eq!(far.feasible(), vec![ActionKind::Wait]);

        units[enemy].pos = Pos::new(6, 1);
        let near = ActionMask::compute(&map, &units, me, &[me], &[enemy]);
        assert!(!near.attack);
        assert!(near.is_masked(ActionKind::Item));
        assert_eq!(near.feasible(), vec![ActionKind::Wait, ActionKind::Attack]);
    }

    #[test]
    fn item_follows_consumable_inventory() {
        let map = GridMap::open(4, 4);
        let mut units = roster_units();
        let me = place(
            &mut units,
            Side::Blue,
            Pos::new(0, 0),
            &[keys::ITEM_IRON_SWORD, keys::ITEM_VULNERARY],
        );

        let mask = ActionMask::compute(&map, &units, me, &[me], &[]);
        assert!(!mask.item);
        assert!(mask.attack);
        assert!(!mask.is_masked(ActionKind::Wait));
        assert_eq!(mask.feasible(), vec![ActionKind::Wait, ActionKind::Item]);
    }
}
