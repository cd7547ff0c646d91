//! Static item and job tables used to build units from roster data.

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

pub mod keys {
    pub const ITEM_IRON_SWORD: u16 = 0x01;
    pub const ITEM_SLIM_SWORD: u16 = 0x02;
    pub const ITEM_STEEL_SWORD: u16 = 0x03;
    pub const ITEM_IRON_LANCE: u16 = 0x14;
    pub const ITEM_JAVELIN: u16 = 0x1a;
    pub const ITEM_IRON_AXE: u16 = 0x1f;
    pub const ITEM_HAND_AXE: u16 = 0x25;
    pub const ITEM_IRON_BOW: u16 = 0x2d;
    pub const ITEM_FIRE: u16 = 0x38;
    pub const ITEM_VULNERARY: u16 = 0x6b;
    pub const ITEM_ELIXIR: u16 = 0x6c;

    pub const JOB_LORD: u16 = 0x0204;
    pub const JOB_MERCENARY: u16 = 0x0a04;
    pub const JOB_CAVALIER: u16 = 0x0c10;
    pub const JOB_ARCHER: u16 = 0x0e04;
    pub const JOB_MAGE: u16 = 0x1004;
    pub const JOB_BRIGAND: u16 = 0x1410;
    pub const JOB_KNIGHT: u16 = 0x1604;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Tome,
    HealConsumable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub code: u16,
    pub name: &'static str,
    pub kind: ItemKind,
    pub min_range: u32,
    pub max_range: u32,
    pub might: i32,
    pub hit: i32,
    pub crit: i32,
    pub heal_amount: i32,
    pub uses: u32,
}

impl Item {
    pub fn is_offensive(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon | ItemKind::Tome)
    }

    pub fn is_consumable(&self) -> bool {
        self.kind == ItemKind::HealConsumable
    }

    pub fn reaches(&self, distance: u32) -> bool {
        self.is_offensive() && (self.min_range..=self.max_range).contains(&distance)
    }
}

const fn weapon(
    code: u16,
    name: &'static str,
    range: (u32, u32),
    might: i32,
    hit: i32,
    crit: i32,
    uses: u32,
) -> Item {
    Item {
        code,
        name,
        kind: ItemKind::Weapon,
        min_range: range.0,
        max_range: range.1,
        might,
        hit,
        crit,
        heal_amount: 0,
        uses,
    }
}

const fn consumable(code: u16, name: &'static str, heal_amount: i32, uses: u32) -> Item {
    Item {
        code,
        name,
        kind: ItemKind::HealConsumable,
        min_range: 0,
        max_range: 0,
        might: 0,
        hit: 0,
        crit: 0,
        heal_amount,
        uses,
    }
}

pub fn item(code: u16) -> Option<Item> {
    let item = match code {
        keys::ITEM_IRON_SWORD => weapon(code, "Iron Sword", (1, 1), 5, 90, 0, 46),
        keys::ITEM_SLIM_SWORD => weapon(code, "Slim Sword", (1, 1), 3, 100, 5, 30),
        keys::ITEM_STEEL_SWORD => weapon(code, "Steel Sword", (1, 1), 8, 75, 0, 30),
        keys::ITEM_IRON_LANCE => weapon(code, "Iron Lance", (1, 1), 7, 80, 0, 45),
        keys::ITEM_JAVELIN => weapon(code, "Javelin", (1, 2), 6, 65, 0, 20),
        keys::ITEM_IRON_AXE => weapon(code, "Iron Axe", (1, 1), 8, 75, 0, 45),
        keys::ITEM_HAND_AXE => weapon(code, "Hand Axe", (1, 2), 7, 60, 0, 20),
        keys::ITEM_IRON_BOW => weapon(code, "Iron Bow", (2, 2), 6, 85, 0, 45),
        keys::ITEM_FIRE => Item {
            kind: ItemKind::Tome,
            ..weapon(code, "Fire", (1, 2), 5, 90, 0, 40)
        },
        keys::ITEM_VULNERARY => consumable(code, "Vulnerary", 10, 3),
        keys::ITEM_ELIXIR => consumable(code, "Elixir", 99, 3),
        _ => return None,
    };
    Some(item)
}

/// Builds a starting inventory in the order the codes are listed.
pub fn construct_inventory(codes: &[u16]) -> Result<Vec<Item>, ScenarioError> {
    codes.iter().map(|&code| item(code).ok_or(ScenarioError::UnknownItem(code))).collect()
}

/// Terrain traversal family; decides per-terrain movement cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementClass {
    Infantry,
    Armored,
    Mounted,
    Brigand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobInfo {
    pub name: &'static str,
    pub movement: u32,
    pub class: MovementClass,
}

pub fn job(code: u16) -> Option<JobInfo> {
    let (name, movement, class) = match code {
        keys::JOB_LORD => ("Lord", 5, MovementClass::Infantry),
        keys::JOB_MERCENARY => ("Mercenary", 5, MovementClass::Infantry),
        keys::JOB_CAVALIER => ("Cavalier", 7, MovementClass::Mounted),
        keys::JOB_ARCHER => ("Archer", 5, MovementClass::Infantry),
        keys::JOB_MAGE => ("Mage", 5, MovementClass::Infantry),
        keys::JOB_BRIGAND => ("Brigand", 5, MovementClass::Brigand),
        keys::JOB_KNIGHT => ("Knight", 4, MovementClass::Armored),
        _ => return None,
    };
    Some(JobInfo { name, movement, class })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_keeps_listed_order_and_rejects_unknown_codes() {
        let inventory =
            construct_inventory(&[keys::ITEM_IRON_SWORD, keys::ITEM_VULNERARY]).unwrap();
        assert_eq!(inventory[0].name, "Iron Sword");
        assert_eq!(inventory[1].kind, ItemKind::HealConsumable);

        assert_eq!(construct_inventory(&[0x7fff]), Err(ScenarioError::UnknownItem(0x7fff)));
    }

    #[test]
    fn bows_only_reach_two_tiles() {
        let bow = item(keys::ITEM_IRON_BOW).unwrap();
        assert!(!bow.reaches(1));
        assert!(bow.reaches(2));
        assert!(!item(keys::ITEM_VULNERARY).unwrap().reaches(0));
    }
}
