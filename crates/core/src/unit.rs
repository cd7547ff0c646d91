//! Combatant data and the direct state changes applied to it.
//! This module owns health bookkeeping and inventory use.
//! It does not decide what a unit does; controllers do.

use serde::{Deserialize, Serialize};

use crate::content::{Item, MovementClass};
use crate::types::{Pos, Side, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: i32,
    pub strength: i32,
    pub magic: i32,
    pub skill: i32,
    pub speed: i32,
    pub luck: i32,
    pub defense: i32,
    pub resistance: i32,
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub character_code: u32,
    pub name: String,
    pub job: &'static str,
    pub side: Side,
    pub pos: Pos,
    pub stats: Stats,
    pub hp: i32,
    pub movement: u32,
    pub movement_class: MovementClass,
    pub inventory: Vec<Item>,
    /// Death of this unit ends the battle instead of just removing it.
    pub terminal: bool,
}

impl Unit {
    pub fn goto(&mut self, pos: Pos) {
        self.pos = pos;
    }

    pub fn health_fraction(&self) -> f64 {
        f64::from(self.hp) / f64::from(self.stats.max_hp)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Restores up to `amount` health and returns how much was actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = (self.stats.max_hp - self.hp).min(amount).max(0);
        self.hp += healed;
        healed
    }

    pub fn take_damage(&mut self, amount: i32) {
        if amount < 0 {
            return;
        }
        self.hp = (self.hp - amount).max(0);
    }

    /// The first weapon or tome in the inventory.
    pub fn equipped_weapon(&self) -> Option<&Item> {
        self.inventory.iter().find(|item| item.is_offensive())
    }

    pub fn equip(&mut self, index: usize) {
        if index < self.inventory.len() {
            self.inventory.swap(0, index);
        }
    }

    /// Sorted, deduplicated distances reachable by any held weapon or tome.
    pub fn attack_range(&self) -> Vec<u32> {
        let mut range: Vec<u32> = self
            .inventory
            .iter()
            .filter(|item| item.is_offensive())
            .flat_map(|item| item.min_range..=item.max_range)
            .collect();
        range.sort_unstable();
        range.dedup();
        range
    }

    pub fn can_reach(&self, distance: u32) -> bool {
        self.inventory.iter().any(|item| item.reaches(distance))
    }

    pub fn has_consumable(&self) -> bool {
        self.inventory.iter().any(Item::is_consumable)
    }

    /// Inventory slots holding usable consumables, in inventory order.
    pub fn consumable_slots(&self) -> Vec<usize> {
        self.inventory
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_consumable())
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Uses the item in `slot`, spending one use and dropping it when spent.
    /// Returns the health restored, or `None` when the slot holds no consumable.
    pub fn use_item(&mut self, slot: usize) -> Option<i32> {
        let item = self.inventory.get_mut(slot)?;
        if !item.is_consumable() {
            return None;
        }
        let amount = item.heal_amount;
        item.uses = item.uses.saturating_sub(1);
        if item.uses == 0 {
            self.inventory.remove(slot);
        }
        Some(self.heal(amount))
    }
}
