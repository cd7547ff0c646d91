//! Roster and map description of one battle, loadable from TOML.
//! This module turns templates into units and checks that a layout is playable.
//! It does not run the battle.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::content::{construct_inventory, job, keys};
use crate::error::ScenarioError;
use crate::map::GridMap;
use crate::types::{Pos, Side, UnitId};
use crate::unit::{Stats, Unit};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    #[serde(default)]
    pub character_code: u32,
    pub name: String,
    pub job: u16,
    pub pos: Pos,
    pub stats: Stats,
    #[serde(default)]
    pub inventory: Vec<u16>,
    /// Death of this unit decides the battle.
    #[serde(default)]
    pub terminal: bool,
    /// Only Blue units may learn; the flag is ignored on Red.
    #[serde(default)]
    pub learning: bool,
}

impl UnitTemplate {
    pub fn build(&self, side: Side) -> Result<Unit, ScenarioError> {
        let info = job(self.job).ok_or(ScenarioError::UnknownJob(self.job))?;
        Ok(Unit {
            id: UnitId::default(),
            character_code: self.character_code,
            name: self.name.clone(),
            job: info.name,
            side,
            pos: self.pos,
            stats: self.stats,
            hp: self.stats.max_hp,
            movement: info.movement,
            movement_class: info.class,
            inventory: construct_inventory(&self.inventory)?,
            terminal: self.terminal,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// One string per row; see [`crate::map::Terrain::from_symbol`] for the legend.
    pub map: Vec<String>,
    pub blue: Vec<UnitTemplate>,
    pub red: Vec<UnitTemplate>,
}

impl Scenario {
    pub fn roster(&self, side: Side) -> &[UnitTemplate] {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }

    /// Parses the map and checks every unit stands on its own passable tile.
    pub fn grid_map(&self) -> Result<GridMap, ScenarioError> {
        let map = GridMap::from_rows(&self.map)?;
        let mut occupied = BTreeSet::new();
        for side in [Side::Blue, Side::Red] {
            let roster = self.roster(side);
            if roster.is_empty() {
                return Err(ScenarioError::EmptyRoster(side));
            }
            for template in roster {
                let info = job(template.job).ok_or(ScenarioError::UnknownJob(template.job))?;
                let passable = map.in_bounds(template.pos)
                    && map.terrain_at(template.pos).move_cost(info.class).is_some();
                if !passable || !occupied.insert(template.pos) {
                    return Err(ScenarioError::BadPlacement { name: template.name.clone() });
                }
            }
        }
        Ok(map)
    }

    /// A lord and a mercenary holding a fort line against three brigands.
    pub fn skirmish() -> Self {
        let map = [
            "..f.....",
            "..f..m..",
            ".F....m.",
            "....f...",
            "..##....",
            "...f..F.",
            "........",
            ".f......",
        ];
        let blue = vec![
            UnitTemplate {
                character_code: 0x0003,
                name: "Lyn".to_string(),
                job: keys::JOB_LORD,
                pos: Pos::new(1, 1),
                stats: Stats {
                    max_hp: 16,
                    strength: 4,
                    magic: 0,
                    skill: 7,
                    speed: 9,
                    luck: 5,
                    defense: 2,
                    resistance: 0,
                },
                inventory: vec![keys::ITEM_SLIM_SWORD, keys::ITEM_VULNERARY],
                terminal: true,
                learning: true,
            },
            UnitTemplate {
                character_code: 0x0016,
                name: "Raven".to_string(),
                job: keys::JOB_MERCENARY,
                pos: Pos::new(0, 2),
                stats: Stats {
                    max_hp: 25,
                    strength: 8,
                    magic: 0,
                    skill: 11,
                    speed: 10,
                    luck: 2,
                    defense: 5,
                    resistance: 1,
                },
                inventory: vec![keys::ITEM_IRON_SWORD, keys::ITEM_VULNERARY],
                terminal: false,
                learning: true,
            },
        ];
        let brigand = |character_code, name: &str, pos, max_hp, strength, inventory: &[u16]| {
            UnitTemplate {
                character_code,
                name: name.to_string(),
                job: keys::JOB_BRIGAND,
                pos,
                stats: Stats {
                    max_hp,
                    strength,
                    magic: 0,
                    skill: 1,
                    speed: 4,
                    luck: 0,
                    defense: 3,
                    resistance: 0,
                },
                inventory: inventory.to_vec(),
                terminal: false,
                learning: false,
            }
        };
        let boss_items = [keys::ITEM_IRON_AXE, keys::ITEM_VULNERARY];
        let mut batta = brigand(0x0068, "Batta", Pos::new(6, 5), 21, 5, &boss_items);
        batta.terminal = true;
        let red = vec![
            batta,
            brigand(0x0069, "Brigand A", Pos::new(5, 6), 20, 4, &[keys::ITEM_IRON_AXE]),
            brigand(0x006a, "Brigand B", Pos::new(7, 4), 18, 4, &[keys::ITEM_HAND_AXE]),
        ];
        Self { map: map.iter().map(|row| row.to_string()).collect(), blue, red }
    }
}
