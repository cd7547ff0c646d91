//! Terrain grid, movement-range enumeration, and attack-range queries.
//! This module exists so every decision component asks the same spatial questions.
//! It does not own combat math or unit decisions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::content::MovementClass;
use crate::error::ScenarioError;
use crate::types::{Pos, UnitId, Units};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileStats {
    pub defense: i32,
    pub avoid: i32,
}

/// Spatial queries consumed by observation, masking, and the move heuristics.
pub trait MapService {
    /// Tiles `unit` may end its move on, in ascending `Pos` order.
    /// The unit's own tile is always included.
    fn legal_destinations(
        &self,
        units: &Units,
        unit: UnitId,
        allies: &[UnitId],
        enemies: &[UnitId],
    ) -> Vec<Pos>;

    fn tile_at(&self, pos: Pos) -> TileStats;

    /// Members of `enemies` that `unit` could strike if it stood on `from`,
    /// in roster order.
    fn attackable_units(
        &self,
        units: &Units,
        unit: UnitId,
        enemies: &[UnitId],
        from: Pos,
    ) -> Vec<UnitId> {
        let attacker = &units[unit];
        enemies
            .iter()
            .copied()
            .filter(|id| {
                units.get(*id).is_some_and(|enemy| attacker.can_reach(manhattan(from, enemy.pos)))
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Plain,
    Forest,
    Mountain,
    Fort,
    Wall,
}

impl Terrain {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Terrain::Plain),
            'f' => Some(Terrain::Forest),
            'm' => Some(Terrain::Mountain),
            'F' => Some(Terrain::Fort),
            '#' => Some(Terrain::Wall),
            _ => None,
        }
    }

    pub fn stats(self) -> TileStats {
        match self {
            Terrain::Plain | Terrain::Wall => TileStats { defense: 0, avoid: 0 },
            Terrain::Forest => TileStats { defense: 1, avoid: 20 },
            Terrain::Mountain => TileStats { defense: 2, avoid: 30 },
            Terrain::Fort => TileStats { defense: 2, avoid: 20 },
        }
    }

    /// Movement points spent entering this terrain, or `None` if impassable.
    pub fn move_cost(self, class: MovementClass) -> Option<u32> {
        match (self, class) {
            (Terrain::Wall, _) => None,
            (Terrain::Plain, _) => Some(1),
            (Terrain::Forest, MovementClass::Mounted) => Some(3),
            (Terrain::Forest, _) => Some(2),
            (Terrain::Mountain, MovementClass::Brigand) => Some(3),
            (Terrain::Mountain, MovementClass::Infantry) => Some(4),
            (Terrain::Mountain, _) => None,
            (Terrain::Fort, _) => Some(2),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Terrain>,
}

impl GridMap {
    pub fn open(width: usize, height: usize) -> Self {
        Self { width, height, tiles: vec![Terrain::Plain; width * height] }
    }

    /// Parses one string per row; see [`Terrain::from_symbol`] for the legend.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, ScenarioError> {
        let width = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(ScenarioError::RaggedMap);
        }
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(ScenarioError::RaggedMap);
            }
            for (x, symbol) in row.chars().enumerate() {
                let terrain = Terrain::from_symbol(symbol)
                    .ok_or(ScenarioError::UnknownTerrain { symbol, x, y })?;
                tiles.push(terrain);
            }
        }
        Ok(Self { width, height: rows.len(), tiles })
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn terrain_at(&self, pos: Pos) -> Terrain {
        if !self.in_bounds(pos) {
            return Terrain::Wall;
        }
        self.tiles[self.index(pos)]
    }

    pub fn set_terrain(&mut self, pos: Pos, terrain: Terrain) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = terrain;
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

impl MapService for GridMap {
    fn legal_destinations(
        &self,
        units: &Units,
        unit: UnitId,
        allies: &[UnitId],
        enemies: &[UnitId],
    ) -> Vec<Pos> {
        let mover = &units[unit];
        let occupied_by = |ids: &[UnitId]| -> BTreeSet<Pos> {
            ids.iter()
                .filter(|id| **id != unit)
                .filter_map(|id| units.get(*id))
                .map(|other| other.pos)
                .collect()
        };
        let blocked = occupied_by(enemies);
        let crowded = occupied_by(allies);

        let mut spent: BTreeMap<Pos, u32> = BTreeMap::new();
        let mut open = BTreeSet::new();
        spent.insert(mover.pos, 0);
        open.insert((0u32, mover.pos));

        while let Some((cost, pos)) = open.pop_first() {
            if spent.get(&pos).is_some_and(|best| *best < cost) {
                continue;
            }
            for next in neighbors(pos) {
                if blocked.contains(&next) {
                    continue;
                }
                let Some(step) = self.terrain_at(next).move_cost(mover.movement_class) else {
                    continue;
                };
                let total = cost + step;
                if total > mover.movement {
                    continue;
                }
                if total < *spent.get(&next).unwrap_or(&u32::MAX) {
                    spent.insert(next, total);
                    open.insert((total, next));
                }
            }
        }

        spent.into_keys().filter(|pos| *pos == mover.pos || !crowded.contains(pos)).collect()
    }

    fn tile_at(&self, pos: Pos) -> TileStats {
        self.terrain_at(pos).stats()
    }
}

pub fn neighbors(p: Pos) -> [Pos; 4] {
    [
        Pos { y: p.y - 1, x: p.x },
        Pos { y: p.y, x: p.x + 1 },
        Pos { y: p.y + 1, x: p.x },
        Pos { y: p.y, x: p.x - 1 },
    ]
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}
