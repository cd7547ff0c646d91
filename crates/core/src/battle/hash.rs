//! Stable snapshot hashing for determinism checks.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Battle {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u32(self.turn);
        hasher.write_u8(match self.phase {
            Side::Blue => 0,
            Side::Red => 1,
        });
        hasher.write_i8(self.outcome.signal());
        hasher.write_usize(self.cursor);
        for (_, unit) in &self.units {
            hasher.write_i32(unit.pos.x);
            hasher.write_i32(unit.pos.y);
            hasher.write_i32(unit.hp);
            hasher.write_usize(unit.inventory.len());
        }
        hasher.finish()
    }
}
