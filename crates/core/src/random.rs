//! Draw helpers over the battle's single seeded stream.
//! Every random choice in a battle goes through here so draw order stays reproducible.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

/// Uniform draw in `[0, 1)` built from the top 53 bits of one `u64`.
pub fn unit_interval(rng: &mut ChaCha8Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Uniform index below `len`; `len` must be non-zero.
pub fn pick_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    debug_assert!(len > 0);
    rng.next_u64() as usize % len
}

pub fn choose<'a, T>(rng: &mut ChaCha8Rng, slice: &'a [T]) -> Option<&'a T> {
    if slice.is_empty() {
        return None;
    }
    slice.get(pick_index(rng, slice.len()))
}
