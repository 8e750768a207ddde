//! Pseudo-random offsets used to cascade newly spawned windows.

use std::cell::Cell;

use crate::time::unix_time_ms_now;

/// Source of bounded pseudo-random offsets.
pub trait OffsetSource {
    /// Returns a value in `0..span`, or `0` when `span <= 0`.
    fn next_offset(&self, span: i32) -> i32;
}

#[derive(Debug, Clone)]
/// Deterministic xorshift64* offset source.
pub struct SeededOffsetSource {
    state: Cell<u64>,
}

impl SeededOffsetSource {
    /// Creates a source from `seed`. A zero seed is remapped since xorshift cannot leave zero.
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self {
            state: Cell::new(seed),
        }
    }

    /// Creates a source seeded from the wall clock.
    pub fn from_clock() -> Self {
        Self::new(unix_time_ms_now())
    }

    fn next_u64(&self) -> u64 {
        let mut x = self.state.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state.set(x);
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

impl OffsetSource for SeededOffsetSource {
    fn next_offset(&self, span: i32) -> i32 {
        if span <= 0 {
            return 0;
        }
        (self.next_u64() % span as u64) as i32
    }
}
