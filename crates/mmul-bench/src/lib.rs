//! SGEMM benchmark driver: CPU BLAS reference vs GPU offload.
//!
//! Shared helpers (seeded RNG, input generation, FLOP accounting) plus the
//! driver behind the `mmul` binary.

pub mod config;
mod error;
pub mod flops;
pub mod report;
pub mod run;

pub use config::Config;
pub use error::BenchError;
pub use flops::Timing;
pub use run::{run, Summary};

/// Default seed for input generation.
pub const DEFAULT_SEED: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// xoshiro256** PRNG; a given seed always yields the same inputs.
#[derive(Clone, Debug)]
pub struct Rng {
    s: [u64; 4],
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        // SplitMix64 to expand seed into state
        let mut z = seed;
        let mut s = [0u64; 4];
        for slot in &mut s {
            z = z.wrapping_add(0x9e3779b97f4a7c15);
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
            *slot = z ^ (z >> 31);
        }
        Self { s }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 17;
        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];
        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);
        result
    }
}

/// One benchmark input value: `(r & 0xFF) / 10`, i.e. in [0.0, 25.5].
#[inline]
pub fn initial_value(rng: &mut Rng) -> f32 {
    (rng.next_u64() & 0xFF) as f32 / 10.0
}

/// `len` benchmark input values.
pub fn initial_data(rng: &mut Rng, len: usize) -> Vec<f32> {
    (0..len).map(|_| initial_value(rng)).collect()
}
