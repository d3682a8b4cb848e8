//! Injectable random streams consumed by every probabilistic roll.

use std::{collections::VecDeque, fmt};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniformly distributed values used for hit rolls, chatter,
/// patrol targets, spawn shuffles and pellet spread.
pub trait RandomSource: fmt::Debug {
    /// Returns a value uniformly distributed in `[0, 1)`.
    fn unit(&mut self) -> f32;

    /// Returns an index uniformly distributed in `0..upper`.
    ///
    /// Returns zero when `upper` is zero so callers never observe a panic.
    fn index(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        let scaled = (self.unit() * upper as f32) as usize;
        scaled.min(upper - 1)
    }

    /// Returns `true` with the provided probability.
    fn chance(&mut self, probability: f32) -> bool {
        self.unit() < probability
    }
}

/// Deterministic ChaCha8-backed random stream.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a stream seeded from the provided value.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    fn index(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.rng.gen_range(0..upper)
    }
}

/// Replays a fixed script of unit values, cycling once exhausted.
///
/// Values outside `[0, 1)` are clamped into range when drawn.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    script: VecDeque<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Creates a scripted stream. An empty script always yields `0.0`.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            script: values.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Creates a stream that always yields the same value.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new([value])
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f32 {
        if self.script.is_empty() {
            return 0.0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f32::EPSILON)
    }
}

/// Fisher-Yates shuffle driven by the provided random source.
pub fn shuffle<T>(items: &mut [T], random: &mut dyn RandomSource) {
    for index in (1..items.len()).rev() {
        let swap_index = random.index(index + 1);
        items.swap(index, swap_index);
    }
}
