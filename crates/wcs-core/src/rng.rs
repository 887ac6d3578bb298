//! Per-agent and simulation-level RNG wrappers.
//!
//! # Seeding strategy
//!
//! Bootstrap (bin placement) always draws from a [`SimRng`] seeded with
//! `simulation.seed`, so the same config always lays out the same city.
//! The live run then uses fresh generators that are either drawn from OS
//! entropy or, when `simulation.live_seed` is set, derived from it:
//!
//!   seed = live_seed XOR (stream * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive stream numbers uniformly across the seed space.
//! Generators are passed explicitly; nothing touches a process-global RNG.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Derive the seed of stream `stream` from a base seed.
#[inline]
fn mix(seed: u64, stream: u64) -> u64 {
    seed ^ stream.wrapping_mul(MIXING_CONSTANT)
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent RNG.
///
/// Every agent owns exactly one; behaviours of the same agent share it
/// through the agent's state lock.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from a base seed and a stream number.
    pub fn new(seed: u64, stream: u64) -> Self {
        AgentRng(SmallRng::seed_from_u64(mix(seed, stream)))
    }

    /// Seed from OS entropy.
    pub fn from_entropy() -> Self {
        AgentRng(SmallRng::from_entropy())
    }

    /// Deterministic if `seed` is `Some`, entropy-seeded otherwise.
    pub fn seeded_or_entropy(seed: Option<u64>, stream: u64) -> Self {
        match seed {
            Some(s) => AgentRng::new(s, stream),
            None    => AgentRng::from_entropy(),
        }
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Uniform `f64` in `[min, max]`; returns `min` for a degenerate range.
    #[inline]
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if max > min { self.0.gen_range(min..=max) } else { min }
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations (bootstrap placement, traffic
/// events).
///
/// Used only by the single owner of the world; agents get their own
/// [`AgentRng`] via [`SimRng::agent`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        SimRng(SmallRng::from_entropy())
    }

    /// Deterministic if `seed` is `Some`, entropy-seeded otherwise.
    pub fn seeded_or_entropy(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => SimRng::new(s),
            None    => SimRng::from_entropy(),
        }
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed = mix(self.0.r#gen::<u64>(), offset);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Derive an agent RNG for `stream` from this generator.
    pub fn agent(&mut self, stream: u64) -> AgentRng {
        AgentRng::new(self.0.r#gen::<u64>(), stream)
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
