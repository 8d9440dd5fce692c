//! Seeded randomness for the sketches
//! Uniform draws with host-style range semantics plus smooth 1-D noise

use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Octaves summed by [`NoiseField::sample`].
const NOISE_OCTAVES: u32 = 4;
/// Amplitude multiplier applied per octave.
const NOISE_FALLOFF: f64 = 0.5;
/// Fixed second coordinate so the 2-D Perlin lattice behaves as a 1-D curve.
const NOISE_ROW: f64 = 0.371;

/// Uniform random stream owned by a single sketch.
pub struct SketchRng {
    rng: StdRng,
}

impl SketchRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniform value in `[lo, hi)`.
    ///
    /// Reversed bounds are swapped and an empty range yields `lo`, so a
    /// degenerate canvas never makes setup panic.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if hi - lo <= f32::EPSILON {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Uniform value in `[0, hi)`.
    pub fn below(&mut self, hi: f32) -> f32 {
        self.range(0.0, hi)
    }

    pub fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// Random element of `items`, or the default value when empty.
    pub fn pick<T: Copy + Default>(&mut self, items: &[T]) -> T {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

/// Smooth deterministic noise in `[0, 1]`.
pub struct NoiseField {
    perlin: Perlin,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            perlin: Perlin::new(folded),
        }
    }

    pub fn sample(&self, x: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = NOISE_FALLOFF;
        let mut frequency = 1.0;
        let mut norm = 0.0;

        for _ in 0..NOISE_OCTAVES {
            total += self.perlin.get([x as f64 * frequency, NOISE_ROW]) * amplitude;
            norm += amplitude;
            amplitude *= NOISE_FALLOFF;
            frequency *= 2.0;
        }

        ((total / norm) * 0.5 + 0.5).clamp(0.0, 1.0) as f32
    }
}
