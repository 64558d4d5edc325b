//! RNG module - deterministic Alea generator
//!
//! Three-register multiply-with-carry generator seeded through a string hash
//! ("mash"). The arithmetic is reproduced bit-for-bit so that a given seed
//! yields the same tile spawns across runs, platforms, and implementations of
//! the same algorithm.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// 2^-32
const TWO_POW_NEG_32: f64 = 2.328_306_436_538_696_3e-10;

/// 2^32
const TWO_POW_32: f64 = 4_294_967_296.0;

/// 2^-53
const TWO_POW_NEG_53: f64 = 1.110_223_024_625_156_5e-16;

/// Multiplier of the multiply-with-carry step
const MULTIPLIER: f64 = 2_091_639.0;

/// Initial value of the mash accumulator
const MASH_SEED: u32 = 0xefc8_249d;

/// Hash multiplier of the mash function
const MASH_FACTOR: f64 = 0.025_196_032_824_169_38;

/// Marker string hashed into the registers before the seed
const MARKER: &str = " ";

/// Wrap a non-negative double into the `u32` range the way `x >>> 0` does.
#[inline(always)]
fn to_u32(x: f64) -> f64 {
    x.trunc().rem_euclid(TWO_POW_32)
}

/// String hash used to derive the initial registers.
///
/// The accumulator persists across calls, so hashing the same text twice
/// gives different values.
#[derive(Debug, Clone)]
struct Mash {
    n: f64,
}

impl Mash {
    fn new() -> Self {
        Self {
            n: MASH_SEED as f64,
        }
    }

    fn hash(&mut self, data: &str) -> f64 {
        for unit in data.encode_utf16() {
            self.n += unit as f64;
            let mut h = MASH_FACTOR * self.n;
            self.n = to_u32(h);
            h -= self.n;
            h *= self.n;
            self.n = to_u32(h);
            h -= self.n;
            self.n += h * TWO_POW_32;
        }
        to_u32(self.n) * TWO_POW_NEG_32
    }
}

/// Serializable generator state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AleaState {
    pub s0: f64,
    pub s1: f64,
    pub s2: f64,
    pub c: f64,
}

/// Seeded Alea pseudo-random generator
#[derive(Debug, Clone, PartialEq)]
pub struct Alea {
    s0: f64,
    s1: f64,
    s2: f64,
    c: f64,
}

impl Alea {
    /// Create a generator from any displayable seed.
    ///
    /// The seed is hashed through its `Display` text, so `Alea::new(0)` and
    /// `Alea::new("0")` produce the same stream.
    pub fn new(seed: impl Display) -> Self {
        let seed = seed.to_string();
        let mut mash = Mash::new();

        let mut s0 = mash.hash(MARKER);
        let mut s1 = mash.hash(MARKER);
        let mut s2 = mash.hash(MARKER);

        // Baagoe seeding: pull each register down by a fresh hash of the seed.
        for reg in [&mut s0, &mut s1, &mut s2] {
            *reg -= mash.hash(&seed);
            if *reg < 0.0 {
                *reg += 1.0;
            }
        }

        Self { s0, s1, s2, c: 1.0 }
    }

    /// Restore a generator from a previously captured state
    pub fn from_state(state: AleaState) -> Self {
        Self {
            s0: state.s0,
            s1: state.s1,
            s2: state.s2,
            c: state.c,
        }
    }

    /// Capture the current state
    pub fn state(&self) -> AleaState {
        AleaState {
            s0: self.s0,
            s1: self.s1,
            s2: self.s2,
            c: self.c,
        }
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        let t = MULTIPLIER * self.s0 + self.c * TWO_POW_NEG_32;
        self.s0 = self.s1;
        self.s1 = self.s2;
        // t is always positive and far below 2^31, so truncation is `t | 0`.
        self.c = t.trunc();
        self.s2 = t - self.c;
        self.s2
    }

    /// Next value as a signed 32-bit integer
    pub fn int32(&mut self) -> i32 {
        (self.next_f64() * TWO_POW_32) as i64 as i32
    }

    /// Next value in `[0, 1)` with 53 bits of resolution (consumes two draws)
    pub fn next_double(&mut self) -> f64 {
        let hi = self.next_f64();
        let lo = ((self.next_f64() * 2_097_152.0) as i64 as i32) as f64;
        hi + lo * TWO_POW_NEG_53
    }

    /// Uniform value in `[min, max)`
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        self.next_f64() * (max - min) + min
    }

    /// Uniform index in `0..n` (`floor(next * n)`)
    ///
    /// Returns 0 when `n == 0`.
    pub fn below(&mut self, n: usize) -> usize {
        let v = (self.next_f64() * n as f64).floor() as usize;
        v.min(n.saturating_sub(1))
    }
}

impl Default for Alea {
    fn default() -> Self {
        Self::new(tui_2048_types::DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(rng: &mut Alea, n: usize) -> Vec<f64> {
        (0..n).map(|_| rng.next_f64()).collect()
    }

    #[test]
    fn test_seed_zero_reference_sequence() {
        let mut rng = Alea::new(0);
        assert_eq!(
            draws(&mut rng, 5),
            vec![
                0.5945264333859086,
                0.8065849216654897,
                0.12979769078083336,
                0.6747123580425978,
                0.47925701597705483,
            ]
        );
    }

    #[test]
    fn test_string_seed_reference_sequence() {
        let mut rng = Alea::new("hello.");
        assert_eq!(
            draws(&mut rng, 3),
            vec![0.4783254903741181, 0.8297006865032017, 0.46924330526962876]
        );
    }

    #[test]
    fn test_seeded_registers() {
        let rng = Alea::new(42);
        let state = rng.state();
        assert_eq!(state.s0, 0.043888397980481386);
        assert_eq!(state.s1, 0.38626290019601583);
        assert_eq!(state.s2, 0.9581590539310127);
        assert_eq!(state.c, 1.0);
    }

    #[test]
    fn test_numeric_and_text_seed_agree() {
        let mut a = Alea::new(42);
        let mut b = Alea::new("42");
        assert_eq!(draws(&mut a, 32), draws(&mut b, 32));
    }

    #[test]
    fn test_int32_and_double_reference() {
        let mut rng = Alea::new(0);
        assert_eq!(rng.int32(), -1741495708);
        assert_eq!(rng.int32(), -830711436);
        assert_eq!(rng.next_double(), 0.12979769093792703);
    }

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = Alea::new("tile");
        let mut rng2 = Alea::new("tile");
        for _ in 0..1000 {
            assert_eq!(rng1.next_f64(), rng2.next_f64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = Alea::new(12345);
        let mut rng2 = Alea::new(54321);
        assert_ne!(rng1.next_f64(), rng2.next_f64());
    }

    #[test]
    fn test_state_round_trip_resumes_stream() {
        let mut rng = Alea::new(7);
        draws(&mut rng, 10);
        let mut resumed = Alea::from_state(rng.state());
        assert_eq!(draws(&mut rng, 10), draws(&mut resumed, 10));
    }

    #[test]
    fn test_values_stay_in_unit_interval() {
        let mut rng = Alea::new("bounds");
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_below_and_range() {
        let mut rng = Alea::new(3);
        for _ in 0..1000 {
            assert!(rng.below(16) < 16);
            let v = rng.range(-2.0, 2.0);
            assert!((-2.0..2.0).contains(&v));
        }
        assert_eq!(rng.below(0), 0);
    }
}
