//! Deterministic synthetic price pairs for demos, tests and benches.
//!
//! `y` is a random walk; `x = hedge_ratio * y + noise`. The resulting
//! static spread `x - hedge_ratio * y` is the (stationary) noise itself, so
//! the pair is cointegrated by construction.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::spread;

/// Step size of the `y` random walk.
const WALK_SIGMA: f64 = 0.5;
const START_PRICE: f64 = 100.0;

/// A generated pair plus the spread under its true hedge ratio.
#[derive(Debug, Clone)]
pub struct SyntheticPair {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub spread: Vec<f64>,
    pub hedge_ratio: f64,
}

/// Cointegrated pair of length `len` with known `hedge_ratio` and i.i.d.
/// Gaussian spread noise of standard deviation `noise`.
pub fn cointegrated_pair(len: usize, hedge_ratio: f64, noise: f64, seed: u64) -> SyntheticPair {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = START_PRICE;
    let mut x = Vec::with_capacity(len);
    let mut y = Vec::with_capacity(len);
    for _ in 0..len {
        level += WALK_SIGMA * standard_normal(&mut rng);
        y.push(level);
        x.push(hedge_ratio * level + noise * standard_normal(&mut rng));
    }
    let spread = spread::build_static(&x, &y, hedge_ratio);
    SyntheticPair {
        x,
        y,
        spread,
        hedge_ratio,
    }
}

/// Box-Muller transform.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::descriptive::{mean, std_dev};

    #[test]
    fn same_seed_same_pair() {
        let a = cointegrated_pair(50, 1.2, 0.1, 7);
        let b = cointegrated_pair(50, 1.2, 0.1, 7);
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
        let c = cointegrated_pair(50, 1.2, 0.1, 8);
        assert_ne!(a.x, c.x);
    }

    #[test]
    fn spread_is_the_noise() {
        let pair = cointegrated_pair(2000, 1.2, 0.05, 1);
        assert_eq!(pair.spread.len(), 2000);
        assert!(mean(&pair.spread).abs() < 0.01);
        let sd = std_dev(&pair.spread);
        assert!((sd - 0.05).abs() < 0.005, "sd = {sd}");
    }
}
