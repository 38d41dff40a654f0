//! Uniform random helpers shared by the particle engines and the evasion controller.

use rand::Rng;
use rand::distributions::Standard;

/// Uniform real in `[min, max)`.
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let unit: f64 = rng.sample(Standard);
    unit * (max - min) + min
}

/// Uniform index in `0..len` (0 for an empty slice).
pub fn random_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let unit: f64 = rng.sample(Standard);
    ((unit * len as f64) as usize).min(len - 1)
}

/// Coin flip with probability one half, biased like `unit > 0.5`.
pub fn coin<R: Rng + ?Sized>(rng: &mut R) -> bool {
    let unit: f64 = rng.sample(Standard);
    unit > 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_random_between_stays_half_open() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let v = random_between(&mut rng, -40.0, 40.0);
            assert!((-40.0..40.0).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn test_random_between_extremes() {
        let mut low = StepRng::new(0, 0);
        assert_eq!(random_between(&mut low, 5.0, 9.0), 5.0);
        let mut high = StepRng::new(u64::MAX, 0);
        let v = random_between(&mut high, 5.0, 9.0);
        assert!(v < 9.0 && v > 8.999);
    }

    #[test]
    fn test_random_index_bounds() {
        let mut high = StepRng::new(u64::MAX, 0);
        assert_eq!(random_index(&mut high, 10), 9);
        assert_eq!(random_index(&mut high, 0), 0);
        let mut low = StepRng::new(0, 0);
        assert_eq!(random_index(&mut low, 10), 0);
    }
}
