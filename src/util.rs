//! Shared helpers.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Create the run's master random number generator.
///
/// With a seed the whole run is reproducible; without one the generator is
/// seeded from the OS entropy source.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = seeded_rng(Some(3));
        let mut b = seeded_rng(Some(3));

        for _ in 0..4 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }
}
