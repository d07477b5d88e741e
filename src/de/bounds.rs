//! Box bounds: validation and uniform sampling.

use super::error::{DeError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a seeded generator for reproducible runs.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Checks that `lower` and `upper` describe a non-empty, finite box.
///
/// # Errors
/// Returns an [`InvalidArgument`](super::ErrorKind::InvalidArgument) error
/// if the lengths differ, the bounds are empty, a bound is NaN or infinite,
/// `lower[j] > upper[j]` for some `j`, or `upper[j] - lower[j]` overflows.
pub fn validate_bounds(lower: &[f64], upper: &[f64]) -> Result<()> {
    if lower.len() != upper.len() {
        return Err(DeError::BoundsMismatch {
            lower_len: lower.len(),
            upper_len: upper.len(),
        });
    }
    if lower.is_empty() {
        return Err(DeError::EmptyBounds);
    }
    for (index, (&lo, &hi)) in lower.iter().zip(upper).enumerate() {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(DeError::NonFiniteBound {
                index,
                lower: lo,
                upper: hi,
            });
        }
        if lo > hi {
            return Err(DeError::InvalidBounds {
                index,
                lower: lo,
                upper: hi,
            });
        }
        // Uniform sampling needs a representable width.
        if !(hi - lo).is_finite() {
            return Err(DeError::BoundsTooWide {
                index,
                lower: lo,
                upper: hi,
            });
        }
    }
    Ok(())
}

/// Checks that `guess` has the bounds' dimension and lies inside the box.
///
/// Assumes the bounds themselves are valid.
pub fn validate_initial_guess(guess: &[f64], lower: &[f64], upper: &[f64]) -> Result<()> {
    if guess.len() != lower.len() {
        return Err(DeError::GuessDimensionMismatch {
            expected: lower.len(),
            got: guess.len(),
        });
    }
    for (index, ((&value, &lo), &hi)) in guess.iter().zip(lower).zip(upper).enumerate() {
        // Negated so that NaN coordinates are rejected too.
        if !(lo <= value && value <= hi) {
            return Err(DeError::GuessOutOfBounds {
                index,
                value,
                lower: lo,
                upper: hi,
            });
        }
    }
    Ok(())
}

/// Samples `count` points uniformly inside the box.
///
/// Draws are made sequentially, individual by individual and coordinate by
/// coordinate, so the result is a pure function of the generator state.
pub fn random_initial_population<R: Rng + ?Sized>(
    lower: &[f64],
    upper: &[f64],
    count: usize,
    rng: &mut R,
) -> Vec<Vec<f64>> {
    (0..count)
        .map(|_| {
            lower
                .iter()
                .zip(upper)
                .map(|(&lo, &hi)| rng.random_range(lo..=hi))
                .collect()
        })
        .collect()
}

/// Returns `true` if `x` has the box's dimension and lies inside it.
///
/// Every point a run evaluates or returns satisfies this.
///
/// ```
/// use u_diffevo::de::{contains, DeConfig, DeRunner};
///
/// let config = DeConfig::new(vec![-1.0, -1.0], vec![1.0, 1.0])
///     .with_population_size(8)
///     .with_max_generations(5)
///     .with_seed(3);
/// let result = DeRunner::run(&|x: &[f64]| x[0] + x[1], &config).unwrap();
/// assert!(contains(&result.best, &config.lower_bounds, &config.upper_bounds));
/// assert!(!contains(&[0.0], &config.lower_bounds, &config.upper_bounds));
/// ```
pub fn contains(x: &[f64], lower: &[f64], upper: &[f64]) -> bool {
    x.len() == lower.len()
        && x.iter()
            .zip(lower.iter().zip(upper))
            .all(|(&v, (&lo, &hi))| lo <= v && v <= hi)
}
