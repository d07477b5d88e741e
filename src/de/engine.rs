//! Mutation, binomial crossover and best-index extraction.
//!
//! Everything here runs on the calling thread and consumes the generator
//! in a fixed order, so the sequence of trial vectors is a pure function
//! of the generator state and the current population.

use super::config::DeConfig;
use rand::Rng;

/// Draws three indices in `[0, pool_size)` that are pairwise distinct and
/// different from `exclude`, by rejection.
///
/// Requires `pool_size >= 4`.
pub(crate) fn distinct_indices<R: Rng + ?Sized>(
    exclude: usize,
    pool_size: usize,
    rng: &mut R,
) -> [usize; 3] {
    debug_assert!(pool_size >= 4);
    let mut draw = |taken: &[usize]| loop {
        let r = rng.random_range(0..pool_size);
        if r != exclude && !taken.contains(&r) {
            return r;
        }
    };
    let r1 = draw(&[]);
    let r2 = draw(&[r1]);
    let r3 = draw(&[r1, r2]);
    [r1, r2, r3]
}

/// Fills `trials` with one DE/rand/1/bin trial vector per population index.
///
/// For target `i`, coordinate `j` comes from the mutant
/// `x[r1] + F * (x[r2] - x[r3])`, clamped to the bounds, with probability
/// `CR`; coordinate `j*` (drawn once per target) always does. Remaining
/// coordinates are copied from `x[i]`.
pub(crate) fn build_trials<R: Rng + ?Sized>(
    population: &[Vec<f64>],
    config: &DeConfig,
    rng: &mut R,
    trials: &mut [Vec<f64>],
) {
    let np = population.len();
    let dim = config.dimension();
    let f = config.mutation_factor;
    let cr = config.crossover_probability;

    for (i, trial) in trials.iter_mut().enumerate() {
        let [r1, r2, r3] = distinct_indices(i, np, rng);
        let forced = rng.random_range(0..dim);
        let (a, b, c) = (&population[r1], &population[r2], &population[r3]);
        let incumbent = &population[i];

        trial.clear();
        trial.extend((0..dim).map(|j| {
            let u: f64 = rng.random();
            if u < cr || j == forced {
                let mutant = a[j] + f * (b[j] - c[j]);
                mutant.clamp(config.lower_bounds[j], config.upper_bounds[j])
            } else {
                incumbent[j]
            }
        }));
    }
}

/// Index of the smallest cost, ignoring NaN. Ties go to the lowest index.
///
/// Returns `None` if every cost is NaN (or `costs` is empty).
pub(crate) fn best_index(costs: &[f64]) -> Option<usize> {
    costs
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (i, &c)| match best {
            Some((_, b)) if b <= c => best,
            _ => Some((i, c)),
        })
        .map(|(i, _)| i)
}
