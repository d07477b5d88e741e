//! Differential evolution generation loop.
//!
//! [`DeRunner`] validates the configuration, samples and evaluates the
//! initial population, then alternates trial generation (single-threaded)
//! and parallel evaluation with greedy selection until the generation
//! budget is spent, the target cost is reached, or the run is cancelled.

use super::bounds::{create_rng, random_initial_population};
use super::config::DeConfig;
use super::engine::{best_index, build_trials};
use super::error::Result;
use super::evaluator::Evaluator;
use super::state::{CancellationToken, DeHooks};
use super::types::CostFunction;
use rand::Rng;
use tracing::{debug, info, info_span, warn};

/// Result of a differential evolution run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeResult {
    /// The best individual in the final population.
    ///
    /// If no evaluation ever produced a valid (non-NaN) cost, this is
    /// individual 0 of the final population, which is the initial guess
    /// when one was supplied, and `best_cost` is NaN.
    pub best: Vec<f64>,

    /// Cost of `best`.
    pub best_cost: f64,

    /// Number of generations completed after the initial one.
    pub generations: usize,

    /// Whether the run stopped because of the cancellation token.
    pub cancelled: bool,

    /// Whether the run stopped because a cost reached the target.
    pub target_attained: bool,

    /// Best cost after the initial evaluation and after each completed
    /// generation. Non-increasing once the first valid cost is known.
    pub cost_history: Vec<f64>,
}

/// Executes differential evolution (DE/rand/1/bin).
///
/// # Usage
///
/// ```
/// use u_diffevo::de::{DeConfig, DeRunner};
///
/// let config = DeConfig::new(vec![-5.0], vec![5.0])
///     .with_population_size(10)
///     .with_mutation_factor(0.5)
///     .with_crossover_probability(0.9)
///     .with_max_generations(50)
///     .with_threads(2)
///     .with_seed(42);
/// let result = DeRunner::run(&|x: &[f64]| x[0] * x[0], &config).unwrap();
/// assert!(result.best_cost < 1e-2);
/// ```
pub struct DeRunner;

impl DeRunner {
    /// Runs DE with a generator seeded from [`DeConfig::seed`].
    pub fn run<C: CostFunction + ?Sized>(cost_fn: &C, config: &DeConfig) -> Result<DeResult> {
        Self::run_with_cancel(cost_fn, config, None)
    }

    /// Runs DE with an optional cancellation token.
    ///
    /// If the token is cancelled the run stops at the next poll point and
    /// returns the best individual found so far.
    pub fn run_with_cancel<C: CostFunction + ?Sized>(
        cost_fn: &C,
        config: &DeConfig,
        cancel: Option<&CancellationToken>,
    ) -> Result<DeResult> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        let hooks = DeHooks {
            cancel,
            ..DeHooks::default()
        };
        Self::run_with(cost_fn, config, &mut rng, hooks)
    }

    /// Runs DE with a caller-owned generator and optional hooks.
    ///
    /// The generator is only used on the calling thread, so for a fixed
    /// generator state, configuration and pure cost function the final
    /// population does not depend on thread scheduling. `config.seed` is
    /// ignored.
    ///
    /// # Errors
    /// Returns the validation error of [`DeConfig::validate`] before any
    /// random draw, or [`DeError::ThreadPool`](super::DeError::ThreadPool)
    /// if the worker threads cannot be started.
    ///
    /// # Panics
    /// A panic raised by the cost function is propagated after the workers
    /// of the current sweep have stopped.
    pub fn run_with<C, R>(
        cost_fn: &C,
        config: &DeConfig,
        rng: &mut R,
        hooks: DeHooks<'_>,
    ) -> Result<DeResult>
    where
        C: CostFunction + ?Sized,
        R: Rng + ?Sized,
    {
        config.validate()?;

        let np = config.population_size;
        let _span = info_span!(
            "differential_evolution",
            dimension = config.dimension(),
            population_size = np,
            threads = config.threads
        )
        .entered();

        let evaluator = Evaluator::new(cost_fn, hooks, config.threads)?;

        // 1. Initialize population
        let mut population =
            random_initial_population(&config.lower_bounds, &config.upper_bounds, np, rng);
        if let Some(guess) = &config.initial_guess {
            population[0].clone_from(guess);
        }

        // 2. Evaluate initial population
        let mut costs = vec![f64::NAN; np];
        evaluator.evaluate_initial(&population, &mut costs);

        let mut cost_history = vec![min_cost(&costs)];
        info!(best_cost = cost_history[0], "initial population evaluated");

        // 3. Generation loop
        let mut trials = vec![Vec::with_capacity(config.dimension()); np];
        let mut generations = 0usize;
        let mut cancelled = false;

        while generations < config.max_generations {
            if evaluator.should_stop() {
                cancelled = hooks.is_cancelled();
                break;
            }

            build_trials(&population, config, rng, &mut trials);
            evaluator.evaluate_and_select(&mut population, &mut costs, &trials);
            generations += 1;
            // A cancelled sweep may have skipped some trials.
            cancelled = hooks.is_cancelled();

            let best_cost = min_cost(&costs);
            cost_history.push(best_cost);
            debug!(generation = generations, best_cost, "generation complete");

            cost_fn.on_generation(generations, best_cost);
        }

        // 4. Extract result
        let target_attained = evaluator.target_attained();
        let best_idx = best_index(&costs).unwrap_or_else(|| {
            warn!("no valid cost found; returning individual 0");
            0
        });

        info!(
            generations,
            best_cost = costs[best_idx],
            cancelled,
            target_attained,
            "differential evolution finished"
        );

        Ok(DeResult {
            best: population.swap_remove(best_idx),
            best_cost: costs[best_idx],
            generations,
            cancelled,
            target_attained,
            cost_history,
        })
    }
}

/// Runs DE and returns only the best individual.
///
/// Equivalent to [`DeRunner::run_with`] followed by taking
/// [`DeResult::best`].
pub fn differential_evolution<C, R>(
    cost_fn: &C,
    config: &DeConfig,
    rng: &mut R,
    hooks: DeHooks<'_>,
) -> Result<Vec<f64>>
where
    C: CostFunction + ?Sized,
    R: Rng + ?Sized,
{
    DeRunner::run_with(cost_fn, config, rng, hooks).map(|result| result.best)
}

fn min_cost(costs: &[f64]) -> f64 {
    best_index(costs).map_or(f64::NAN, |i| costs[i])
}

// ============================================================================
// Tests
// ============================================================================
