//! Differential evolution configuration.
//!
//! [`DeConfig`] holds the search box and every parameter that controls the
//! generation loop. It is immutable for the duration of a run.

use super::bounds::{validate_bounds, validate_initial_guess};
use super::error::{DeError, Result};

/// Configuration for differential evolution.
///
/// # Defaults
///
/// ```
/// use u_diffevo::de::DeConfig;
///
/// let config = DeConfig::new(vec![-5.0, -5.0], vec![5.0, 5.0]);
/// assert_eq!(config.population_size, 500);
/// assert_eq!(config.max_generations, 1000);
/// assert!((config.mutation_factor - 0.65).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_diffevo::de::DeConfig;
///
/// let config = DeConfig::new(vec![-2.0; 3], vec![2.0; 3])
///     .with_population_size(40)
///     .with_mutation_factor(0.5)
///     .with_crossover_probability(0.9)
///     .with_max_generations(200)
///     .with_threads(2)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeConfig {
    /// Lower corner of the search box.
    pub lower_bounds: Vec<f64>,

    /// Upper corner of the search box. Same length as `lower_bounds`.
    pub upper_bounds: Vec<f64>,

    /// Scale applied to the difference vector, also called `F`.
    ///
    /// Must lie in the open interval `(0, 1)`. At `F = 1` the number of
    /// distinct mutants halves, which tends to make convergence erratic.
    pub mutation_factor: f64,

    /// Probability that a coordinate of the trial comes from the mutant
    /// rather than the incumbent, also called `CR`.
    pub crossover_probability: f64,

    /// Number of individuals per generation (`NP`, at least 4).
    pub population_size: usize,

    /// Maximum number of generations after the initial one.
    pub max_generations: usize,

    /// Optional starting point; replaces individual 0 of the initial
    /// population.
    pub initial_guess: Option<Vec<f64>>,

    /// Number of worker threads used to evaluate the cost function.
    pub threads: usize,

    /// Random seed used by [`DeRunner::run`](super::DeRunner::run).
    ///
    /// `None` uses a random seed. Ignored when the caller supplies a
    /// generator.
    pub seed: Option<u64>,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            lower_bounds: Vec::new(),
            upper_bounds: Vec::new(),
            mutation_factor: 0.65,
            crossover_probability: 0.5,
            population_size: 500,
            max_generations: 1000,
            initial_guess: None,
            threads: default_threads(),
            seed: None,
        }
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl DeConfig {
    /// Creates a configuration for the box `[lower, upper]` with default
    /// parameters.
    pub fn new(lower_bounds: Vec<f64>, upper_bounds: Vec<f64>) -> Self {
        Self {
            lower_bounds,
            upper_bounds,
            ..Self::default()
        }
    }

    /// Number of coordinates of an individual.
    pub fn dimension(&self) -> usize {
        self.lower_bounds.len()
    }

    /// Sets the mutation factor `F`.
    ///
    /// Not clamped: out-of-range values are reported by [`validate`](Self::validate).
    pub fn with_mutation_factor(mut self, f: f64) -> Self {
        self.mutation_factor = f;
        self
    }

    /// Sets the crossover probability `CR`, clamped to `[0, 1]`.
    pub fn with_crossover_probability(mut self, cr: f64) -> Self {
        self.crossover_probability = cr.clamp(0.0, 1.0);
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the initial guess.
    pub fn with_initial_guess(mut self, guess: Vec<f64>) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    /// Sets the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// Has no side effects. Checks run in a fixed order: bounds,
    /// population size, mutation factor, generation budget, initial guess,
    /// thread count; the first failure is returned.
    ///
    /// # Errors
    /// [`ErrorKind::DomainError`](super::ErrorKind::DomainError) for a
    /// mutation factor outside `(0, 1)`,
    /// [`ErrorKind::InvalidArgument`](super::ErrorKind::InvalidArgument)
    /// for everything else.
    pub fn validate(&self) -> Result<()> {
        validate_bounds(&self.lower_bounds, &self.upper_bounds)?;
        if self.population_size < 4 {
            return Err(DeError::PopulationTooSmall {
                population_size: self.population_size,
            });
        }
        let f = self.mutation_factor;
        if f.is_nan() || f >= 1.0 || f <= 0.0 {
            return Err(DeError::InvalidMutationFactor { factor: f });
        }
        if self.max_generations < 1 {
            return Err(DeError::ZeroGenerations);
        }
        if let Some(guess) = &self.initial_guess {
            validate_initial_guess(guess, &self.lower_bounds, &self.upper_bounds)?;
        }
        if self.threads == 0 {
            return Err(DeError::ZeroThreads);
        }
        Ok(())
    }
}
