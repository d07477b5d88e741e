//! Parallel differential evolution for box-bounded global minimization.
//!
//! - **Differential Evolution (DE)**: DE/rand/1/bin with concurrent cost
//!   evaluation on a fixed worker pool, single-threaded reproducible
//!   random draws, early stop on a target cost, and cooperative
//!   cancellation. See [`de`].
//!
//! # Example
//!
//! ```
//! use u_diffevo::de::{create_rng, AtomicCost, DeConfig, DeHooks, DeRunner};
//!
//! let rosenbrock = |x: &[f64]| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2);
//! let config = DeConfig::new(vec![-2.0, -2.0], vec![2.0, 2.0])
//!     .with_population_size(40)
//!     .with_max_generations(200)
//!     .with_threads(2);
//!
//! let best_so_far = AtomicCost::default();
//! let hooks = DeHooks::default().with_current_minimum(&best_so_far);
//! let result = DeRunner::run_with(&rosenbrock, &config, &mut create_rng(42), hooks).unwrap();
//!
//! assert!(result.best_cost <= result.cost_history[0]);
//! assert_eq!(best_so_far.load(), result.best_cost);
//! ```

pub mod de;
