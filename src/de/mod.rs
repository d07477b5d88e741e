//! Differential Evolution (DE).
//!
//! A population-based global optimizer for box-bounded real vectors. Each
//! generation, every individual `x[i]` competes against a trial vector
//! built from three other members (DE/rand/1 mutation, clamped to the box)
//! mixed with `x[i]` by binomial crossover. The trial replaces `x[i]` only
//! if its cost is strictly lower, so per-index costs never regress.
//!
//! Random draws happen on the calling thread in a fixed order; only cost
//! evaluation is parallel. A run is therefore reproducible for a fixed
//! seed whenever the cost function is pure, whatever the thread count.
//!
//! # Key Types
//!
//! - [`DeConfig`]: Search box and algorithm parameters
//! - [`CostFunction`]: The objective, implemented for plain closures
//! - [`DeRunner`]: Executes the generation loop
//! - [`DeHooks`]: Target cost, [`CancellationToken`], [`QueryLog`] and
//!   live [`AtomicCost`] minimum shared with the caller
//! - [`DeResult`]: Best individual and run statistics
//!
//! # References
//!
//! - Storn & Price (1997), "Differential Evolution – A Simple and Efficient
//!   Heuristic for Global Optimization over Continuous Spaces",
//!   *J. Global Optimization* 11, 341–359
//! - Price, Storn & Lampinen (2005), *Differential Evolution: A Practical
//!   Approach to Global Optimization*

mod bounds;
mod config;
mod engine;
mod error;
mod evaluator;
mod runner;
mod state;
mod types;

pub use bounds::{
    contains, create_rng, random_initial_population, validate_bounds, validate_initial_guess,
};
pub use config::DeConfig;
pub use error::{DeError, ErrorKind, Result};
pub use runner::{differential_evolution, DeResult, DeRunner};
pub use state::{AtomicCost, CancellationToken, DeHooks, Query, QueryLog};
pub use types::CostFunction;
