//! Error types for differential evolution.
//!
//! Every variant except [`DeError::ThreadPool`] is raised by validation,
//! before any random draw or worker thread. Invalid cost values (NaN) are
//! not errors; they are absorbed by selection.

use thiserror::Error;

/// Coarse classification of a [`DeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural misconfiguration: bounds, population size, generation
    /// budget, worker count or initial guess.
    InvalidArgument,
    /// The mutation factor lies outside the open interval `(0, 1)`.
    DomainError,
    /// The worker pool could not be created.
    Resource,
}

/// Errors returned by the differential evolution runner.
#[derive(Debug, Error)]
pub enum DeError {
    #[error("bounds mismatch: lower has {lower_len} elements, upper has {upper_len}")]
    BoundsMismatch { lower_len: usize, upper_len: usize },

    #[error("bounds must have at least one dimension")]
    EmptyBounds,

    #[error("non-finite bound at index {index}: [{lower}, {upper}]")]
    NonFiniteBound { index: usize, lower: f64, upper: f64 },

    #[error("invalid bounds at index {index}: lower ({lower}) > upper ({upper})")]
    InvalidBounds { index: usize, lower: f64, upper: f64 },

    #[error("bounds at index {index} too wide: width of [{lower}, {upper}] overflows")]
    BoundsTooWide { index: usize, lower: f64, upper: f64 },

    #[error("population size must be at least 4, but requested {population_size}")]
    PopulationTooSmall { population_size: usize },

    #[error("mutation factor F in (0, 1) is required, but got F={factor}")]
    InvalidMutationFactor { factor: f64 },

    #[error("there must be at least one generation")]
    ZeroGenerations,

    #[error("there must be at least one worker thread")]
    ZeroThreads,

    #[error("initial guess dimension mismatch: expected {expected}, got {got}")]
    GuessDimensionMismatch { expected: usize, got: usize },

    #[error("initial guess coordinate {index} = {value} lies outside [{lower}, {upper}]")]
    GuessOutOfBounds {
        index: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A specialized `Result` type for differential evolution.
pub type Result<T> = std::result::Result<T, DeError>;

impl DeError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeError::InvalidMutationFactor { .. } => ErrorKind::DomainError,
            DeError::ThreadPool(_) => ErrorKind::Resource,
            _ => ErrorKind::InvalidArgument,
        }
    }

    /// Returns `true` for bounds-related errors.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            DeError::BoundsMismatch { .. }
                | DeError::EmptyBounds
                | DeError::NonFiniteBound { .. }
                | DeError::InvalidBounds { .. }
                | DeError::BoundsTooWide { .. }
        )
    }

    /// Returns `true` for errors about the initial guess.
    pub fn is_guess_error(&self) -> bool {
        matches!(
            self,
            DeError::GuessDimensionMismatch { .. } | DeError::GuessOutOfBounds { .. }
        )
    }
}
