//! Shared run state: cancellation, live minimum and query log.
//!
//! These objects are owned by the caller and handed to the runner by
//! reference through [`DeHooks`]. They may be read from other threads while
//! a run is in progress. Updates are lock-free and best-effort: a reader
//! can observe a value that is one evaluation stale, never a torn one.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag.
///
/// Cloning yields a handle to the same flag. The runner polls it at every
/// generation boundary and before each evaluation of a trial; an
/// evaluation already in progress always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any
    /// clone of this token.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl From<Arc<AtomicBool>> for CancellationToken {
    fn from(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

/// A lock-free `f64` cell tracking the smallest cost seen so far.
///
/// NaN means "unknown" and is replaced by the first non-NaN value.
/// Afterwards the value only decreases.
#[derive(Debug)]
pub struct AtomicCost {
    bits: AtomicU64,
}

impl AtomicCost {
    /// Creates a cell holding `value`. Pass NaN to start out unknown.
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    /// Current value.
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Lowers the stored value to `value` if it is strictly smaller (or the
    /// stored value is NaN). Returns `true` if the cell changed.
    pub fn update_min(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        self.bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let current = f64::from_bits(bits);
                (current.is_nan() || value < current).then_some(value.to_bits())
            })
            .is_ok()
    }
}

impl Default for AtomicCost {
    fn default() -> Self {
        Self::new(f64::INFINITY)
    }
}

/// One evaluated point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Query {
    /// The evaluated coordinates.
    pub point: Vec<f64>,
    /// Cost returned for `point`. Only initial-population entries can be NaN.
    pub cost: f64,
}

/// Append-only record of evaluated points.
///
/// Entries arrive in completion order, which differs between runs when
/// more than one worker thread is used.
#[derive(Debug, Default)]
pub struct QueryLog {
    entries: Mutex<Vec<Query>>,
}

impl QueryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a copy of `point` with its cost.
    pub fn push(&self, point: &[f64], cost: f64) {
        self.entries.lock().push(Query {
            point: point.to_vec(),
            cost,
        });
    }

    /// Number of entries recorded so far.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns a copy of the entries recorded so far.
    pub fn snapshot(&self) -> Vec<Query> {
        self.entries.lock().clone()
    }

    /// Consumes the log and returns its entries.
    pub fn into_inner(self) -> Vec<Query> {
        self.entries.into_inner()
    }
}

/// Optional observers and stop conditions for a run.
///
/// All fields default to `None`.
///
/// ```
/// use u_diffevo::de::{AtomicCost, CancellationToken, DeHooks, QueryLog};
///
/// let cancel = CancellationToken::new();
/// let log = QueryLog::new();
/// let best = AtomicCost::default();
/// let hooks = DeHooks::default()
///     .with_target(1e-6)
///     .with_cancel(&cancel)
///     .with_queries(&log)
///     .with_current_minimum(&best);
/// assert_eq!(hooks.target(), Some(1e-6));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DeHooks<'a> {
    /// Stop once any cost is `<=` this value. NaN disables the check.
    pub target_value: Option<f64>,

    /// Polled between generations and before each trial evaluation.
    pub cancel: Option<&'a CancellationToken>,

    /// Receives every evaluated point with a valid cost, plus every
    /// point of the initial population.
    pub queries: Option<&'a QueryLog>,

    /// Receives the smallest cost observed during the run.
    pub current_minimum: Option<&'a AtomicCost>,
}

impl<'a> DeHooks<'a> {
    /// Sets the target cost.
    pub fn with_target(mut self, target: f64) -> Self {
        self.target_value = Some(target);
        self
    }

    /// Sets the cancellation token.
    pub fn with_cancel(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Sets the log that receives evaluated points.
    pub fn with_queries(mut self, queries: &'a QueryLog) -> Self {
        self.queries = Some(queries);
        self
    }

    /// Sets the cell that tracks the smallest cost seen.
    pub fn with_current_minimum(mut self, cell: &'a AtomicCost) -> Self {
        self.current_minimum = Some(cell);
        self
    }

    /// The effective target: `None` when unset or NaN.
    pub fn target(&self) -> Option<f64> {
        self.target_value.filter(|t| !t.is_nan())
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancellationToken::is_cancelled)
    }
}
