//! Core trait for differential evolution.

/// A scalar cost function over real vectors. Lower is better.
///
/// The runner calls [`cost`](CostFunction::cost) concurrently from several
/// worker threads, hence the `Send + Sync` bound. For a run to be
/// reproducible the cost must be a pure function of its input.
///
/// Returning NaN marks a point as invalid: it never replaces an incumbent.
///
/// Any `Fn(&[f64]) -> f64 + Send + Sync` closure is a cost function:
///
/// ```
/// use u_diffevo::de::CostFunction;
///
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// assert_eq!(sphere.cost(&[3.0, 4.0]), 25.0);
/// ```
///
/// Implement the trait directly to receive per-generation callbacks:
///
/// ```ignore
/// struct Rastrigin;
///
/// impl CostFunction for Rastrigin {
///     fn cost(&self, x: &[f64]) -> f64 { /* ... */ }
///
///     fn on_generation(&self, generation: usize, best_cost: f64) {
///         println!("{generation}: {best_cost}");
///     }
/// }
/// ```
pub trait CostFunction: Send + Sync {
    /// Evaluates the cost of `x`.
    ///
    /// A panic here is not contained: it aborts the whole run.
    fn cost(&self, x: &[f64]) -> f64;

    /// Called after each completed generation with the best cost in the
    /// population (NaN while no valid cost is known).
    ///
    /// The default implementation is a no-op.
    fn on_generation(&self, _generation: usize, _best_cost: f64) {}
}

impl<F> CostFunction for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn cost(&self, x: &[f64]) -> f64 {
        self(x)
    }
}
