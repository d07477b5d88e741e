//! Parallel cost evaluation and greedy selection.
//!
//! Population indices are dealt to `T` workers round-robin: index `i` goes
//! to worker `i % T`. Each worker owns its indices exclusively for the
//! duration of a sweep, so population and cost entries are mutated without
//! locks. Every sweep is a rayon scope and returns only after all workers
//! have finished.

use super::error::Result;
use super::state::DeHooks;
use super::types::CostFunction;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, Ordering};

/// Evaluates populations on a fixed pool of worker threads.
pub(crate) struct Evaluator<'a, C: ?Sized> {
    cost_fn: &'a C,
    hooks: DeHooks<'a>,
    target: Option<f64>,
    target_attained: AtomicBool,
    pool: ThreadPool,
    threads: usize,
}

impl<'a, C: CostFunction + ?Sized> Evaluator<'a, C> {
    pub(crate) fn new(cost_fn: &'a C, hooks: DeHooks<'a>, threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("de-worker-{i}"))
            .build()?;
        Ok(Self {
            cost_fn,
            target: hooks.target(),
            hooks,
            target_attained: AtomicBool::new(false),
            pool,
            threads,
        })
    }

    pub(crate) fn target_attained(&self) -> bool {
        self.target_attained.load(Ordering::Relaxed)
    }

    /// `true` once the run should stop: target reached or cancelled.
    pub(crate) fn should_stop(&self) -> bool {
        self.target_attained() || self.hooks.is_cancelled()
    }

    /// Records a cost in the live minimum and checks the target.
    fn observe(&self, cost: f64) {
        if let Some(cell) = self.hooks.current_minimum {
            cell.update_min(cost);
        }
        if let Some(target) = self.target {
            if cost <= target {
                self.target_attained.store(true, Ordering::Relaxed);
            }
        }
    }

    /// Evaluates every individual of the initial population into `costs`.
    ///
    /// Every index is evaluated regardless of stop conditions, so all
    /// costs are known (possibly NaN) on return.
    pub(crate) fn evaluate_initial(&self, population: &[Vec<f64>], costs: &mut [f64]) {
        let items = population.iter().zip(costs.iter_mut());
        self.sweep(items, false, |(individual, cost)| {
            *cost = self.cost_fn.cost(individual);
            self.observe(*cost);
            if let Some(log) = self.hooks.queries {
                log.push(individual, *cost);
            }
        });
    }

    /// Evaluates each trial and replaces the incumbent at the same index
    /// when the trial is strictly better or the incumbent cost is NaN.
    ///
    /// NaN trials are discarded without being logged. Workers stop taking
    /// new indices once the run should stop.
    pub(crate) fn evaluate_and_select(
        &self,
        population: &mut [Vec<f64>],
        costs: &mut [f64],
        trials: &[Vec<f64>],
    ) {
        let items = population.iter_mut().zip(costs.iter_mut()).zip(trials);
        self.sweep(items, true, |((incumbent, cost), trial)| {
            let trial_cost = self.cost_fn.cost(trial);
            if trial_cost.is_nan() {
                return;
            }
            if let Some(log) = self.hooks.queries {
                log.push(trial, trial_cost);
            }
            if trial_cost < *cost || cost.is_nan() {
                *cost = trial_cost;
                incumbent.clone_from(trial);
                self.observe(trial_cost);
            }
        });
    }

    /// Deals `items` round-robin to the workers and runs `work` on each.
    ///
    /// With `poll` set, a worker checks the stop conditions before each
    /// item and abandons the rest of its share once they hold.
    fn sweep<I, W>(&self, items: I, poll: bool, work: W)
    where
        I: Iterator,
        I::Item: Send,
        W: Fn(I::Item) + Sync,
    {
        let mut shares: Vec<Vec<I::Item>> = (0..self.threads).map(|_| Vec::new()).collect();
        for (i, item) in items.enumerate() {
            shares[i % self.threads].push(item);
        }

        let work = &work;
        self.pool.scope(|s| {
            for share in shares {
                s.spawn(move |_| {
                    for item in share {
                        if poll && self.should_stop() {
                            return;
                        }
                        work(item);
                    }
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::state::{AtomicCost, CancellationToken, QueryLog};
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::thread::ThreadId;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    fn points(n: usize) -> Vec<Vec<f64>> {
        (0..n).map(|i| vec![i as f64, -(i as f64)]).collect()
    }

    #[test]
    fn test_initial_costs() {
        let cost_fn = sphere;
        let evaluator = Evaluator::new(&cost_fn, DeHooks::default(), 3).unwrap();
        let pop = points(10);
        let mut costs = vec![f64::NAN; 10];
        evaluator.evaluate_initial(&pop, &mut costs);
        for (x, c) in pop.iter().zip(&costs) {
            assert_eq!(*c, sphere(x));
        }
    }

    #[test]
    fn test_initial_logs_and_minimum() {
        let log = QueryLog::new();
        let minimum = AtomicCost::default();
        let hooks = DeHooks::default()
            .with_queries(&log)
            .with_current_minimum(&minimum);
        let cost_fn = sphere;
        let evaluator = Evaluator::new(&cost_fn, hooks, 4).unwrap();
        let pop = points(9);
        let mut costs = vec![f64::NAN; 9];
        evaluator.evaluate_initial(&pop, &mut costs);

        assert_eq!(log.len(), 9);
        assert_eq!(minimum.load(), 0.0);
        let logged: HashSet<u64> = log.snapshot().iter().map(|q| q.cost.to_bits()).collect();
        let expected: HashSet<u64> = costs.iter().map(|c| c.to_bits()).collect();
        assert_eq!(logged, expected);
    }

    #[test]
    fn test_initial_evaluates_everything_even_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = AtomicUsize::new(0);
        let cost_fn = |x: &[f64]| {
            calls.fetch_add(1, Ordering::Relaxed);
            sphere(x)
        };
        let evaluator = Evaluator::new(&cost_fn, DeHooks::default().with_cancel(&cancel), 2).unwrap();
        let mut costs = vec![f64::NAN; 6];
        evaluator.evaluate_initial(&points(6), &mut costs);
        assert_eq!(calls.load(Ordering::Relaxed), 6);
        assert!(costs.iter().all(|c| !c.is_nan()));
    }

    #[test]
    fn test_target_flag() {
        let cost_fn = sphere;
        let hooks = DeHooks::default().with_target(1.0);
        let evaluator = Evaluator::new(&cost_fn, hooks, 2).unwrap();
        assert!(!evaluator.target_attained());
        let mut costs = vec![f64::NAN; 5];
        evaluator.evaluate_initial(&points(5), &mut costs);
        assert!(evaluator.target_attained());
        assert!(evaluator.should_stop());
    }

    #[test]
    fn test_nan_target_never_fires() {
        let cost_fn = sphere;
        let hooks = DeHooks::default().with_target(f64::NAN);
        let evaluator = Evaluator::new(&cost_fn, hooks, 2).unwrap();
        let mut costs = vec![f64::NAN; 5];
        evaluator.evaluate_initial(&points(5), &mut costs);
        assert!(!evaluator.target_attained());
    }

    #[test]
    fn test_selection_is_greedy() {
        let cost_fn = sphere;
        let evaluator = Evaluator::new(&cost_fn, DeHooks::default(), 3).unwrap();
        let mut pop = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let mut costs = vec![1.0, 4.0, f64::NAN, 16.0];
        let trials = vec![vec![0.5], vec![3.0], vec![5.0], vec![4.0]];
        evaluator.evaluate_and_select(&mut pop, &mut costs, &trials);

        // Better trial wins.
        assert_eq!(pop[0], vec![0.5]);
        assert_eq!(costs[0], 0.25);
        // Worse trial loses.
        assert_eq!(pop[1], vec![2.0]);
        assert_eq!(costs[1], 4.0);
        // NaN incumbent is always replaced.
        assert_eq!(pop[2], vec![5.0]);
        assert_eq!(costs[2], 25.0);
        // Equal cost is not an improvement.
        assert_eq!(costs[3], 16.0);
    }

    #[test]
    fn test_nan_trial_is_discarded() {
        let log = QueryLog::new();
        let cost_fn = |x: &[f64]| if x[0] < 0.0 { f64::NAN } else { x[0] };
        let evaluator = Evaluator::new(&cost_fn, DeHooks::default().with_queries(&log), 2).unwrap();
        let mut pop = vec![vec![1.0], vec![f64::NAN], vec![2.0], vec![3.0]];
        let mut costs = vec![1.0, f64::NAN, 2.0, 3.0];
        let trials = vec![vec![-1.0], vec![-2.0], vec![0.5], vec![-3.0]];
        evaluator.evaluate_and_select(&mut pop, &mut costs, &trials);

        assert_eq!(pop[0], vec![1.0]);
        assert!(costs[1].is_nan());
        assert_eq!(pop[2], vec![0.5]);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_selection_skips_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = AtomicUsize::new(0);
        let cost_fn = |x: &[f64]| {
            calls.fetch_add(1, Ordering::Relaxed);
            sphere(x)
        };
        let evaluator = Evaluator::new(&cost_fn, DeHooks::default().with_cancel(&cancel), 2).unwrap();
        let mut pop = points(6);
        let mut costs = vec![100.0; 6];
        let trials = vec![vec![0.0, 0.0]; 6];
        evaluator.evaluate_and_select(&mut pop, &mut costs, &trials);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert!(costs.iter().all(|&c| c == 100.0));
    }

    #[test]
    fn test_round_robin_partition() {
        // With one thread per worker share, the thread that evaluates index
        // i also evaluates i + T.
        let threads = 3;
        let seen: Mutex<Vec<(usize, ThreadId)>> = Mutex::new(Vec::new());
        let cost_fn = |x: &[f64]| {
            seen.lock()
                .unwrap()
                .push((x[0] as usize, std::thread::current().id()));
            0.0
        };
        let evaluator = Evaluator::new(&cost_fn, DeHooks::default(), threads).unwrap();
        let pop: Vec<Vec<f64>> = (0..9).map(|i| vec![i as f64]).collect();
        let mut costs = vec![f64::NAN; 9];
        evaluator.evaluate_initial(&pop, &mut costs);

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 9);
        let thread_of = |i: usize| seen.iter().find(|(k, _)| *k == i).map(|(_, t)| *t);
        for i in 0..threads {
            assert_eq!(thread_of(i), thread_of(i + threads));
            assert_eq!(thread_of(i), thread_of(i + 2 * threads));
        }
    }

    #[test]
    #[should_panic(expected = "cost function failed")]
    fn test_cost_panic_propagates() {
        let cost_fn = |x: &[f64]| {
            if x[0] == 4.0 {
                panic!("cost function failed");
            }
            0.0
        };
        let evaluator = Evaluator::new(&cost_fn, DeHooks::default(), 2).unwrap();
        let pop: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let mut costs = vec![f64::NAN; 6];
        evaluator.evaluate_initial(&pop, &mut costs);
    }
}
