//! Orchestrator for a search run.
//!
//! Enumerates the trees, builds the cohorts and the shared delta table, then
//! lets a fixed pool of worker threads drain the cohort queue. Each cohort is
//! refined by a single worker from start to finish; the only state shared
//! between workers is the queue, the survivor list and a few counters.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use kslice_core::{Cohort, InvariantCohortBuilder, KSliceRefiner, RefineError, SubsetDeltaTable};
use tracing::{debug, info, instrument, warn};

use crate::config::SearchConfig;
use crate::report::{RunStats, SearchReport, SurvivingCohort};
use crate::SearchError;

/// FIFO of cohorts waiting for a worker.
#[derive(Debug, Default)]
pub struct CohortQueue {
    cohorts: Mutex<VecDeque<Cohort>>,
}

impl CohortQueue {
    pub fn new(cohorts: impl IntoIterator<Item = Cohort>) -> Self {
        Self {
            cohorts: Mutex::new(cohorts.into_iter().collect()),
        }
    }

    /// Take the oldest cohort, if any is left.
    pub fn pop(&self) -> Option<Cohort> {
        self.cohorts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    pub fn push(&self, cohort: Cohort) {
        self.cohorts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(cohort);
    }

    pub fn len(&self) -> usize {
        self.cohorts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where a cohort stands in its refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortState {
    /// Still several trees; the next signature to compute is at `k`.
    Unresolved { k: usize },
    /// At most one tree left after culling at `k`.
    Resolved { k: usize },
    /// Several trees left and no `k` below the order to try.
    Surviving,
}

impl CohortState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unresolved { .. })
    }
}

/// Advance `cohort` by one step: cull at the current `k` or settle into a
/// terminal state. Terminal states are returned unchanged.
pub fn step(
    cohort: &mut Cohort,
    state: CohortState,
    refiner: &KSliceRefiner<'_>,
    order: usize,
) -> Result<CohortState, RefineError> {
    let CohortState::Unresolved { k } = state else {
        return Ok(state);
    };

    if cohort.is_resolved() {
        return Ok(CohortState::Resolved { k });
    }
    if k >= order {
        return Ok(CohortState::Surviving);
    }

    let kept = refiner.cull(cohort.take_trees(), k)?;
    cohort.replace(kept);

    Ok(if cohort.is_resolved() {
        CohortState::Resolved { k }
    } else {
        CohortState::Unresolved { k: k + 1 }
    })
}

/// Drive `cohort` from `initial_k` to a terminal state.
#[instrument(skip_all, fields(trees = cohort.len(), initial_k = initial_k))]
pub fn refine_cohort(
    cohort: &mut Cohort,
    refiner: &KSliceRefiner<'_>,
    order: usize,
    initial_k: usize,
) -> Result<CohortState, RefineError> {
    let mut state = CohortState::Unresolved { k: initial_k };
    while !state.is_terminal() {
        state = step(cohort, state, refiner, order)?;
    }

    match state {
        CohortState::Resolved { k } => debug!(k, "Cohort resolved"),
        CohortState::Surviving => warn!(trees = cohort.len(), "Cohort survived every k"),
        CohortState::Unresolved { .. } => {}
    }
    Ok(state)
}

/// What one worker did during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WorkerSummary {
    worker: usize,
    processed: usize,
}

/// Everything a worker borrows from the run.
#[derive(Clone, Copy)]
struct WorkerContext<'a> {
    queue: &'a CohortQueue,
    refiner: KSliceRefiner<'a>,
    survivors: &'a Mutex<Vec<Cohort>>,
    deepest_k: &'a AtomicUsize,
    abort: &'a AtomicBool,
    order: usize,
    initial_k: usize,
}

fn run_worker(worker: usize, ctx: WorkerContext<'_>) -> Result<WorkerSummary, SearchError> {
    let mut processed = 0;

    while !ctx.abort.load(Ordering::Relaxed) {
        let Some(mut cohort) = ctx.queue.pop() else {
            break;
        };

        let state = match refine_cohort(&mut cohort, &ctx.refiner, ctx.order, ctx.initial_k) {
            Ok(state) => state,
            Err(e) => {
                ctx.abort.store(true, Ordering::Relaxed);
                return Err(e.into());
            }
        };
        processed += 1;

        match state {
            CohortState::Resolved { k } => {
                ctx.deepest_k.fetch_max(k, Ordering::Relaxed);
            }
            CohortState::Surviving => {
                ctx.deepest_k
                    .fetch_max(ctx.order.saturating_sub(1), Ordering::Relaxed);
                ctx.survivors
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(cohort);
            }
            CohortState::Unresolved { .. } => {}
        }
    }

    debug!(worker, processed, "Worker finished");
    Ok(WorkerSummary { worker, processed })
}

/// Runs a whole search for one configuration.
pub struct Orchestrator {
    config: SearchConfig,
}

impl Orchestrator {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the search to completion.
    ///
    /// Cohorts split apart by the coarse invariants never reach the queue.
    /// Everything else is refined with `k` from `initial_k` up to `order - 1`.
    #[instrument(skip(self), fields(order = self.config.order, threads = self.config.worker_threads))]
    pub fn run(&self) -> Result<SearchReport, SearchError> {
        let started = Instant::now();
        let order = self.config.order;
        let initial_k = self.config.initial_k;
        info!("Starting k-slice search");

        let builder = InvariantCohortBuilder::from_enumeration(order);
        let tree_count = builder.tree_count();
        let cohort_count = builder.cohort_count();
        let pending = builder.into_pending();
        let queued = pending.len();
        let coarse_resolved = cohort_count - queued;
        info!(
            cohorts = cohort_count,
            coarse_resolved, queued, "Built invariant cohorts"
        );

        let edge_count = order.saturating_sub(1);
        let table = SubsetDeltaTable::build(edge_count, initial_k..order)?;
        info!(
            edge_count,
            sequences = table.ks().count(),
            deltas = table.total_deltas(),
            "Built subset delta table"
        );

        let queue = CohortQueue::new(pending);
        let survivors = Mutex::new(Vec::new());
        let deepest_k = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let ctx = WorkerContext {
            queue: &queue,
            refiner: KSliceRefiner::new(&table),
            survivors: &survivors,
            deepest_k: &deepest_k,
            abort: &abort,
            order,
            initial_k,
        };

        let mut summaries = self.run_workers(ctx)?;
        summaries.sort_by_key(|s| s.worker);

        let mut survivors = survivors
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        survivors.sort_by(|a, b| a.key().cmp(b.key()));
        let survivors = survivors
            .into_iter()
            .map(SurvivingCohort::from_cohort)
            .collect::<Result<Vec<_>, _>>()?;

        let deepest = deepest_k.load(Ordering::Relaxed);
        let stats = RunStats {
            order,
            trees: tree_count,
            cohorts: cohort_count,
            coarse_resolved,
            queued,
            per_worker: summaries.iter().map(|s| s.processed).collect(),
            deepest_k: (queued > 0).then_some(deepest),
            elapsed: started.elapsed(),
        };

        info!(
            service_name = "kslice-search",
            service_version = env!("CARGO_PKG_VERSION"),
            trees = stats.trees,
            cohorts = stats.cohorts,
            queued = stats.queued,
            survivors = survivors.len(),
            deepest_k = ?stats.deepest_k,
            per_worker = ?stats.per_worker,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Search finished"
        );

        Ok(SearchReport::new(stats, survivors))
    }

    /// Spawn the worker pool, wait for it and collect the summaries.
    ///
    /// Returns the first error any worker reported.
    fn run_workers(&self, ctx: WorkerContext<'_>) -> Result<Vec<WorkerSummary>, SearchError> {
        let threads = self.config.worker_threads.max(1);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(threads);
            for worker in 0..threads {
                let spawned = thread::Builder::new()
                    .name(format!("kslice-worker-{worker}"))
                    .spawn_scoped(scope, move || run_worker(worker, ctx));
                match spawned {
                    Ok(handle) => handles.push((worker, handle)),
                    Err(e) => {
                        ctx.abort.store(true, Ordering::Relaxed);
                        return Err(SearchError::WorkerSpawn(e));
                    }
                }
            }

            let mut summaries = Vec::with_capacity(threads);
            let mut first_error = None;
            for (worker, handle) in handles {
                match handle.join() {
                    Ok(Ok(summary)) => summaries.push(summary),
                    Ok(Err(e)) => {
                        first_error.get_or_insert(e);
                    }
                    Err(_) => {
                        ctx.abort.store(true, Ordering::Relaxed);
                        first_error.get_or_insert(SearchError::WorkerPanicked(worker));
                    }
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(summaries),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kslice_core::{InvariantKey, TreeGraph};

    fn path(order: usize) -> TreeGraph {
        let edges: Vec<(usize, usize)> = (1..order).map(|v| (v - 1, v)).collect();
        TreeGraph::from_edges(order, &edges).unwrap()
    }

    fn cohort_of(trees: Vec<TreeGraph>) -> Cohort {
        Cohort::new(InvariantKey::of(&trees[0]), trees)
    }

    #[test]
    fn test_queue_is_fifo() {
        let queue = CohortQueue::new([cohort_of(vec![path(3)]), cohort_of(vec![path(4)])]);
        queue.push(cohort_of(vec![path(5)]));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap().trees()[0].order(), 3);
        assert_eq!(queue.pop().unwrap().trees()[0].order(), 4);
        assert_eq!(queue.pop().unwrap().trees()[0].order(), 5);
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_isomorphic_pair_survives_every_k() {
        let original = path(5);
        let copy = original.relabeled(&[2, 4, 0, 1, 3]).unwrap();
        let mut cohort = cohort_of(vec![original, copy]);
        let table = SubsetDeltaTable::build(4, 3..5).unwrap();
        let refiner = KSliceRefiner::new(&table);

        let mut state = CohortState::Unresolved { k: 3 };
        state = step(&mut cohort, state, &refiner, 5).unwrap();
        assert_eq!(state, CohortState::Unresolved { k: 4 });
        state = step(&mut cohort, state, &refiner, 5).unwrap();
        assert_eq!(state, CohortState::Unresolved { k: 5 });
        state = step(&mut cohort, state, &refiner, 5).unwrap();
        assert_eq!(state, CohortState::Surviving);
        assert_eq!(cohort.len(), 2);

        // Terminal states stay put.
        assert_eq!(
            step(&mut cohort, state, &refiner, 5).unwrap(),
            CohortState::Surviving
        );
    }

    #[test]
    fn test_distinguishable_pair_resolves() {
        let builder = InvariantCohortBuilder::from_enumeration(10);
        let mut pair = builder.into_pending().pop().unwrap();
        let table = SubsetDeltaTable::build(9, 3..10).unwrap();
        let refiner = KSliceRefiner::new(&table);

        let state = refine_cohort(&mut pair, &refiner, 10, 3).unwrap();

        assert!(matches!(state, CohortState::Resolved { k } if (3..9).contains(&k)));
        assert!(pair.is_empty());
    }

    #[test]
    fn test_missing_sequence_stops_refinement() {
        let mut cohort = cohort_of(vec![path(5), path(5).relabeled(&[4, 3, 2, 1, 0]).unwrap()]);
        let table = SubsetDeltaTable::build(4, [3]).unwrap();
        let refiner = KSliceRefiner::new(&table);

        assert_eq!(
            refine_cohort(&mut cohort, &refiner, 5, 3),
            Err(RefineError::MissingSequence(4))
        );
    }

    #[test]
    fn test_single_tree_cohort_resolves_without_work() {
        let mut cohort = cohort_of(vec![path(6)]);
        let table = SubsetDeltaTable::default();
        let refiner = KSliceRefiner::new(&table);

        assert_eq!(
            refine_cohort(&mut cohort, &refiner, 6, 3).unwrap(),
            CohortState::Resolved { k: 3 }
        );
    }
}
