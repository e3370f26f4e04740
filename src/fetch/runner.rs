use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use futures::future::{join_all, FutureExt};
use log::debug;

use crate::config::{resolve_limit, ConcurrencyConfig};

/// Message stored when a failed task carries no description of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Result types that can represent a failed task as data.
pub trait FromFailure {
    fn from_failure(message: String) -> Self;

    fn is_failure(&self) -> bool;
}

/// Shared claim point and in-flight counter for a single runner invocation.
#[derive(Debug)]
pub struct PoolState {
    count: usize,
    next_index: AtomicUsize,
    active: AtomicUsize,
    peak_active: AtomicUsize,
}

impl PoolState {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            next_index: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak_active: AtomicUsize::new(0),
        }
    }

    /// Claim the next unassigned index and mark it active.
    /// Returns `None` once every index has been handed out.
    pub fn claim(&self) -> Option<usize> {
        let count = self.count;
        let claimed = self
            .next_index
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
                (next < count).then_some(next + 1)
            })
            .ok()?;

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);
        Some(claimed)
    }

    /// Record that a claimed task has settled.
    pub fn settle(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn next_index(&self) -> usize {
        self.next_index.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    /// All indices claimed and nothing left in flight.
    pub fn is_complete(&self) -> bool {
        self.next_index() == self.count && self.active() == 0
    }
}

/// Totals reported once a run has drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub peak_active: usize,
}

/// Run `worker` for every index in `0..count` with at most `limit` tasks in
/// flight, returning one result per index in index order.
///
/// Failed or panicking tasks are stored as failure records; the run itself
/// never fails. `limit` of `None` or zero falls back to the ceiling configured
/// through the environment.
pub async fn run_with_concurrency_limit<T, E, F, Fut>(
    count: usize,
    worker: F,
    limit: Option<usize>,
) -> Vec<T>
where
    T: FromFailure,
    E: Display,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let default_limit = ConcurrencyConfig::from_env().limit;
    run_pool(count, worker, resolve_limit(limit, default_limit))
        .await
        .0
}

/// Same as [`run_with_concurrency_limit`] with an already resolved ceiling,
/// also returning the run summary.
pub async fn run_pool<T, E, F, Fut>(count: usize, worker: F, limit: usize) -> (Vec<T>, RunSummary)
where
    T: FromFailure,
    E: Display,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if count == 0 {
        return (Vec::new(), RunSummary::default());
    }

    let effective = limit.max(1).min(count);
    let state = PoolState::new(count);
    let slots: Mutex<Vec<Option<T>>> = Mutex::new((0..count).map(|_| None).collect());

    debug!(
        "Starting pool of {} workers for {} tasks (ceiling {})",
        effective, count, limit
    );

    let lanes = (0..effective).map(|_| drain_lane(&state, &slots, &worker));
    join_all(lanes).await;

    debug_assert!(state.is_complete());

    let results: Vec<T> = slots
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| T::from_failure(UNKNOWN_ERROR.to_string())))
        .collect();

    let failed = results.iter().filter(|result| result.is_failure()).count();
    let summary = RunSummary {
        total: count,
        succeeded: count - failed,
        failed,
        peak_active: state.peak_active(),
    };

    debug!(
        "Pool drained: {} succeeded, {} failed, peak {} in flight",
        summary.succeeded, summary.failed, summary.peak_active
    );

    (results, summary)
}

// One lane keeps claiming indices until the pool is exhausted, so each
// settlement immediately frees capacity for the next claim.
async fn drain_lane<T, E, F, Fut>(state: &PoolState, slots: &Mutex<Vec<Option<T>>>, worker: &F)
where
    T: FromFailure,
    E: Display,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    while let Some(index) = state.claim() {
        // Call the worker inside the guarded future so a panic while building
        // the task is caught as well.
        let task = async { worker(index).await };
        let outcome = match AssertUnwindSafe(task).catch_unwind().await {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => T::from_failure(failure_message(&err)),
            Err(payload) => T::from_failure(panic_message(payload.as_ref())),
        };

        {
            let mut guard = slots.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = guard.get_mut(index) {
                debug_assert!(slot.is_none(), "slot {index} written twice");
                *slot = Some(outcome);
            }
        }

        state.settle();
    }
}

/// Description of an error, or the fallback when it has none.
pub fn failure_message<E: Display + ?Sized>(err: &E) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());

    match message {
        Some(text) => failure_message(&text),
        None => UNKNOWN_ERROR.to_string(),
    }
}
