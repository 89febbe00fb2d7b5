//! Bounded worker pool for fan-out checks.
//!
//! Jobs are dispatched to at most `workers` scoped OS threads and joined
//! before [`run_bounded`] returns. Results come back in submission
//! order whatever the completion order was, and a panicking job is
//! contained: its slot reports [`TaskOutcome::Panicked`] while every
//! other job still runs. There is no fail-fast path.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::debug;

/// A unit of pooled work.
pub type BoxedCheck<'env, T> = Box<dyn FnOnce() -> T + Send + 'env>;

/// Terminal state of one pooled job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    Completed(T),
    Panicked { message: String },
}

/// One job's identifier and outcome, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult<T> {
    pub id: String,
    pub outcome: TaskOutcome<T>,
}

/// Run `jobs` on a pool of at most `workers` threads and collect every
/// outcome. A `workers` of zero is treated as one.
pub fn run_bounded<'env, T: Send>(
    workers: usize,
    jobs: Vec<(String, BoxedCheck<'env, T>)>,
) -> Vec<TaskResult<T>> {
    if jobs.is_empty() {
        return Vec::new();
    }
    let worker_count = workers.max(1).min(jobs.len());

    let mut ids = Vec::with_capacity(jobs.len());
    let mut cells: Vec<Mutex<Option<BoxedCheck<'env, T>>>> = Vec::with_capacity(jobs.len());
    for (id, job) in jobs {
        ids.push(id);
        cells.push(Mutex::new(Some(job)));
    }
    let slots: Vec<Mutex<Option<TaskOutcome<T>>>> =
        cells.iter().map(|_| Mutex::new(None)).collect();
    let next = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for worker in 0..worker_count {
            let cells = &cells;
            let slots = &slots;
            let ids = &ids;
            let next = &next;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                if index >= cells.len() {
                    break;
                }
                // Each index is claimed by exactly one worker; the cell
                // can only be empty if that claim was already consumed.
                let Some(job) = cells[index].lock().take() else {
                    continue;
                };
                debug!(job = %ids[index], worker, "check_dispatch");
                let outcome = match catch_unwind(AssertUnwindSafe(job)) {
                    Ok(value) => TaskOutcome::Completed(value),
                    Err(payload) => TaskOutcome::Panicked {
                        message: panic_message(payload.as_ref()),
                    },
                };
                *slots[index].lock() = Some(outcome);
            });
        }
    });

    let total = ids.len();
    let results: Vec<TaskResult<T>> = ids
        .into_iter()
        .zip(slots)
        .map(|(id, slot)| {
            let outcome = slot.into_inner().unwrap_or(TaskOutcome::Panicked {
                message: "result slot left empty".to_owned(),
            });
            TaskResult { id, outcome }
        })
        .collect();
    debug!(total, workers = worker_count, "pool_joined");
    results
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic payload of unknown type".to_owned()
    }
}
