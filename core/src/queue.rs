use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// The default number of worker threads when the caller does not specify.
pub const DEFAULT_THREADS: usize = 5;

struct Shared {
    queue: Mutex<VecDeque<Job>>,
    /// Signaled when work arrives or shutdown is requested.
    work_available: Condvar,
    pending: Mutex<usize>,
    /// Signaled when the pending count drains to zero.
    quiescent: Condvar,
    shutdown: AtomicBool,
}

/// Fixed-size worker pool. Workers start at construction and block on the
/// queue until work arrives or [`WorkQueue::shutdown`] is called.
///
/// The pool tracks how many submitted jobs have not yet completed, so
/// [`WorkQueue::finish`] can block until everything drains, including jobs
/// submitted by other jobs. The pool stays usable after `finish`; `shutdown`
/// is terminal.
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            work_available: Condvar::new(),
            pending: Mutex::new(0),
            quiescent: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        tracing::debug!(threads, "starting work queue");
        let workers = (0..threads)
            .map(|id| {
                let shared = shared.clone();
                std::thread::spawn(move || worker_loop(id, &shared))
            })
            .collect();

        WorkQueue { shared, workers }
    }

    /// Enqueues a job for execution by one of the workers.
    ///
    /// The pending count is raised before the job becomes visible to any
    /// worker, so a `finish` that races with `execute` can never observe a
    /// premature zero. Submitting after `shutdown` is a caller bug; the job
    /// would never run.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        debug_assert!(
            !self.shared.shutdown.load(Ordering::Acquire),
            "execute called after shutdown"
        );
        *self.shared.pending.lock() += 1;
        self.shared.queue.lock().push_back(Box::new(job));
        self.shared.work_available.notify_one();
    }

    /// Blocks until all submitted work has completed. Returns immediately
    /// when already quiescent, so alternating build and crawl phases can
    /// reuse one pool with repeated calls.
    pub fn finish(&self) {
        let mut pending = self.shared.pending.lock();
        while *pending > 0 {
            self.shared.quiescent.wait(&mut pending);
        }
    }

    /// Signals workers to exit. Jobs already running complete; queued jobs
    /// that no worker has picked up are abandoned. The pool cannot be
    /// reused afterwards.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.work_available.notify_all();
    }

    /// Waits for pending work, then shuts down and joins the workers.
    pub fn join(mut self) {
        self.finish();
        self.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }

    /// Number of worker threads in the pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(id: usize, shared: &Shared) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if shared.shutdown.load(Ordering::Acquire) {
                    return;
                }
                match queue.pop_front() {
                    Some(job) => break job,
                    None => shared.work_available.wait(&mut queue),
                }
            }
        };

        // A panicking job must not kill the worker or strand the pending
        // count; quiescence still has to be reached.
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!(worker = id, "job panicked");
        }

        let mut pending = shared.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            shared.quiescent.notify_all();
        }
    }
}
