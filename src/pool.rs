use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread;

use crate::database_error::DatabaseError;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(0);

type JobFn<T> = Box<dyn FnOnce() -> Result<T, DatabaseError> + Send>;

enum JobState<T> {
    Pending(JobFn<T>),
    Running,
    Done(Result<T, String>),
}

/// The shared core of one dispatched job. The state lock is never held while the
/// job itself runs, so the non-blocking accessors stay non-blocking.
struct JobCore<T> {
    id: u64,
    state: Mutex<JobState<T>>,
    done: Condvar,
}

impl<T: Send> JobCore<T> {
    fn new(f: JobFn<T>) -> Self {
        Self {
            id: NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(JobState::Pending(f)),
            done: Condvar::new(),
        }
    }

    /// Run the job if it is still pending. A second run attempt is a misuse
    /// guard, not a wait: it fails instead of re-executing or blocking.
    fn execute(&self) -> Result<(), DatabaseError> {
        let f = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            match std::mem::replace(&mut *state, JobState::Running) {
                JobState::Pending(f) => f,
                other => {
                    *state = other;
                    return Err(DatabaseError::Async(format!(
                        "job {} has already been run",
                        self.id
                    )));
                }
            }
        };

        let result = match catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(error.to_string()),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "worker panicked".to_string());
                Err(format!("worker panicked: {message}"))
            }
        };

        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = JobState::Done(result);
        self.done.notify_all();
        Ok(())
    }
}

trait Runnable: Send + Sync {
    fn run(&self);
}

impl<T: Send + Sync> Runnable for JobCore<T> {
    fn run(&self) {
        // A stolen (preempted) job reports already-run here; nothing to do
        let _ = self.execute();
    }
}

/// A stand-in for a result still being computed on a pool worker.
///
/// The non-blocking accessors ([`job_id`](Self::job_id),
/// [`is_ready`](Self::is_ready)) never trigger execution. [`value`](Self::value)
/// blocks until the worker finishes, then returns the result; every later call
/// returns the same cached result without re-running anything. A worker failure
/// or panic is captured and re-surfaced here as an error, preserving synchronous
/// error semantics.
pub struct AsyncValue<T> {
    core: Arc<JobCore<T>>,
    preempt: bool,
}

impl<T: Send + Sync + Clone> AsyncValue<T> {
    pub fn job_id(&self) -> u64 {
        self.core.id
    }

    pub fn is_ready(&self) -> bool {
        let state = match self.core.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        matches!(*state, JobState::Done(_))
    }

    pub fn value(&self) -> Result<T, DatabaseError> {
        if self.preempt {
            // Run the job on this thread instead of idle-waiting if no worker
            // has picked it up yet
            if self.core.execute().is_ok() {
                tracing::debug!("preempted job {} onto the calling thread", self.core.id);
            }
        }

        let mut state = match self.core.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        loop {
            match &*state {
                JobState::Done(Ok(value)) => return Ok(value.clone()),
                JobState::Done(Err(message)) => {
                    return Err(DatabaseError::Async(message.clone()))
                }
                _ => {
                    state = match self.core.done.wait(state) {
                        Ok(state) => state,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                }
            }
        }
    }
}

/// Pool sizing and behavior knobs. The worker count defaults to the connection
/// count, which itself defaults to 4.
pub struct PoolConfig {
    pub max_connections: usize,
    pub num_workers: Option<usize>,
    pub preempt: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 4,
            num_workers: None,
            preempt: false,
        }
    }
}

/// A fixed-size worker pool that runs dispatched jobs on their own threads and
/// hands back [`AsyncValue`] proxies immediately. Refuses to be built on a
/// single-connection configuration: with one connection there is no concurrency
/// to exploit, only connection-sharing races to invite.
pub struct AsyncDispatchPool {
    sender: Option<mpsc::Sender<Arc<dyn Runnable>>>,
    workers: Vec<thread::JoinHandle<()>>,
    preempt: bool,
}

impl AsyncDispatchPool {
    pub fn new(config: PoolConfig) -> Result<Self, DatabaseError> {
        if config.max_connections <= 1 {
            return Err(DatabaseError::Config(
                "async dispatch requires a multi-connection pool".into(),
            ));
        }
        let num_workers = config.num_workers.unwrap_or(config.max_connections);
        if num_workers == 0 {
            return Err(DatabaseError::Config(
                "async dispatch requires at least one worker".into(),
            ));
        }

        let (sender, receiver) = mpsc::channel::<Arc<dyn Runnable>>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..num_workers)
            .map(|index| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("async-dispatch-{index}"))
                    .spawn(move || loop {
                        let job = {
                            let receiver = match receiver.lock() {
                                Ok(receiver) => receiver,
                                Err(poisoned) => poisoned.into_inner(),
                            };
                            receiver.recv()
                        };
                        match job {
                            Ok(job) => job.run(),
                            Err(_) => break,
                        }
                    })
                    .map_err(|e| DatabaseError::Config(format!("cannot spawn pool worker: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            sender: Some(sender),
            workers,
            preempt: config.preempt,
        })
    }

    /// Submit one unit of work. Returns immediately; the job runs on a worker
    /// thread (or, under preempt mode, possibly on the first thread to demand
    /// the value).
    pub fn dispatch<T, F>(&self, f: F) -> Result<AsyncValue<T>, DatabaseError>
    where
        T: Send + Sync + Clone + 'static,
        F: FnOnce() -> Result<T, DatabaseError> + Send + 'static,
    {
        let core = Arc::new(JobCore::new(Box::new(f)));
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| DatabaseError::Async("pool is shut down".into()))?;
        sender
            .send(Arc::clone(&core) as Arc<dyn Runnable>)
            .map_err(|_| DatabaseError::Async("pool workers are gone".into()))?;
        Ok(AsyncValue {
            core,
            preempt: self.preempt,
        })
    }
}

impl Drop for AsyncDispatchPool {
    fn drop(&mut self) {
        // Closing the channel lets the workers drain and exit
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
