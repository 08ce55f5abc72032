use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use crate::error::CatalogError;
use crate::kv::KeyValueStore;

/// Counters from the write-back worker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PersistenceStats {
    pub writes_succeeded: usize,
    pub writes_failed: usize,
    pub removes_succeeded: usize,
    pub removes_failed: usize,
    /// Snapshots superseded by a newer one for the same key before being written.
    pub coalesced: usize,
    /// Empty collections not written because of the `persist_empty` policy.
    pub skipped_empty: usize,
    pub batches: usize,
}

impl PersistenceStats {
    pub fn failures(&self) -> usize {
        self.writes_failed + self.removes_failed
    }
}

enum Job {
    Write { key: String, payload: String },
    Remove { key: String },
    Flush(Sender<()>),
}

enum Op {
    Write(String),
    Remove,
}

/// Jobs drained from the queue in one go, reduced to the last op per key.
#[derive(Default)]
struct Batch {
    ops: Vec<(String, Op)>,
    waiters: Vec<Sender<()>>,
    coalesced: usize,
}

impl Batch {
    fn push(&mut self, job: Job) {
        let (key, op) = match job {
            Job::Write { key, payload } => (key, Op::Write(payload)),
            Job::Remove { key } => (key, Op::Remove),
            Job::Flush(waiter) => {
                self.waiters.push(waiter);
                return;
            }
        };
        match self.ops.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => {
                slot.1 = op;
                self.coalesced += 1;
            }
            None => self.ops.push((key, op)),
        }
    }

    fn apply<S: KeyValueStore + ?Sized>(self, kv: &S, stats: &Mutex<PersistenceStats>) {
        let mut delta = PersistenceStats {
            coalesced: self.coalesced,
            batches: 1,
            ..PersistenceStats::default()
        };

        for (key, op) in self.ops {
            match op {
                Op::Write(payload) => match kv.set(&key, &payload) {
                    Ok(()) => {
                        debug!(key = %key, bytes = payload.len(), "snapshot written");
                        delta.writes_succeeded += 1;
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "snapshot write failed");
                        delta.writes_failed += 1;
                    }
                },
                Op::Remove => match kv.remove(&key) {
                    Ok(()) => {
                        debug!(key = %key, "snapshot removed");
                        delta.removes_succeeded += 1;
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "snapshot remove failed");
                        delta.removes_failed += 1;
                    }
                },
            }
        }

        {
            let mut stats = stats.lock().unwrap_or_else(PoisonError::into_inner);
            stats.writes_succeeded += delta.writes_succeeded;
            stats.writes_failed += delta.writes_failed;
            stats.removes_succeeded += delta.removes_succeeded;
            stats.removes_failed += delta.removes_failed;
            stats.coalesced += delta.coalesced;
            stats.batches += delta.batches;
        }

        for waiter in self.waiters {
            let _ = waiter.send(());
        }
    }
}

/// A background thread that writes snapshots to a key-value store.
///
/// ## Example
///
/// ```ignore
/// use std::sync::Arc;
/// use gallery_catalog::{InMemoryKeyValueStore, PersistenceWorker};
///
/// let kv = Arc::new(InMemoryKeyValueStore::new());
/// let worker = PersistenceWorker::spawn(kv.clone());
///
/// worker.write("artworks", "[]".to_string());
/// worker.flush()?;
///
/// let stats = worker.stop();
/// assert_eq!(stats.writes_succeeded, 1);
/// ```
pub struct PersistenceWorker {
    jobs: Option<Sender<Job>>,
    stats: Arc<Mutex<PersistenceStats>>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    /// Spawn a worker writing to `kv`.
    pub fn spawn<S>(kv: Arc<S>) -> Self
    where
        S: KeyValueStore + ?Sized + 'static,
    {
        Self::spawn_named(kv, "catalog-persistence")
    }

    /// Spawn a worker with a custom thread name.
    pub fn spawn_named<S>(kv: Arc<S>, name: &str) -> Self
    where
        S: KeyValueStore + ?Sized + 'static,
    {
        let (jobs_tx, jobs_rx) = channel();
        let stats = Arc::new(Mutex::new(PersistenceStats::default()));
        let worker_stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(kv.as_ref(), jobs_rx, &worker_stats));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!(
                    error = %e,
                    "failed to spawn persistence worker; snapshots will not be written"
                );
                None
            }
        };

        Self {
            jobs: Some(jobs_tx),
            stats,
            handle,
        }
    }

    /// Queue a full snapshot for `key`. Returns immediately.
    pub fn write(&self, key: &str, payload: String) {
        self.send(Job::Write {
            key: key.to_string(),
            payload,
        });
    }

    /// Queue removal of `key`. Returns immediately.
    pub fn remove(&self, key: &str) {
        self.send(Job::Remove {
            key: key.to_string(),
        });
    }

    pub(crate) fn record_skipped_empty(&self) {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .skipped_empty += 1;
    }

    /// Block until every job queued before this call has been attempted.
    pub fn flush(&self) -> Result<(), CatalogError> {
        let jobs = self.jobs.as_ref().ok_or(CatalogError::WorkerStopped)?;
        let (done_tx, done_rx) = channel();
        jobs.send(Job::Flush(done_tx))
            .map_err(|_| CatalogError::WorkerStopped)?;
        done_rx.recv().map_err(|_| CatalogError::WorkerStopped)
    }

    pub fn stats(&self) -> PersistenceStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_running(&self) -> bool {
        self.jobs.is_some()
            && self
                .handle
                .as_ref()
                .map_or(false, |handle| !handle.is_finished())
    }

    /// Finish queued writes, stop the thread, and return the final counters.
    pub fn stop(mut self) -> PersistenceStats {
        self.shutdown();
        self.stats()
    }

    pub(crate) fn shutdown(&mut self) {
        // Dropping the sender lets the worker drain what is queued and exit.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("persistence worker panicked");
            }
        }
    }

    fn send(&self, job: Job) {
        let delivered = self
            .jobs
            .as_ref()
            .map_or(false, |jobs| jobs.send(job).is_ok());
        if !delivered {
            warn!("persistence worker stopped; snapshot dropped");
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.jobs.take();
        // Don't join on drop - let the thread finish naturally
    }
}

fn run<S: KeyValueStore + ?Sized>(kv: &S, jobs: Receiver<Job>, stats: &Mutex<PersistenceStats>) {
    while let Ok(first) = jobs.recv() {
        let mut batch = Batch::default();
        batch.push(first);
        while let Ok(job) = jobs.try_recv() {
            batch.push(job);
        }
        batch.apply(kv, stats);
    }
    debug!("persistence worker exiting");
}
