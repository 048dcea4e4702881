//! Single-flight extraction scheduler.
//!
//! Extraction is blocking, so it runs on a small pool of worker threads.
//! Concurrent requests for the same archive share one extraction: the first
//! caller enqueues a task, later callers join its waiter list, and every
//! waiter receives the same result.
//!
//! ```text
//! extract(a) ──► cache hit? ──► Ok(dir)
//!                   │ no
//!                   ▼
//!            in-flight[a] exists? ──► join waiters
//!                   │ no
//!                   ▼
//!            insert in-flight[a], enqueue ──► worker ──► record + broadcast
//! ```

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Condvar, Mutex};

use super::cache::ResolutionCache;
use super::extract::{ExtractError, extract_archive};
use crate::{debug, log};

/// Result broadcast to every waiter of one extraction.
pub type ExtractResult = Result<PathBuf, ExtractError>;

type Waiter = Sender<ExtractResult>;

struct Task {
    archive: PathBuf,
    target: PathBuf,
}

/// Worker pool performing at most one extraction per archive at a time.
pub struct ExtractScheduler {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

struct Shared {
    cache: Arc<ResolutionCache>,
    /// Pending tasks
    queue: Mutex<VecDeque<Task>>,
    /// Archive → waiters of the running or queued extraction
    inflight: DashMap<PathBuf, Vec<Waiter>>,
    /// Worker notification
    notify: Condvar,
    shutdown: AtomicBool,
    /// Extractions actually performed
    runs: AtomicUsize,
}

// =============================================================================
// Public API
// =============================================================================

impl ExtractScheduler {
    /// Spawn `workers` extraction threads.
    pub fn start(cache: Arc<ResolutionCache>, workers: usize) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            cache,
            queue: Mutex::new(VecDeque::new()),
            inflight: DashMap::new(),
            notify: Condvar::new(),
            shutdown: AtomicBool::new(false),
            runs: AtomicUsize::new(0),
        });

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers.max(1) {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("extract-{i}"))
                .spawn(move || shared.run_worker())?;
            handles.push(handle);
        }

        Ok(Self {
            shared,
            workers: Mutex::new(handles),
        })
    }

    /// Extract `archive` into `target`, or join an extraction already in flight.
    ///
    /// Blocks until the extraction finishes. Successful results are recorded
    /// in the cache; failures are not, so a later call retries.
    pub fn extract(&self, archive: &Path, target: &Path) -> ExtractResult {
        let shared = &self.shared;
        if let Some(dir) = shared.cache.get_extracted(archive) {
            return Ok(dir);
        }
        if shared.is_shutdown() {
            return Err(aborted(archive));
        }

        let (tx, rx) = channel::bounded(1);
        let enqueue = match shared.inflight.entry(archive.to_path_buf()) {
            Entry::Occupied(mut e) => {
                e.get_mut().push(tx);
                false
            }
            Entry::Vacant(e) => {
                // Re-check under the entry lock: a worker records before it
                // clears its in-flight entry.
                if let Some(dir) = shared.cache.get_extracted(archive) {
                    return Ok(dir);
                }
                e.insert(vec![tx]);
                true
            }
        };

        if enqueue {
            shared.enqueue(Task {
                archive: archive.to_path_buf(),
                target: target.to_path_buf(),
            });
        }

        recv(rx, archive)
    }

    /// Number of extractions performed so far.
    pub fn runs(&self) -> usize {
        self.shared.runs.load(Ordering::SeqCst)
    }

    /// Stop the workers and fail every queued task.
    ///
    /// Running extractions get a bounded amount of time to finish.
    pub fn shutdown(&self) {
        let pending: Vec<Task> = {
            let mut queue = self.shared.queue.lock();
            self.shared.shutdown.store(true, Ordering::SeqCst);
            self.shared.notify.notify_all();
            queue.drain(..).collect()
        };
        for task in pending {
            self.shared.fail(&task.archive);
        }

        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            wait_for_worker(handle);
        }
    }
}

impl Drop for ExtractScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn recv(rx: Receiver<ExtractResult>, archive: &Path) -> ExtractResult {
    rx.recv().unwrap_or_else(|_| Err(aborted(archive)))
}

fn aborted(archive: &Path) -> ExtractError {
    ExtractError::Aborted {
        archive: archive.to_path_buf(),
    }
}

/// Join a worker, giving up after ~2s so shutdown never hangs.
fn wait_for_worker(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    debug!("extract"; "worker {:?} still busy at shutdown", handle.thread().name());
}

// =============================================================================
// Worker
// =============================================================================

impl Shared {
    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn enqueue(&self, task: Task) {
        let mut queue = self.queue.lock();
        if self.is_shutdown() {
            drop(queue);
            self.fail(&task.archive);
            return;
        }
        queue.push_back(task);
        self.notify.notify_one();
    }

    fn run_worker(&self) {
        while let Some(task) = self.dequeue() {
            self.execute(task);
        }
    }

    fn dequeue(&self) -> Option<Task> {
        let mut queue = self.queue.lock();
        loop {
            if self.is_shutdown() {
                return None;
            }
            if let Some(task) = queue.pop_front() {
                return Some(task);
            }
            self.notify.wait(&mut queue);
        }
    }

    fn execute(&self, task: Task) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        debug!("extract"; "{} -> {}", task.archive.display(), task.target.display());

        // Catch panics so waiters always receive a result
        let result = catch_unwind(AssertUnwindSafe(|| {
            extract_archive(&task.archive, &task.target, true)
        }))
        .unwrap_or_else(|_| Err(aborted(&task.archive)));

        match &result {
            Ok(dir) => {
                self.cache.record_extracted(task.archive.clone(), dir.clone());
                log!("extract"; "{} extracted to {}", task.archive.display(), dir.display());
            }
            Err(e) => log!("error"; "{}", e),
        }

        self.finish(&task.archive, result);
    }

    fn finish(&self, archive: &Path, result: ExtractResult) {
        let waiters = self
            .inflight
            .remove(archive)
            .map(|(_, w)| w)
            .unwrap_or_default();
        for tx in &waiters {
            let _ = tx.send(result.clone());
        }
    }

    fn fail(&self, archive: &Path) {
        self.finish(archive, Err(aborted(archive)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::test_utils::write_zip;
    use std::fs;
    use std::sync::Barrier;
    use tempfile::TempDir;

    fn scheduler(workers: usize) -> (Arc<ResolutionCache>, ExtractScheduler) {
        let cache = Arc::new(ResolutionCache::new());
        let scheduler = ExtractScheduler::start(Arc::clone(&cache), workers).unwrap();
        (cache, scheduler)
    }

    #[test]
    fn test_extract_records_in_cache() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("demo.zip");
        write_zip(&archive, &[("index.html", b"<p>demo</p>".as_slice())]);
        let (cache, scheduler) = scheduler(1);

        let target = temp.path().join("exploded/demo");
        let dir = scheduler.extract(&archive, &target).unwrap();

        assert_eq!(dir, target);
        assert!(dir.join("index.html").is_file());
        assert_eq!(cache.get_extracted(&archive), Some(target));
        assert_eq!(scheduler.runs(), 1);
    }

    #[test]
    fn test_cached_archive_not_extracted_again() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("demo.zip");
        write_zip(&archive, &[("a.txt", b"a".as_slice())]);
        let (_cache, scheduler) = scheduler(2);
        let target = temp.path().join("out");

        scheduler.extract(&archive, &target).unwrap();
        scheduler.extract(&archive, &target).unwrap();
        assert_eq!(scheduler.runs(), 1);
    }

    #[test]
    fn test_concurrent_requests_share_one_extraction() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("demo.zip");
        let big = vec![b'x'; 256 * 1024];
        write_zip(
            &archive,
            &[("index.html", b"<p>demo</p>".as_slice()), ("big.bin", big.as_slice())],
        );
        let (_cache, scheduler) = scheduler(4);
        let scheduler = Arc::new(scheduler);
        let target = temp.path().join("out");

        const CALLERS: usize = 16;
        let barrier = Arc::new(Barrier::new(CALLERS));
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let scheduler = Arc::clone(&scheduler);
                let barrier = Arc::clone(&barrier);
                let archive = archive.clone();
                let target = target.clone();
                thread::spawn(move || {
                    barrier.wait();
                    scheduler.extract(&archive, &target)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), target);
        }
        assert_eq!(scheduler.runs(), 1);
    }

    #[test]
    fn test_failure_not_cached() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("demo.zip");
        fs::write(&archive, b"not a zip").unwrap();
        let (cache, scheduler) = scheduler(1);
        let target = temp.path().join("out");

        let err = scheduler.extract(&archive, &target).unwrap_err();
        assert!(matches!(err, ExtractError::ArchiveRead { .. }));
        assert!(cache.get_extracted(&archive).is_none());

        write_zip(&archive, &[("a.txt", b"a".as_slice())]);
        scheduler.extract(&archive, &target).unwrap();
        assert_eq!(scheduler.runs(), 2);
    }

    #[test]
    fn test_traversal_reported_to_caller() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../../evil", b"x".as_slice())]);
        let (_cache, scheduler) = scheduler(1);

        let err = scheduler
            .extract(&archive, &temp.path().join("a/b/out"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::PathTraversal { .. }));
    }

    #[test]
    fn test_extract_after_shutdown_aborts() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("demo.zip");
        write_zip(&archive, &[("a.txt", b"a".as_slice())]);
        let (_cache, scheduler) = scheduler(1);

        scheduler.shutdown();
        let err = scheduler
            .extract(&archive, &temp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Aborted { .. }));
        assert_eq!(scheduler.runs(), 0);
    }
}
