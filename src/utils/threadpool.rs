//! Thread pool utilities
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

type Job<T> = Box<dyn FnOnce() -> T + Send + 'static>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A fixed-size pool of worker threads.
///
/// Submissions go through a channel bounded to the number of workers, so
/// [ThreadPool::execute] blocks the caller once every worker is busy and the
/// queue is full. Return values of finished jobs are collected and handed back
/// by [ThreadPool::into_results].
pub struct ThreadPool<T: Send + 'static> {
    sender: Option<SyncSender<Job<T>>>,
    workers: Vec<JoinHandle<()>>,
    results: Arc<Mutex<Vec<T>>>,
    /// Jobs queued or running.
    pending: Arc<(Mutex<usize>, Condvar)>,
    size: usize,
}

#[derive(Debug)]
/// Error type for [ThreadPool::execute]
pub struct PoolClosed;

impl std::error::Error for PoolClosed {}

impl std::fmt::Display for PoolClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ThreadPool is closed")
    }
}

struct Worker<T> {
    receiver: Arc<Mutex<Receiver<Job<T>>>>,
    results: Arc<Mutex<Vec<T>>>,
    pending: Arc<(Mutex<usize>, Condvar)>,
}

impl<T> Worker<T> {
    fn run(self) {
        loop {
            // The guard is dropped before the job runs so other workers can pick up work.
            let job = lock(&self.receiver).recv();
            let Ok(job) = job else {
                break;
            };
            let result = job();
            lock(&self.results).push(result);
            let (count, cvar) = &*self.pending;
            let mut count = lock(count);
            *count -= 1;
            if *count == 0 {
                cvar.notify_all();
            }
        }
    }
}

impl<T: Send + 'static> ThreadPool<T> {
    /// Creates a pool with `size` workers.
    ///
    /// * `name` - Base name for worker threads, "threadpool-worker-" when None.
    pub fn new(size: usize, name: Option<&str>) -> std::io::Result<Self> {
        if size == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "worker size must be > 0",
            ));
        }
        let (sender, receiver) = sync_channel::<Job<T>>(size);
        let receiver = Arc::new(Mutex::new(receiver));
        let results = Arc::new(Mutex::new(Vec::new()));
        let pending = Arc::new((Mutex::new(0usize), Condvar::new()));
        let base_name = name.unwrap_or("threadpool-worker-");
        static POOL_ID: AtomicUsize = AtomicUsize::new(0);
        let pool_id = POOL_ID.fetch_add(1, Ordering::Relaxed);
        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let worker = Worker {
                receiver: Arc::clone(&receiver),
                results: Arc::clone(&results),
                pending: Arc::clone(&pending),
            };
            let handle = thread::Builder::new()
                .name(format!("{}{}-{}", base_name, pool_id, id))
                .spawn(move || worker.run())?;
            workers.push(handle);
        }
        Ok(ThreadPool {
            sender: Some(sender),
            workers,
            results,
            pending,
            size,
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Queues a job, blocking while the queue is full.
    pub fn execute<F>(&self, job: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolClosed)?;
        *lock(&self.pending.0) += 1;
        if sender.send(Box::new(job)).is_err() {
            let (count, cvar) = &*self.pending;
            let mut count = lock(count);
            *count -= 1;
            if *count == 0 {
                cvar.notify_all();
            }
            return Err(PoolClosed);
        }
        Ok(())
    }

    /// Blocks until every submitted job has finished. The pool stays usable.
    pub fn join(&self) {
        let (count, cvar) = &*self.pending;
        let mut count = lock(count);
        while *count != 0 {
            count = cvar.wait(count).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Waits for all jobs and returns their results in completion order.
    pub fn into_results(self) -> Vec<T> {
        self.join();
        let results = std::mem::take(&mut *lock(&self.results));
        results
    }
}

impl<T: Send + 'static> Drop for ThreadPool<T> {
    fn drop(&mut self) {
        // Closing the channel ends every worker's recv loop.
        self.sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(ThreadPool::<()>::new(0, None).is_err());
    }

    #[test]
    fn test_collects_all_results() {
        let pool = ThreadPool::new(3, Some("test-pool-")).unwrap();
        assert_eq!(pool.size(), 3);
        for i in 0..50u32 {
            pool.execute(move || i * 2).unwrap();
        }
        let mut results = pool.into_results();
        results.sort_unstable();
        assert_eq!(results, (0..50u32).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_join_is_a_barrier() {
        let pool = ThreadPool::new(2, None).unwrap();
        let done = Arc::new(AtomicU32::new(0));
        for _ in 0..10 {
            let done = Arc::clone(&done);
            pool.execute(move || {
                thread::sleep(std::time::Duration::from_millis(5));
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.join();
        assert_eq!(done.load(Ordering::SeqCst), 10);
        pool.execute(|| ()).unwrap();
        assert_eq!(pool.into_results().len(), 11);
    }
}
