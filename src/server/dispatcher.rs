//! Hands each accepted connection to a worker and forgets about it.

use log::debug;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use threadpool::ThreadPool;

pub enum Dispatcher {
    /// One detached thread per connection, no limit.
    Detached { spawned: AtomicU64 },
    /// A fixed set of threads; excess connections queue for a free worker.
    Pooled(ThreadPool),
}

impl Dispatcher {
    pub fn new(workers: Option<usize>) -> Self {
        match workers {
            Some(n) => Self::Pooled(ThreadPool::with_name("conn-worker".to_string(), n.max(1))),
            None => Self::Detached {
                spawned: AtomicU64::new(0),
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Detached { .. } => "thread per connection".to_string(),
            Self::Pooled(pool) => format!("pool of {} threads", pool.max_count()),
        }
    }

    /// Runs `job` on a worker. Fails only when no thread could be started,
    /// in which case the job (and whatever it owns) is dropped.
    pub fn dispatch<F>(&self, job: F) -> io::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Self::Detached { spawned } => {
                let id = spawned.fetch_add(1, Ordering::Relaxed);
                // the JoinHandle is dropped right away, detaching the thread
                thread::Builder::new()
                    .name(format!("conn-{}", id))
                    .spawn(job)?;
                debug!("Spawned conn-{}", id);
                Ok(())
            }
            Self::Pooled(pool) => {
                pool.execute(job);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex, mpsc};
    use std::time::Duration;

    #[test]
    fn test_detached_runs_jobs_concurrently() {
        let dispatcher = Dispatcher::new(None);
        let (tx, rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));

        // the first job blocks until released; the second must still run
        let blocked = Arc::clone(&release_rx);
        let tx1 = tx.clone();
        dispatcher
            .dispatch(move || {
                let _ = blocked.lock().unwrap().recv();
                tx1.send(1).unwrap();
            })
            .unwrap();
        dispatcher.dispatch(move || tx.send(2).unwrap()).unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
        release_tx.send(()).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    }

    #[test]
    fn test_pooled_runs_every_job() {
        let dispatcher = Dispatcher::new(Some(3));
        assert_eq!(dispatcher.describe(), "pool of 3 threads");

        let (tx, rx) = mpsc::channel();
        for i in 0..20 {
            let tx = tx.clone();
            dispatcher.dispatch(move || tx.send(i).unwrap()).unwrap();
        }
        drop(tx);

        let mut seen: Vec<i32> = rx.iter().collect();
        seen.sort();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_panicking_job_does_not_stop_dispatch() {
        let dispatcher = Dispatcher::new(None);
        dispatcher.dispatch(|| panic!("worker failure")).unwrap();

        let (tx, rx) = mpsc::channel();
        dispatcher.dispatch(move || tx.send(()).unwrap()).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
