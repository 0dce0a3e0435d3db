//! Fixed set of render threads fed through a rendezvous channel.
//!
//! `submit` only returns once some worker has taken the task, and
//! `wait_for_tasks` blocks until every submitted task has finished. Each
//! worker owns its random generator for its whole lifetime.
use log::{debug, error, info};
use parking_lot::{Condvar, Mutex};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("a worker pool needs at least one thread")]
    NoWorkers,

    #[error("failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),

    #[error("no live worker accepted the task")]
    Disconnected,

    #[error("{0} task(s) panicked")]
    TaskPanicked(usize),
}

/// A unit of work. The generator belongs to the worker running it.
pub trait Task: Send {
    fn run(&self, rng: &mut dyn RngCore);
}

impl<F: Fn(&mut dyn RngCore) + Send> Task for F {
    fn run(&self, rng: &mut dyn RngCore) {
        self(rng)
    }
}

type Job = Box<dyn Task>;

/// Counts tasks that were handed out and have not finished yet.
#[derive(Default)]
struct WaitGroup {
    pending: Mutex<usize>,
    all_done: Condvar,
}

impl WaitGroup {
    fn add(&self) {
        *self.pending.lock() += 1;
    }

    fn done(&self) {
        let mut pending = self.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            self.all_done.notify_all();
        }
    }

    fn wait(&self) {
        let mut pending = self.pending.lock();
        while *pending > 0 {
            self.all_done.wait(&mut pending);
        }
    }
}

#[derive(Default)]
struct Shared {
    wait_group: WaitGroup,
    panicked: AtomicUsize,
}

pub struct WorkerPool {
    sender: Option<SyncSender<Job>>,
    workers: Vec<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Starts `size` workers. With a `seed`, worker `i` seeds its generator
    /// from `seed + i`; otherwise from OS entropy.
    pub fn new(size: usize, seed: Option<u64>) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::NoWorkers);
        }
        let (sender, receiver) = sync_channel::<Job>(0);
        let receiver = Arc::new(Mutex::new(receiver));
        let shared = Arc::new(Shared::default());

        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(index as u64)),
                None => SmallRng::from_entropy(),
            };
            let receiver = Arc::clone(&receiver);
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("render-worker-{}", index))
                .spawn(move || worker_loop(index, rng, receiver, shared))?;
            workers.push(handle);
        }
        info!("started worker pool with {} threads", size);

        Ok(Self {
            sender: Some(sender),
            workers,
            shared,
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Hands `task` to an idle worker, blocking until one claims it.
    pub fn submit(&self, task: Box<dyn Task>) -> Result<(), PoolError> {
        let sender = self.sender.as_ref().ok_or(PoolError::Disconnected)?;
        self.shared.wait_group.add();
        sender.send(task).map_err(|_| {
            self.shared.wait_group.done();
            PoolError::Disconnected
        })
    }

    /// Blocks until every submitted task has returned or panicked. Panics
    /// since the previous call are reported here and then forgotten.
    pub fn wait_for_tasks(&self) -> Result<(), PoolError> {
        self.shared.wait_group.wait();
        match self.shared.panicked.swap(0, Ordering::SeqCst) {
            0 => Ok(()),
            n => Err(PoolError::TaskPanicked(n)),
        }
    }
}

fn worker_loop(
    index: usize,
    mut rng: SmallRng,
    receiver: Arc<Mutex<Receiver<Job>>>,
    shared: Arc<Shared>,
) {
    loop {
        let message = receiver.lock().recv();
        let task = match message {
            Ok(task) => task,
            // sender dropped: the pool is shutting down
            Err(_) => break,
        };
        if catch_unwind(AssertUnwindSafe(|| task.run(&mut rng))).is_err() {
            error!("task panicked on worker {}", index);
            shared.panicked.fetch_add(1, Ordering::SeqCst);
        }
        shared.wait_group.done();
    }
    debug!("worker {} exiting", index);
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread terminated abnormally");
            }
        }
        info!("worker pool shut down");
    }
}
