// Serialized access to a value that is mutated from re-entrant callbacks.
// A job posted while another job is running is queued and run by the
// outer drain once the running job has returned and released the value.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LockResult, Mutex, MutexGuard};

type Job<T> = Box<dyn FnOnce(&mut T) + Send>;

pub struct Mailbox<T> {
    value: Mutex<T>,
    pending: Mutex<VecDeque<Job<T>>>,
    draining: AtomicBool,
}

impl<T> Mailbox<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            pending: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
        }
    }

    /// Direct access for readers. Must not be called from inside a job.
    pub fn lock(&self) -> LockResult<MutexGuard<'_, T>> {
        self.value.lock()
    }

    /// Queue `job` and drain the queue unless a drain is already running.
    ///
    /// Returns how many jobs this call ran; 0 means the job was left to the
    /// drain already in progress.
    pub fn post<F>(&self, job: F) -> usize
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        match self.pending.lock() {
            Ok(mut pending) => pending.push_back(Box::new(job)),
            Err(e) => {
                log::error!("[Mailbox] Queue lock poisoned: {}", e);
                return 0;
            }
        }

        let mut ran = 0;
        loop {
            if self.draining.swap(true, Ordering::AcqRel) {
                return ran;
            }
            while let Some(job) = self.next_job() {
                match self.value.lock() {
                    Ok(mut value) => job(&mut value),
                    Err(e) => log::error!("[Mailbox] Value lock poisoned, dropping job: {}", e),
                }
                ran += 1;
            }
            self.draining.store(false, Ordering::Release);

            // A job queued from another thread between the last pop and the
            // flag reset would otherwise sit until the next post.
            if self.is_idle() {
                return ran;
            }
        }
    }

    /// Nothing queued.
    pub fn is_idle(&self) -> bool {
        self.pending.lock().map(|p| p.is_empty()).unwrap_or(true)
    }

    // The queue guard is dropped before the job runs, so jobs may post.
    fn next_job(&self) -> Option<Job<T>> {
        self.pending.lock().ok()?.pop_front()
    }
}
