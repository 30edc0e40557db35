//! Synchronization boundary - the UI thread rendezvous.
//!
//! The tree/property system is logically single-threaded: every mutation and
//! layout recomputation happens on one designated UI thread. Other threads
//! never touch storage directly; they marshal a closure through
//! [`SyncContext::sync`] and block until the UI thread has executed it.
//!
//! No locks guard property storage itself. The only locked structure here is
//! the task queue; correctness of storage access rests entirely on the
//! single-writer-thread discipline this type enforces.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use log::trace;
use parking_lot::{Condvar, Mutex};

type Task = Box<dyn FnOnce() + Send>;

struct SyncInner {
    /// The one thread allowed to touch tree/property storage.
    ui_thread: ThreadId,
    /// Marshaled closures waiting for the UI thread.
    queue: Mutex<VecDeque<Task>>,
    /// Signaled whenever a task is enqueued.
    wake: Condvar,
}

/// Rendezvous cell for one marshaled call.
struct Reply<R> {
    slot: Mutex<Option<R>>,
    done: Condvar,
}

/// Handle to the UI thread boundary. Cheap to clone, freely shareable.
#[derive(Clone)]
pub struct SyncContext {
    inner: Arc<SyncInner>,
}

impl SyncContext {
    /// Claim the current thread as the UI thread.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SyncInner {
                ui_thread: thread::current().id(),
                queue: Mutex::new(VecDeque::new()),
                wake: Condvar::new(),
            }),
        }
    }

    /// Whether the calling thread is the UI thread.
    pub fn is_synced(&self) -> bool {
        thread::current().id() == self.inner.ui_thread
    }

    /// Direct-access guard: storage may only be touched on the UI thread.
    #[inline]
    pub(crate) fn assert_synced(&self) {
        debug_assert!(
            self.is_synced(),
            "tree/property storage touched off the UI thread"
        );
    }

    /// Run `f` on the UI thread and return its result.
    ///
    /// On the UI thread this runs `f` inline without queueing. Off-thread it
    /// marshals `f` onto the queue and blocks until the UI thread drains it -
    /// a synchronous rendezvous, not fire-and-forget.
    pub fn sync<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_synced() {
            return f();
        }

        trace!("marshaling call onto UI thread");
        let reply = Arc::new(Reply {
            slot: Mutex::new(None),
            done: Condvar::new(),
        });
        let reply_tx = reply.clone();

        {
            let mut queue = self.inner.queue.lock();
            queue.push_back(Box::new(move || {
                let result = f();
                *reply_tx.slot.lock() = Some(result);
                reply_tx.done.notify_one();
            }));
        }
        self.inner.wake.notify_all();

        let mut slot = reply.slot.lock();
        while slot.is_none() {
            reply.done.wait(&mut slot);
        }
        slot.take().unwrap()
    }

    /// Run every currently queued task. UI thread only.
    ///
    /// Returns the number of tasks executed.
    pub fn drain(&self) -> usize {
        self.assert_synced();
        let mut count = 0;
        loop {
            let task = self.inner.queue.lock().pop_front();
            let Some(task) = task else { break };
            task();
            count += 1;
        }
        count
    }

    /// Block up to `timeout` for at least one task, then drain. UI thread only.
    ///
    /// Event loops call this instead of spinning on [`SyncContext::drain`].
    pub fn wait_and_drain(&self, timeout: Duration) -> usize {
        self.assert_synced();
        {
            let mut queue = self.inner.queue.lock();
            if queue.is_empty() {
                let _ = self.inner.wake.wait_for(&mut queue, timeout);
            }
        }
        self.drain()
    }

    /// Number of tasks currently waiting.
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_sync_inline_on_ui_thread() {
        let ctx = SyncContext::new();
        assert!(ctx.is_synced());
        // Runs inline: nothing queued afterwards.
        assert_eq!(ctx.sync(|| 41 + 1), 42);
        assert_eq!(ctx.pending(), 0);
    }

    #[test]
    fn test_sync_marshals_off_thread() {
        let ctx = SyncContext::new();
        let done = Arc::new(AtomicBool::new(false));

        let worker = {
            let ctx = ctx.clone();
            let done = done.clone();
            thread::spawn(move || {
                assert!(!ctx.is_synced());
                let value = ctx.sync(|| 7 * 6);
                done.store(true, Ordering::SeqCst);
                value
            })
        };

        // The worker blocks until this thread drains its queue.
        while !done.load(Ordering::SeqCst) {
            ctx.wait_and_drain(Duration::from_millis(10));
        }
        assert_eq!(worker.join().unwrap(), 42);
    }

    #[test]
    fn test_drain_runs_in_order() {
        let ctx = SyncContext::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let ctx = ctx.clone();
                let order = order.clone();
                thread::spawn(move || {
                    ctx.sync(move || order.lock().push(i));
                })
            })
            .collect();

        while order.lock().len() < 4 {
            ctx.wait_and_drain(Duration::from_millis(10));
        }
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(order.lock().len(), 4);
    }
}
