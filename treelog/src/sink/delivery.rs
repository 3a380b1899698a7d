//! Bounded, non-blocking delivery to a writer.
//!
//! Producers hand encoded lines to a fixed-capacity channel with `try_send` and
//! return immediately. One dedicated thread receives them in order and writes
//! each with its own `write_all` and `flush`.
//!
//! `flush` is a barrier over a pending counter, not over the channel itself:
//!
//! - every accepted or rejected `log` call increments the counter exactly once
//!   before it tries to enqueue;
//! - a rejected entry (queue full, consumer gone) decrements it immediately;
//! - the consumer decrements it after each write, successful or not.
//!
//! When the consumer exits for any reason the counter is cleared, so a flush
//! can never wait on entries that will not be written.

use std::{
    io::{self, Write},
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    thread,
};

use parking_lot::{Condvar, Mutex};
use tokio::sync::mpsc::{self, error::TrySendError};

use super::Sink;
use crate::level::LogLevel;

/// Queue capacity used by [`DeliverySink::new`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Many-producer, single-consumer asynchronous writer.
///
/// Entries below `min_level` are ignored. When the queue is full the entry is
/// dropped and counted in [`DeliverySink::dropped`]; logging never waits on the
/// destination. Write errors are swallowed.
///
/// Dropping the sink closes the queue. The consumer thread writes whatever is
/// still queued and then exits.
#[derive(Debug)]
pub struct DeliverySink {
    sender: mpsc::Sender<Vec<u8>>,
    min_level: LogLevel,
    pending: Arc<Pending>,
    dropped: AtomicU64,
}

impl DeliverySink {
    pub fn new<W>(writer: W, min_level: LogLevel) -> io::Result<Self>
    where
        W: Write + Send + 'static,
    {
        Self::with_capacity(writer, min_level, DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates a sink whose queue holds at most `capacity` entries (at least one).
    pub fn with_capacity<W>(writer: W, min_level: LogLevel, capacity: usize) -> io::Result<Self>
    where
        W: Write + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let pending = Arc::new(Pending::default());

        let consumer_pending = Arc::clone(&pending);
        thread::Builder::new()
            .name("treelog-delivery".into())
            .spawn(move || consume(writer, receiver, &consumer_pending))?;

        Ok(Self {
            sender,
            min_level,
            pending,
            dropped: AtomicU64::new(0),
        })
    }

    pub fn stdout(min_level: LogLevel) -> io::Result<Self> {
        Self::new(io::stdout(), min_level)
    }

    pub fn stderr(min_level: LogLevel) -> io::Result<Self> {
        Self::new(io::stderr(), min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Number of entries rejected because the queue was full or the consumer
    /// had stopped.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Sink for DeliverySink {
    fn log(&self, level: LogLevel, payload: &[u8]) {
        if level < self.min_level {
            return;
        }

        self.pending.add();
        match self.sender.try_send(payload.to_vec()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.pending.done();
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(dropped, "delivery queue full, dropping entry");
            }
            Err(TrySendError::Closed(_)) => {
                self.pending.done();
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("delivery consumer has stopped, dropping entry");
            }
        }
    }

    fn flush(&self) {
        self.pending.wait();
    }
}

fn consume<W: Write>(mut writer: W, mut receiver: mpsc::Receiver<Vec<u8>>, pending: &Pending) {
    let _guard = ClearOnExit(pending);
    while let Some(line) = receiver.blocking_recv() {
        if let Err(err) = writer.write_all(&line).and_then(|()| writer.flush()) {
            tracing::debug!(error = %err, "delivery sink failed to write entry");
        }
        pending.done();
    }
    tracing::trace!("delivery queue closed, consumer exiting");
}

// =============================================================================
// Pending counter
// =============================================================================

/// Producers only touch the atomic. The mutex and condvar are used by waiters
/// and by whoever brings the count to zero.
#[derive(Debug, Default)]
struct Pending {
    count: AtomicUsize,
    lock: Mutex<()>,
    drained: Condvar,
}

impl Pending {
    fn add(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn done(&self) {
        let previous = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1));
        if previous == Ok(1) {
            self.notify();
        }
    }

    fn clear(&self) {
        self.count.store(0, Ordering::Release);
        self.notify();
    }

    fn wait(&self) {
        let mut guard = self.lock.lock();
        while self.count.load(Ordering::Acquire) > 0 {
            self.drained.wait(&mut guard);
        }
    }

    // Taking the lock orders the notify after a waiter's last check of the count.
    fn notify(&self) {
        let _guard = self.lock.lock();
        self.drained.notify_all();
    }
}

struct ClearOnExit<'a>(&'a Pending);

impl Drop for ClearOnExit<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}
