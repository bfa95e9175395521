//! In-process queue implementations: a plain FIFO mailbox for the system
//! and notification queues, and a most-recent-wins slot for the
//! capacity-one graphics queue. Used by tests and by any two components
//! that happen to live in the same process.

use std::sync::mpsc::{self, Receiver, RecvError, SyncSender, TryRecvError};
use std::sync::{Arc, Condvar, Mutex};

use crate::error::QueueError;

use super::{QueueConsumer, QueueProducer};

/// A bounded FIFO mailbox, backed by `std::sync::mpsc`. Used for the system
/// queue and the notification queue, neither of which needs more than
/// blocking-channel semantics.
pub fn fifo_queue<T: Send>(capacity: usize) -> (FifoProducer<T>, FifoConsumer<T>) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (FifoProducer { tx }, FifoConsumer { rx })
}

pub struct FifoProducer<T> {
    tx: SyncSender<T>,
}

pub struct FifoConsumer<T> {
    rx: Receiver<T>,
}

impl<T: Send> QueueProducer<T> for FifoProducer<T> {
    fn enqueue_blocking(&mut self, item: T) -> Result<(), QueueError> {
        self.tx.send(item).map_err(|_| QueueError::Closed)
    }
}

impl<T: Send> QueueConsumer<T> for FifoConsumer<T> {
    fn dequeue_blocking(&mut self, out: &mut T) -> Result<(), QueueError> {
        match self.rx.recv() {
            Ok(v) => {
                *out = v;
                Ok(())
            }
            Err(RecvError) => Err(QueueError::Closed),
        }
    }

    fn dequeue_nonblocking(&mut self, out: &mut T) -> Result<bool, QueueError> {
        match self.rx.try_recv() {
            Ok(v) => {
                *out = v;
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(QueueError::Closed),
        }
    }
}

/// A single-slot, most-recent-wins queue: the graphics queue's policy
/// (frames are large, dropping a stale one is acceptable back-pressure).
/// A second `enqueue_blocking` while a frame is already pending overwrites
/// it rather than blocking.
pub fn latest_queue<T: Send>() -> (LatestProducer<T>, LatestConsumer<T>) {
    let inner = Arc::new(LatestInner {
        slot: Mutex::new(None),
        available: Condvar::new(),
        consumer_attached: Mutex::new(true),
    });
    (
        LatestProducer {
            inner: inner.clone(),
        },
        LatestConsumer { inner },
    )
}

struct LatestInner<T> {
    slot: Mutex<Option<T>>,
    available: Condvar,
    consumer_attached: Mutex<bool>,
}

pub struct LatestProducer<T> {
    inner: Arc<LatestInner<T>>,
}

pub struct LatestConsumer<T> {
    inner: Arc<LatestInner<T>>,
}

impl<T: Send> QueueProducer<T> for LatestProducer<T> {
    fn enqueue_blocking(&mut self, item: T) -> Result<(), QueueError> {
        if !*self.inner.consumer_attached.lock().unwrap() {
            return Err(QueueError::Closed);
        }
        let mut slot = self.inner.slot.lock().unwrap();
        *slot = Some(item);
        self.inner.available.notify_one();
        Ok(())
    }
}

impl<T: Send> QueueConsumer<T> for LatestConsumer<T> {
    fn dequeue_blocking(&mut self, out: &mut T) -> Result<(), QueueError> {
        let mut slot = self.inner.slot.lock().unwrap();
        while slot.is_none() {
            slot = self.inner.available.wait(slot).unwrap();
        }
        *out = slot.take().unwrap();
        Ok(())
    }

    fn dequeue_nonblocking(&mut self, out: &mut T) -> Result<bool, QueueError> {
        let mut slot = self.inner.slot.lock().unwrap();
        match slot.take() {
            Some(v) => {
                *out = v;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<T> Drop for LatestConsumer<T> {
    fn drop(&mut self) {
        *self.inner.consumer_attached.lock().unwrap() = false;
    }
}
