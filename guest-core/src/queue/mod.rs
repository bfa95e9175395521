//! Queue Port: the bounded-queue contract consumed by dispatchers and
//! listeners. Two endpoints (producer, consumer) resolve the same named
//! queue; internal synchronization is each implementation's own business.

pub mod local;
pub mod shm;

use crate::error::QueueError;

/// Producer half of a named queue.
pub trait QueueProducer<T>: Send {
    /// Blocks until the item is accepted, or fails immediately if no
    /// consumer is attached — it must never block forever against a dead
    /// peer.
    fn enqueue_blocking(&mut self, item: T) -> Result<(), QueueError>;
}

/// Consumer half of a named queue.
pub trait QueueConsumer<T>: Send {
    /// Blocks until an item is available.
    fn dequeue_blocking(&mut self, out: &mut T) -> Result<(), QueueError>;

    /// Returns `Ok(false)` immediately if the queue is currently empty,
    /// rather than blocking.
    fn dequeue_nonblocking(&mut self, out: &mut T) -> Result<bool, QueueError>;
}
