//! A bounded SPSC queue backed by POSIX shared memory, so a queue genuinely
//! survives process boundaries (the invariant §3 of the data model
//! requires). Synchronization is two `pshared` POSIX semaphores (free
//! slots, ready items) plus a `pshared` mutex guarding the ring's head and
//! tail indices — the same primitives a C systems program would reach for,
//! wired up through `libc` rather than hand-rolled FFI declarations.
//!
//! `T` must be `Copy` and contain no pointers: the queue moves it by raw
//! byte copy into and out of the mapping.

use std::marker::PhantomData;
use std::mem::{size_of, MaybeUninit};
use std::ptr;
use std::sync::atomic::{AtomicU8, Ordering};

use shared_memory::{Shmem, ShmemConf};

use crate::error::QueueError;

use super::{QueueConsumer, QueueProducer};

#[repr(C)]
struct Header {
    capacity: usize,
    head: usize,
    tail: usize,
    count: usize,
    lock: libc::pthread_mutex_t,
    slots_free: libc::sem_t,
    items_ready: libc::sem_t,
    consumer_attached: AtomicU8,
}

/// Bytes needed for the header plus `capacity` slots of `T`.
fn region_len<T>(capacity: usize) -> usize {
    size_of::<Header>() + capacity * size_of::<T>()
}

unsafe fn header_ptr(shmem: &Shmem) -> *mut Header {
    shmem.as_ptr() as *mut Header
}

unsafe fn slots_ptr<T>(shmem: &Shmem) -> *mut T {
    shmem.as_ptr().add(size_of::<Header>()) as *mut T
}

/// Initializes a fresh mapping's header: called exactly once, by whichever
/// endpoint creates the backing file (the producer, by convention).
unsafe fn init_header(header: *mut Header, capacity: usize) {
    ptr::write(
        header,
        Header {
            capacity,
            head: 0,
            tail: 0,
            count: 0,
            lock: libc::PTHREAD_MUTEX_INITIALIZER,
            slots_free: std::mem::zeroed(),
            items_ready: std::mem::zeroed(),
            consumer_attached: AtomicU8::new(0),
        },
    );

    let mut mutex_attr: libc::pthread_mutexattr_t = std::mem::zeroed();
    libc::pthread_mutexattr_init(&mut mutex_attr);
    libc::pthread_mutexattr_setpshared(&mut mutex_attr, libc::PTHREAD_PROCESS_SHARED);
    libc::pthread_mutex_init(&mut (*header).lock, &mutex_attr);
    libc::pthread_mutexattr_destroy(&mut mutex_attr);

    libc::sem_init(&mut (*header).slots_free, 1, capacity as u32);
    libc::sem_init(&mut (*header).items_ready, 1, 0);
}

struct ShmCore<T> {
    shmem: Shmem,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T> ShmCore<T> {
    fn header(&self) -> *mut Header {
        unsafe { header_ptr(&self.shmem) }
    }

    fn slots(&self) -> *mut T {
        unsafe { slots_ptr::<T>(&self.shmem) }
    }
}

unsafe impl<T: Send> Send for ShmCore<T> {}

/// Creates (or truncates and creates) the named backing mapping and
/// returns the producer end. Call [`open_consumer`] from the other process
/// to attach.
pub fn create_producer<T: Copy + Send>(
    name: &str,
    capacity: usize,
) -> Result<ShmProducer<T>, QueueError> {
    let shmem = ShmemConf::new()
        .size(region_len::<T>(capacity))
        .flink(name)
        .create()?;
    unsafe { init_header(header_ptr(&shmem), capacity) };
    let core = ShmCore {
        shmem,
        capacity,
        _marker: PhantomData,
    };
    Ok(ShmProducer { core })
}

/// Attaches to an existing mapping created by [`create_producer`].
pub fn open_consumer<T: Copy + Send>(name: &str, capacity: usize) -> Result<ShmConsumer<T>, QueueError> {
    let shmem = ShmemConf::new().flink(name).open()?;
    let core = ShmCore {
        shmem,
        capacity,
        _marker: PhantomData,
    };
    unsafe {
        (*core.header()).consumer_attached.store(1, Ordering::SeqCst);
    }
    Ok(ShmConsumer { core })
}

pub struct ShmProducer<T: Copy + Send> {
    core: ShmCore<T>,
}

pub struct ShmConsumer<T: Copy + Send> {
    core: ShmCore<T>,
}

impl<T: Copy + Send> QueueProducer<T> for ShmProducer<T> {
    fn enqueue_blocking(&mut self, item: T) -> Result<(), QueueError> {
        unsafe {
            let header = self.core.header();
            if (*header).consumer_attached.load(Ordering::SeqCst) == 0 {
                return Err(QueueError::Closed);
            }

            libc::sem_wait(&mut (*header).slots_free);
            libc::pthread_mutex_lock(&mut (*header).lock);

            let tail = (*header).tail;
            ptr::write(self.core.slots().add(tail), item);
            (*header).tail = (tail + 1) % self.core.capacity;
            (*header).count += 1;

            libc::pthread_mutex_unlock(&mut (*header).lock);
            libc::sem_post(&mut (*header).items_ready);
        }
        Ok(())
    }
}

impl<T: Copy + Send> QueueConsumer<T> for ShmConsumer<T> {
    fn dequeue_blocking(&mut self, out: &mut T) -> Result<(), QueueError> {
        unsafe {
            let header = self.core.header();
            libc::sem_wait(&mut (*header).items_ready);
            self.pop_locked(out);
            libc::sem_post(&mut (*header).slots_free);
        }
        Ok(())
    }

    fn dequeue_nonblocking(&mut self, out: &mut T) -> Result<bool, QueueError> {
        unsafe {
            let header = self.core.header();
            if libc::sem_trywait(&mut (*header).items_ready) != 0 {
                return Ok(false);
            }
            self.pop_locked(out);
            libc::sem_post(&mut (*header).slots_free);
        }
        Ok(true)
    }
}

impl<T: Copy + Send> ShmConsumer<T> {
    unsafe fn pop_locked(&mut self, out: &mut T) {
        let header = self.core.header();
        libc::pthread_mutex_lock(&mut (*header).lock);
        let head = (*header).head;
        let mut slot = MaybeUninit::<T>::uninit();
        ptr::copy_nonoverlapping(self.core.slots().add(head), slot.as_mut_ptr(), 1);
        *out = slot.assume_init();
        (*header).head = (head + 1) % self.core.capacity;
        (*header).count -= 1;
        libc::pthread_mutex_unlock(&mut (*header).lock);
    }
}

impl<T: Copy + Send> Drop for ShmConsumer<T> {
    fn drop(&mut self) {
        unsafe {
            (*self.core.header())
                .consumer_attached
                .store(0, Ordering::SeqCst);
        }
    }
}
