//! Wiring shared by the simulator process and system manager binaries:
//! building the named queues, dispatchers, listeners, and multiplexer out of
//! `guest-core`'s building blocks.

pub mod platform;
pub mod serial_backend;

use guest_core::config::{EVENT_NOTIFY_QUEUE, GRAPHICS_QUEUE, GRAPHICS_QUEUE_CAPACITY, SYS_MANAGER_QUEUE};
use guest_core::dispatch::{Dispatcher, GraphicsDispatcher, SystemDispatcher};
use guest_core::error::QueueError;
use guest_core::events::{Event, EventKind, EventNotification};
use guest_core::listen::{GraphicsListener, Listener};
use guest_core::multiplexer::Multiplexer;
use guest_core::queue::shm;

/// Creates the System Manager queue. Called by the simulator process, which
/// is this queue's logical producer (system messages arrive over the wire
/// and are redispatched here); the system manager binary only ever opens
/// the consumer end via [`open_system_listener`].
pub fn create_system_dispatcher() -> Result<SystemDispatcher, QueueError> {
    let producer = shm::create_producer::<Event>(SYS_MANAGER_QUEUE, 1)?;
    Ok(SystemDispatcher(Dispatcher::new(
        EventKind::System,
        Box::new(producer),
        None,
    )))
}

/// Opens the System Manager queue's consumer end, for the system manager
/// binary.
pub fn open_system_listener() -> Result<Listener, QueueError> {
    let consumer = shm::open_consumer::<Event>(SYS_MANAGER_QUEUE, 1)?;
    Ok(Listener::new(EventKind::System, Box::new(consumer)))
}

/// Creates the Graphics queue and the shared Event Notify queue. Called by
/// whatever process produces graphics frames — a graphics producer is this
/// pair's logical producer for both, since a [`GraphicsDispatcher`] posts to
/// each on every dispatch. The simulator process only ever opens the
/// consumer ends via [`open_graphics_multiplexer`].
pub fn create_graphics_dispatcher() -> Result<GraphicsDispatcher, QueueError> {
    let producer = shm::create_producer::<Event>(GRAPHICS_QUEUE, GRAPHICS_QUEUE_CAPACITY)?;
    let notifier = shm::create_producer::<EventNotification>(EVENT_NOTIFY_QUEUE, 1)?;
    Ok(GraphicsDispatcher(Dispatcher::new(
        EventKind::Graphics,
        Box::new(producer),
        Some(Box::new(notifier)),
    )))
}

/// Opens the Graphics queue's consumer end plus the shared Event Notify
/// queue, and assembles a [`Multiplexer`] with the graphics listener
/// already registered — the shape every sending thread needs, even though
/// today only one kind multiplexes.
pub fn open_graphics_multiplexer() -> Result<Multiplexer, QueueError> {
    let graphics_consumer = shm::open_consumer::<Event>(GRAPHICS_QUEUE, GRAPHICS_QUEUE_CAPACITY)?;
    let notify_consumer = shm::open_consumer::<EventNotification>(EVENT_NOTIFY_QUEUE, 1)?;

    let mut mux = Multiplexer::new(Box::new(notify_consumer));
    mux.add_listener(
        EventKind::Graphics,
        Box::new(GraphicsListener(Listener::new(
            EventKind::Graphics,
            Box::new(graphics_consumer),
        ))),
    );
    Ok(mux)
}

