//! Dispatchers: per-kind producers that enqueue an event and, for
//! multiplexed kinds, notify.
//!
//! Capability split (Design Notes): a [`Dispatcher`] always knows how to
//! dispatch a raw [`Event`]; [`EncodedDispatch`] is a second, orthogonal
//! capability some dispatchers also implement, converting an external wire
//! message into an event first. No inheritance hierarchy is needed between
//! the two.

use guest_icd::{GraphicsMessage, SystemMessage};
use tracing::error;

use crate::error::DispatchError;
use crate::events::{Event, EventKind, EventNotification, GraphicsEvent, SystemEvent};
use crate::queue::QueueProducer;

/// A per-kind producer. Constructed explicitly (no singleton/lazy-init
/// global) and injected by reference into whichever thread uses it.
pub struct Dispatcher {
    kind: EventKind,
    queue: Box<dyn QueueProducer<Event>>,
    notifier: Option<Box<dyn QueueProducer<EventNotification>>>,
    force_multiplex: Option<bool>,
}

impl Dispatcher {
    pub fn new(
        kind: EventKind,
        queue: Box<dyn QueueProducer<Event>>,
        notifier: Option<Box<dyn QueueProducer<EventNotification>>>,
    ) -> Self {
        Dispatcher {
            kind,
            queue,
            notifier,
            force_multiplex: None,
        }
    }

    /// Overrides the compile-time multiplex table for this instance, so
    /// tests can dispatch without wiring a notification queue.
    pub fn force_multiplex(mut self, multiplex: bool) -> Self {
        self.force_multiplex = Some(multiplex);
        self
    }

    fn is_multiplexed(&self) -> bool {
        self.force_multiplex.unwrap_or_else(|| self.kind.multiplexed())
    }

    /// Stamps `event`'s kind (trivially true for a tagged sum: the variant
    /// fixes it) and enqueues on the typed queue. If the kind is
    /// multiplexed, also posts a notification — data first, notification
    /// second, so a waiting multiplexer never wakes to an empty queue.
    pub fn dispatch(&mut self, event: Event) -> Result<(), DispatchError> {
        debug_assert_eq!(event.kind(), self.kind, "event tagged with the wrong kind");

        self.queue
            .enqueue_blocking(event)
            .map_err(|_| DispatchError::QueueClosed)?;

        if self.is_multiplexed() {
            let notifier = self
                .notifier
                .as_mut()
                .expect("a multiplexed kind must be constructed with a notifier");
            if notifier
                .enqueue_blocking(EventNotification { kind: self.kind })
                .is_err()
            {
                error!(kind = ?self.kind, "failed to notify after successful enqueue");
                return Err(DispatchError::NotifyFailed);
            }
        }

        Ok(())
    }
}

/// Transforms an external wire message into an event and dispatches it —
/// the glue the simulator process' receiving thread uses for incoming
/// serial messages.
pub trait EncodedDispatch<Wire> {
    fn dispatch_encoded(&mut self, msg: Wire) -> Result<(), DispatchError>;
}

/// Dispatches system events, constructed from either a raw [`SystemEvent`]
/// or a wire [`SystemMessage`].
pub struct SystemDispatcher(pub Dispatcher);

impl EncodedDispatch<SystemMessage> for SystemDispatcher {
    fn dispatch_encoded(&mut self, msg: SystemMessage) -> Result<(), DispatchError> {
        self.0.dispatch(Event::System(SystemEvent {
            shutdown: msg.shutdown,
        }))
    }
}

/// Dispatches graphics events, constructed from either a raw
/// [`GraphicsEvent`] or a wire [`GraphicsMessage`].
pub struct GraphicsDispatcher(pub Dispatcher);

impl EncodedDispatch<GraphicsMessage> for GraphicsDispatcher {
    fn dispatch_encoded(&mut self, msg: GraphicsMessage) -> Result<(), DispatchError> {
        let mut image = [0u8; guest_icd::IMAGE_LEN];
        let n = msg.data.len().min(image.len());
        image[..n].copy_from_slice(&msg.data[..n]);
        self.0.dispatch(Event::Graphics(GraphicsEvent { image }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::local::{fifo_queue, latest_queue};

    #[test]
    fn dispatch_stamps_kind_even_if_caller_tried_otherwise() {
        let (p, mut c) = fifo_queue::<Event>(4);
        let mut d = Dispatcher::new(EventKind::System, Box::new(p), None);
        d.dispatch(Event::System(SystemEvent { shutdown: true })).unwrap();

        let mut out = Event::System(SystemEvent::default());
        c.dequeue_blocking(&mut out).unwrap();
        assert_eq!(out.kind(), EventKind::System);
    }

    #[test]
    fn multiplexed_dispatch_notifies_after_enqueue() {
        let (dp, mut dc) = fifo_queue::<Event>(4);
        let (np, mut nc) = fifo_queue::<EventNotification>(4);
        let mut d = Dispatcher::new(EventKind::Graphics, Box::new(dp), Some(Box::new(np)))
            .force_multiplex(true);

        d.dispatch(Event::Graphics(GraphicsEvent {
            image: [0u8; guest_icd::IMAGE_LEN],
        }))
        .unwrap();

        let mut out = Event::System(SystemEvent::default());
        dc.dequeue_blocking(&mut out).unwrap();
        assert_eq!(out.kind(), EventKind::Graphics);

        let mut note = EventNotification { kind: EventKind::System };
        nc.dequeue_blocking(&mut note).unwrap();
        assert_eq!(note.kind, EventKind::Graphics);
    }

    #[test]
    fn unmultiplexed_dispatch_needs_no_notifier() {
        let (p, _c) = fifo_queue::<Event>(4);
        let mut d = Dispatcher::new(EventKind::System, Box::new(p), None);
        assert!(d.dispatch(Event::System(SystemEvent { shutdown: false })).is_ok());
    }

    #[test]
    fn graphics_queue_is_capacity_one_latest_wins() {
        let (p, mut c) = latest_queue::<Event>();
        let mut d = Dispatcher::new(EventKind::Graphics, Box::new(p), None).force_multiplex(false);
        d.dispatch(Event::Graphics(GraphicsEvent { image: [0u8; guest_icd::IMAGE_LEN] }))
            .unwrap();
        d.dispatch(Event::Graphics(GraphicsEvent { image: [0u8; guest_icd::IMAGE_LEN] }))
            .unwrap();

        let mut out = Event::System(SystemEvent::default());
        c.dequeue_blocking(&mut out).unwrap();
        // Only one item should have been pending (the second overwrote the
        // first); nothing more is waiting.
        assert_eq!(out.kind(), EventKind::Graphics);
        assert_eq!(c.dequeue_nonblocking(&mut out).unwrap(), false);
    }
}
