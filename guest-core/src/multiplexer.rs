//! Select-like primitive over the shared notification queue: lets one
//! consumer thread wait on many typed queues without polling each in turn.

use crate::error::QueueError;
use crate::events::{EventKind, EventNotification};
use crate::listen::EncodedListener;
use crate::queue::QueueConsumer;

/// Only the sending thread calls [`Multiplexer::select`]; every
/// [`Multiplexer::add_listener`] call must complete before that thread
/// starts (see the concurrency notes).
pub struct Multiplexer {
    notifications: Box<dyn QueueConsumer<EventNotification>>,
    listeners: [Option<Box<dyn EncodedListener>>; EventKind::ALL.len()],
}

impl Multiplexer {
    pub fn new(notifications: Box<dyn QueueConsumer<EventNotification>>) -> Self {
        Multiplexer {
            notifications,
            listeners: Default::default(),
        }
    }

    pub fn add_listener(&mut self, kind: EventKind, listener: Box<dyn EncodedListener>) {
        self.listeners[kind as usize] = Some(listener);
    }

    /// Blocks on the notification queue, dropping notifications for kinds
    /// with no registered listener, until one matches, then returns that
    /// kind. The returned order is exactly the order notifications were
    /// accepted from the queue (modulo the silently dropped ones).
    pub fn select(&mut self) -> Result<EventKind, QueueError> {
        loop {
            let mut notif = EventNotification {
                kind: EventKind::System,
            };
            self.notifications.dequeue_blocking(&mut notif)?;
            if self.listeners[notif.kind as usize].is_some() {
                return Ok(notif.kind);
            }
            // Notification for an unregistered kind: correct to drop when
            // multiple consumers share one notification channel but each
            // only handles a subset of kinds.
        }
    }

    pub fn listener_mut(&mut self, kind: EventKind) -> Option<&mut dyn EncodedListener> {
        self.listeners[kind as usize].as_deref_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::events::{Event, GraphicsEvent};
    use crate::listen::{GraphicsListener, Listener};
    use crate::queue::local::fifo_queue;
    use crate::queue::QueueProducer;
    use guest_icd::Envelope;

    #[test]
    fn drops_notifications_for_unregistered_kinds() {
        let (mut notif_p, notif_c) = fifo_queue::<EventNotification>(4);
        let (graphics_p, graphics_c) = fifo_queue::<Event>(4);

        let mut mux = Multiplexer::new(Box::new(notif_c));
        mux.add_listener(
            EventKind::Graphics,
            Box::new(GraphicsListener(Listener::new(
                EventKind::Graphics,
                Box::new(graphics_c),
            ))),
        );

        // Queue a notification for System (unregistered with this mux),
        // then one for Graphics, mirroring the drop-unregistered scenario.
        notif_p
            .enqueue_blocking(EventNotification { kind: EventKind::System })
            .unwrap();
        notif_p
            .enqueue_blocking(EventNotification { kind: EventKind::Graphics })
            .unwrap();

        let mut graphics_dispatch =
            Dispatcher::new(EventKind::Graphics, Box::new(graphics_p), None).force_multiplex(false);
        graphics_dispatch
            .dispatch(Event::Graphics(GraphicsEvent { image: [0u8; guest_icd::IMAGE_LEN] }))
            .unwrap();

        let kind = mux.select().unwrap();
        assert_eq!(kind, EventKind::Graphics);

        let listener = mux.listener_mut(kind).unwrap();
        let mut envelope = Envelope::default();
        listener.listen_encoded(&mut envelope).unwrap();
        assert!(envelope.graphics.is_some());
    }
}
