//! Listeners: per-kind consumers that dequeue (blocking or non-blocking).

use guest_icd::{Envelope, GraphicsMessage, SystemMessage};

use crate::error::QueueError;
use crate::events::{Event, EventKind};
use crate::queue::QueueConsumer;

/// A per-kind consumer.
pub struct Listener {
    kind: EventKind,
    queue: Box<dyn QueueConsumer<Event>>,
}

impl Listener {
    pub fn new(kind: EventKind, queue: Box<dyn QueueConsumer<Event>>) -> Self {
        Listener { kind, queue }
    }

    /// Blocks until the typed queue yields an event. Panics if the
    /// dequeued event's kind doesn't match this listener's kind: that is a
    /// precondition violation, not a recoverable runtime condition.
    pub fn listen(&mut self, out: &mut Event) -> Result<(), QueueError> {
        self.queue.dequeue_blocking(out)?;
        assert_eq!(out.kind(), self.kind, "listener received the wrong event kind");
        Ok(())
    }

    /// Non-blocking variant of [`Listener::listen`].
    pub fn get(&mut self, out: &mut Event) -> Result<bool, QueueError> {
        let got = self.queue.dequeue_nonblocking(out)?;
        if got {
            assert_eq!(out.kind(), self.kind, "listener received the wrong event kind");
        }
        Ok(got)
    }
}

/// Reads an event and encodes it onto the shared outgoing [`Envelope`] —
/// the glue the simulator process' sending thread uses. A second,
/// orthogonal capability alongside plain [`Listener`] dequeuing.
pub trait EncodedListener: Send {
    fn listen_encoded(&mut self, envelope: &mut Envelope) -> Result<(), QueueError>;
    fn get_encoded(&mut self, envelope: &mut Envelope) -> Result<bool, QueueError>;
}

pub struct SystemListener(pub Listener);

impl EncodedListener for SystemListener {
    fn listen_encoded(&mut self, envelope: &mut Envelope) -> Result<(), QueueError> {
        let mut event = Event::System(Default::default());
        self.0.listen(&mut event)?;
        let crate::events::Event::System(system) = event else {
            unreachable!("SystemListener always yields Event::System");
        };
        envelope.system = Some(SystemMessage {
            shutdown: system.shutdown,
        });
        Ok(())
    }

    fn get_encoded(&mut self, envelope: &mut Envelope) -> Result<bool, QueueError> {
        let mut event = Event::System(Default::default());
        if !self.0.get(&mut event)? {
            return Ok(false);
        }
        let crate::events::Event::System(system) = event else {
            unreachable!("SystemListener always yields Event::System");
        };
        envelope.system = Some(SystemMessage {
            shutdown: system.shutdown,
        });
        Ok(true)
    }
}

pub struct GraphicsListener(pub Listener);

impl EncodedListener for GraphicsListener {
    fn listen_encoded(&mut self, envelope: &mut Envelope) -> Result<(), QueueError> {
        let mut event = Event::Graphics(crate::events::GraphicsEvent {
            image: [0u8; guest_icd::IMAGE_LEN],
        });
        self.0.listen(&mut event)?;
        let crate::events::Event::Graphics(graphics) = event else {
            unreachable!("GraphicsListener always yields Event::Graphics");
        };
        envelope.graphics = Some(GraphicsMessage::paint(
            heapless::Vec::from_slice(&graphics.image).expect("IMAGE_LEN fits the wire buffer"),
        ));
        Ok(())
    }

    fn get_encoded(&mut self, envelope: &mut Envelope) -> Result<bool, QueueError> {
        let mut event = Event::Graphics(crate::events::GraphicsEvent {
            image: [0u8; guest_icd::IMAGE_LEN],
        });
        if !self.0.get(&mut event)? {
            return Ok(false);
        }
        let crate::events::Event::Graphics(graphics) = event else {
            unreachable!("GraphicsListener always yields Event::Graphics");
        };
        envelope.graphics = Some(GraphicsMessage::paint(
            heapless::Vec::from_slice(&graphics.image).expect("IMAGE_LEN fits the wire buffer"),
        ));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SystemEvent;
    use crate::queue::local::fifo_queue;
    use crate::queue::QueueProducer;

    #[test]
    fn listen_encoded_sets_system_submessage() {
        let (mut p, c) = fifo_queue::<Event>(1);
        p.enqueue_blocking(Event::System(SystemEvent { shutdown: true }))
            .unwrap();

        let mut listener = SystemListener(Listener::new(EventKind::System, Box::new(c)));
        let mut envelope = Envelope::default();
        listener.listen_encoded(&mut envelope).unwrap();

        assert_eq!(envelope.system, Some(SystemMessage { shutdown: true }));
        assert_eq!(envelope.graphics, None);
    }

    #[test]
    #[should_panic(expected = "wrong event kind")]
    fn listen_panics_on_kind_mismatch() {
        let (mut p, c) = fifo_queue::<Event>(1);
        p.enqueue_blocking(Event::Graphics(crate::events::GraphicsEvent {
            image: [0u8; guest_icd::IMAGE_LEN],
        }))
        .unwrap();

        let mut listener = Listener::new(EventKind::System, Box::new(c));
        let mut out = Event::System(SystemEvent::default());
        let _ = listener.listen(&mut out);
    }
}
