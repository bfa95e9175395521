//! Event types carried on the bus. `Event` is a tagged sum rather than a
//! reinterpret-cast over a shared header field: the tag lives in the enum
//! discriminant and can be read with [`Event::kind`] without inspecting the
//! payload variant.

use guest_icd::IMAGE_LEN;

/// Closed enumeration of event kinds. New kinds must also get an entry in
/// [`MULTIPLEXED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    System,
    Graphics,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::System, EventKind::Graphics];

    /// Whether a dispatcher for this kind must also push an
    /// [`EventNotification`] after a successful enqueue.
    pub const fn multiplexed(self) -> bool {
        const MULTIPLEXED: [bool; 2] = [
            false, // System: the system manager waits on a single queue.
            true,  // Graphics: the simulator process multiplexes several.
        ];
        MULTIPLEXED[self as usize]
    }
}

/// System-control event: device should shut down when `shutdown` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemEvent {
    pub shutdown: bool,
}

/// Graphics event: one full-screen packed-RGB frame.
///
/// `image` is a plain byte array rather than `guest_icd`'s `heapless::Vec`
/// so that `GraphicsEvent`, and with it the whole [`Event`] sum, can be
/// `Copy` — a shared-memory queue moves events by raw byte copy. The wire
/// representation ([`guest_icd::GraphicsMessage`]) keeps its `heapless::Vec`
/// for `postcard`/`serde` compatibility; conversion happens at the
/// dispatcher/listener boundary.
#[derive(Clone, Copy)]
pub struct GraphicsEvent {
    pub image: [u8; IMAGE_LEN],
}

impl core::fmt::Debug for GraphicsEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GraphicsEvent")
            .field("image", &format_args!("[{} bytes]", self.image.len()))
            .finish()
    }
}

impl PartialEq for GraphicsEvent {
    fn eq(&self, other: &Self) -> bool {
        self.image[..] == other.image[..]
    }
}

/// Tagged sum of every event kind carried on the bus. `Copy` so the event
/// bus can move it through a shared-memory queue by raw byte copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    System(SystemEvent),
    Graphics(GraphicsEvent),
}

impl Event {
    /// Reads the tag without inspecting the payload.
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::System(_) => EventKind::System,
            Event::Graphics(_) => EventKind::Graphics,
        }
    }
}

/// A small fixed record carried on the shared notification queue; the only
/// cross-type signal on the bus. Event data itself travels on per-kind
/// queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventNotification {
    pub kind: EventKind,
}
