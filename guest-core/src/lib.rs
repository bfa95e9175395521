//! Serial framing, the event bus, and the queue-port contract shared by the
//! guest simulator firmware binaries.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod listen;
pub mod multiplexer;
pub mod platform;
pub mod queue;
pub mod serial;
pub mod system_manager;
pub mod transport;

pub use dispatch::{Dispatcher, EncodedDispatch, GraphicsDispatcher, SystemDispatcher};
pub use events::{Event, EventKind, EventNotification, GraphicsEvent, SystemEvent};
pub use listen::{EncodedListener, GraphicsListener, Listener, SystemListener};
pub use multiplexer::Multiplexer;
pub use platform::Platform;
pub use transport::SimulatorTransport;
