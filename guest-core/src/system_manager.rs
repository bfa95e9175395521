//! System Manager Process: a single-threaded loop that consumes system
//! events and invokes the platform halt.

use tracing::{error, info};

use crate::error::SystemManagerError;
use crate::events::{Event, SystemEvent};
use crate::listen::Listener;
use crate::platform::Platform;

/// Runs one iteration: blocks for the next system event, and if it asks
/// for shutdown, calls `sync()` then `halt()`. `halt()` returning at all is
/// the failure case (the success path never returns control).
///
/// Returns `Ok(())` for a no-op iteration; `Err` if the queue closed or
/// `halt()` returned (meaning it failed).
pub fn run_iteration(
    listener: &mut Listener,
    platform: &dyn Platform,
) -> Result<(), SystemManagerError> {
    let mut event = Event::System(SystemEvent::default());
    listener.listen(&mut event)?;

    let Event::System(system) = event else {
        unreachable!("a system-kind Listener always yields Event::System");
    };

    if system.shutdown {
        info!("shutdown requested, syncing and halting");
        platform.sync();
        if platform.halt() {
            error!("halt() returned; it should not have");
            return Err(SystemManagerError::HaltReturned);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::platform::mock::MockPlatform;
    use crate::queue::local::fifo_queue;
    use crate::queue::QueueProducer;
    use std::sync::atomic::Ordering;

    #[test]
    fn shutdown_event_triggers_sync_then_halt() {
        let (mut p, c) = fifo_queue::<Event>(1);
        p.enqueue_blocking(Event::System(SystemEvent { shutdown: true }))
            .unwrap();
        let mut listener = Listener::new(EventKind::System, Box::new(c));
        let platform = MockPlatform::new(false);

        run_iteration(&mut listener, &platform).unwrap();

        assert_eq!(platform.sync_calls.load(Ordering::SeqCst), 1);
        assert_eq!(platform.halt_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_shutdown_event_is_a_no_op() {
        let (mut p, c) = fifo_queue::<Event>(1);
        p.enqueue_blocking(Event::System(SystemEvent { shutdown: false }))
            .unwrap();
        let mut listener = Listener::new(EventKind::System, Box::new(c));
        let platform = MockPlatform::new(false);

        run_iteration(&mut listener, &platform).unwrap();

        assert_eq!(platform.sync_calls.load(Ordering::SeqCst), 0);
        assert_eq!(platform.halt_calls.load(Ordering::SeqCst), 0);
    }
}
