//! Simulator Process: the guest-side half of the serial link to the host
//! simulator. One thread receives framed envelopes off the wire and
//! redispatches their sub-messages onto the event bus; a second thread
//! multiplexes the bus's multiplexed queues back onto an outgoing envelope
//! and writes it to the wire.
//!
//! This process is the named queues' hub for the System Manager queue (it
//! is that queue's producer); the Graphics and Event Notify queues are
//! instead created by whatever process produces graphics frames, and opened
//! here as a consumer — see `guest-firmware`'s wiring notes.

use std::env;
use std::process::ExitCode;
use std::thread;

use guest_core::dispatch::EncodedDispatch;
use guest_core::transport::SimulatorTransport;
use guest_icd::Envelope;

use guest_firmware::serial_backend::TtySerialBackend;

fn device_path() -> String {
    env::var("GUEST_SERIAL_DEVICE").unwrap_or_else(|_| guest_core::config::DEFAULT_DEVICE.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let backend = match TtySerialBackend::open(&device_path(), guest_core::config::DEFAULT_BAUD) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = ?e, "failed to open serial device");
            return ExitCode::FAILURE;
        }
    };
    let recv_backend_clone = backend.try_clone();
    let mut recv_transport = match SimulatorTransport::open(backend) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = ?e, "failed to open transport");
            return ExitCode::FAILURE;
        }
    };

    let mut system_dispatcher = match guest_firmware::create_system_dispatcher() {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = ?e, "failed to create the system manager queue");
            return ExitCode::FAILURE;
        }
    };

    let receiver = thread::spawn(move || loop {
        let envelope = match recv_transport.recv() {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(error = ?e, "transport receive failed, stopping receiver");
                break;
            }
        };

        if let Some(system) = envelope.system {
            if let Err(e) = system_dispatcher.dispatch_encoded(system) {
                tracing::error!(error = ?e, "failed to dispatch a system message");
            }
        }
        // Graphics messages never arrive from the host in this protocol;
        // only the guest produces them.
    });

    // Share the receiver's already-open device rather than opening the path
    // a second time: POSIX read/write on a dup'd fd is safe for one-reader
    // + one-writer concurrent use, so the sender gets its own backend
    // handle onto the same underlying link.
    let sender_backend = match recv_backend_clone {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = ?e, "failed to clone the serial device for sending");
            return ExitCode::FAILURE;
        }
    };
    let mut send_transport = match SimulatorTransport::open(sender_backend) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = ?e, "failed to open transport for sending");
            return ExitCode::FAILURE;
        }
    };

    let mut mux = match guest_firmware::open_graphics_multiplexer() {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = ?e, "failed to open the graphics queues");
            return ExitCode::FAILURE;
        }
    };

    let mut envelope = Envelope::default();
    loop {
        let kind = match mux.select() {
            Ok(k) => k,
            Err(e) => {
                tracing::error!(error = ?e, "multiplexer select failed, stopping sender");
                break;
            }
        };

        envelope.clear();
        let listener = mux
            .listener_mut(kind)
            .expect("select only returns kinds with a registered listener");
        if let Err(e) = listener.listen_encoded(&mut envelope) {
            tracing::error!(error = ?e, "failed to encode a selected event");
            continue;
        }

        if let Err(e) = send_transport.send(&envelope) {
            tracing::error!(error = ?e, "transport send failed, stopping sender");
            break;
        }
    }

    let _ = receiver.join();
    ExitCode::FAILURE
}
