//! Demo graphics producer: stands in for a real graphics subsystem task,
//! dispatching a handful of sample full-screen frames onto the Graphics
//! queue so the rest of the pipeline (simulator process sending thread,
//! host simulator) can be exercised end to end.

use std::env;
use std::thread::sleep;
use std::time::Duration;

use guest_core::dispatch::EncodedDispatch;
use guest_icd::{GraphicsMessage, IMAGE_LEN};

fn frame(byte: u8) -> GraphicsMessage {
    let data = heapless::Vec::from_slice(&[byte; IMAGE_LEN]).expect("IMAGE_LEN fits the wire buffer");
    GraphicsMessage::paint(data)
}

fn main() {
    tracing_subscriber::fmt::init();

    let frame_count: usize = env::var("GUEST_DEMO_FRAME_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);

    let mut dispatcher = guest_firmware::create_graphics_dispatcher()
        .expect("failed to create the graphics queues");

    // All-white, then all-black, then back to white, repeating: enough to
    // see the frame actually change on the host side.
    let palette = [0xFFu8, 0x00u8];
    for i in 0..frame_count {
        let byte = palette[i % palette.len()];
        dispatcher
            .dispatch_encoded(frame(byte))
            .expect("failed to dispatch a demo frame");
        tracing::info!(frame = i, byte, "dispatched demo frame");
        sleep(Duration::from_secs(1));
    }
}
