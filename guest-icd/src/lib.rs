//! Wire types carried inside the serial envelope, shared between the guest
//! firmware and the simulator host. Kept deliberately small and `no_std`,
//! the same way `james-icd` holds nothing but message shapes.
#![no_std]

use postcard_schema::Schema;
use serde::{Deserialize, Serialize};

/// Screen width in pixels. Fixed at compile time, per the external
/// interfaces: changing it changes the graphics-event size.
pub const SCREEN_WIDTH: u16 = 160;
/// Screen height in pixels.
pub const SCREEN_HEIGHT: u16 = 128;
/// Bytes per pixel: packed RGB.
pub const BYTES_PER_PIXEL: usize = 3;
/// Size of one full-screen frame: `width * height * 3`.
pub const IMAGE_LEN: usize = SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize * BYTES_PER_PIXEL;

/// Graphics subsystem operations. `Paint` is the only member today; the
/// type exists so new operations can be added without breaking callers that
/// match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub enum GraphicsOp {
    Paint,
}

/// A full-screen image frame, device→host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Schema)]
pub struct GraphicsMessage {
    pub op_type: GraphicsOp,
    pub width: u16,
    pub height: u16,
    pub data: heapless::Vec<u8, IMAGE_LEN>,
}

impl GraphicsMessage {
    /// Builds a full-screen paint message from a packed RGB buffer sized
    /// exactly `SCREEN_WIDTH * SCREEN_HEIGHT * 3`.
    pub fn paint(data: heapless::Vec<u8, IMAGE_LEN>) -> Self {
        GraphicsMessage {
            op_type: GraphicsOp::Paint,
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            data,
        }
    }
}

/// System-control subsystem command, host→device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct SystemMessage {
    pub shutdown: bool,
}

/// The cross-boundary unit. Each field is an optional sub-message; the
/// receiver dispatches whichever are present. Reused across send cycles, so
/// callers should [`Envelope::clear`] it between cycles rather than
/// allocating a fresh one (see the simulator process' sending thread).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Schema)]
pub struct Envelope {
    pub system: Option<SystemMessage>,
    pub graphics: Option<GraphicsMessage>,
}

impl Envelope {
    pub fn clear(&mut self) {
        self.system = None;
        self.graphics = None;
    }
}
