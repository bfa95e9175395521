//! Compile-time configuration. All fixed at build time, per the external
//! interfaces section: changing any of these changes the wire shape.

/// Default serial device path.
pub const DEFAULT_DEVICE: &str = "/dev/vport1p1";
/// Default baud rate.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Largest frame (stuffed, including the leading overhead word and the
/// trailing delimiter) the transport will hold. Sized well above one
/// stuffed, padded graphics envelope. Must be even: all COWS operations
/// work in whole words.
pub const MAX_PACKET_SIZE: usize = 65_536;

const _: () = assert!(MAX_PACKET_SIZE % 2 == 0, "MAX_PACKET_SIZE must be even");

/// Reserved queue names (see the external-interfaces section).
pub const SYS_MANAGER_QUEUE: &str = "SysManagerQueue";
pub const GRAPHICS_QUEUE: &str = "GraphicsQueue";
pub const EVENT_NOTIFY_QUEUE: &str = "EventNotifyQueue";

/// Capacity of the graphics queue: most-recent-frame-wins back-pressure.
pub const GRAPHICS_QUEUE_CAPACITY: usize = 1;
