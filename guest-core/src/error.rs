use std::io;

/// Hard I/O failure on the serial link. Transient short reads/writes are
/// absorbed by [`crate::serial::SerialLink`]'s retry loops and never
/// surface as this error.
#[derive(thiserror::Error, Debug)]
pub enum SerialError {
    #[error("serial device returned EOF")]
    Eof,
    #[error("serial I/O error")]
    Io(#[from] io::Error),
}

/// Failure from the framing state machine.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("serial link failed")]
    Serial(#[from] SerialError),
    #[error("frame exceeded MAX_PACKET_SIZE before a delimiter was found")]
    Oversize,
    #[error("message did not fit in the send buffer")]
    MessageTooLarge,
    #[error("failed to serialize outgoing message")]
    Encode(#[from] postcard::Error),
    #[error("failed to parse an accumulated frame")]
    Parse(postcard::Error),
}

/// Failure from a bounded queue endpoint.
#[derive(thiserror::Error, Debug)]
pub enum QueueError {
    #[error("no consumer is attached to this queue")]
    Closed,
    #[error("queue is empty")]
    Empty,
    #[error("shared-memory queue backing store failed")]
    Shm(#[from] shared_memory::ShmemError),
}

/// Failure from a dispatcher.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("event queue is closed; consumer is presumed dead")]
    QueueClosed,
    #[error("failed to notify the multiplexer after a successful enqueue")]
    NotifyFailed,
}

/// Failure from one System Manager loop iteration.
#[derive(thiserror::Error, Debug)]
pub enum SystemManagerError {
    #[error("system event queue failed")]
    Queue(#[from] QueueError),
    #[error("halt() returned instead of powering off")]
    HaltReturned,
}
