//! Serial Backend abstraction and the Serial Link retry wrapper around it.

use crate::error::SerialError;

/// Raw open/read/write primitive. Line configuration (8N1, no flow control,
/// raw mode, baud) is applied once at construction time by whatever
/// implements this trait; `read`/`write` are plain blocking calls, the same
/// contract `std::io::Read`/`std::io::Write` give a file descriptor.
pub trait SerialBackend: Send {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;
    fn write(&mut self, buf: &[u8]) -> Result<usize, SerialError>;
}

/// Thin, testable wrapper that turns a [`SerialBackend`]'s single-shot
/// reads/writes into the three operations the transport actually needs.
pub struct SerialLink<B: SerialBackend> {
    backend: B,
}

impl<B: SerialBackend> SerialLink<B> {
    pub fn new(backend: B) -> Self {
        SerialLink { backend }
    }

    /// Retries short writes until the whole buffer is drained. A zero-byte
    /// write (or any I/O error) is treated as fatal, matching a closed or
    /// dead peer.
    pub fn send_all(&mut self, mut buf: &[u8]) -> Result<(), SerialError> {
        while !buf.is_empty() {
            let n = self.backend.write(buf)?;
            if n == 0 {
                return Err(SerialError::Eof);
            }
            buf = &buf[n..];
        }
        Ok(())
    }

    /// Retries short reads until `buf` is completely filled.
    pub fn recv_exact(&mut self, mut buf: &mut [u8]) -> Result<(), SerialError> {
        while !buf.is_empty() {
            let n = self.backend.read(buf)?;
            if n == 0 {
                return Err(SerialError::Eof);
            }
            buf = &mut buf[n..];
        }
        Ok(())
    }

    /// A single read that may return fewer bytes than requested, letting
    /// the transport interleave framing work with I/O.
    pub fn recv_some(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let n = self.backend.read(buf)?;
        if n == 0 {
            return Err(SerialError::Eof);
        }
        Ok(n)
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;

    /// An in-memory backend for transport tests: reads drain a queued byte
    /// stream (optionally in caller-chosen chunk sizes), writes append to a
    /// captured buffer.
    pub struct MockSerialBackend {
        pub inbound: VecDeque<Vec<u8>>,
        pub outbound: Vec<u8>,
    }

    impl MockSerialBackend {
        pub fn new() -> Self {
            MockSerialBackend {
                inbound: VecDeque::new(),
                outbound: Vec::new(),
            }
        }

        /// Queues a chunk that a single `read` call will return in full.
        pub fn push_chunk(&mut self, chunk: impl Into<Vec<u8>>) {
            self.inbound.push_back(chunk.into());
        }
    }

    impl SerialBackend for MockSerialBackend {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
            let Some(chunk) = self.inbound.pop_front() else {
                return Err(SerialError::Eof);
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                // Put back what didn't fit, preserving order.
                let mut remainder = chunk;
                remainder.drain(..n);
                self.inbound.push_front(remainder);
            }
            Ok(n)
        }

        fn write(&mut self, buf: &[u8]) -> Result<usize, SerialError> {
            self.outbound.extend_from_slice(buf);
            Ok(buf.len())
        }
    }
}
