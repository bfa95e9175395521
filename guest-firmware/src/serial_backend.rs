//! A [`guest_core::serial::SerialBackend`] backed by a real TTY, opened
//! through the `serialport` crate.

use std::io;
use std::time::Duration;

use guest_core::error::SerialError;
use guest_core::serial::SerialBackend;

/// `serialport`'s blocking read/write give up and return a timeout error
/// after this long with no progress. [`SerialBackend`]'s contract requires
/// plain blocking calls, so a timeout is retried in a loop here rather than
/// surfaced to the link as a zero-byte read (which means EOF).
const IO_TIMEOUT: Duration = Duration::from_millis(500);

/// Opens a TTY (virtio-serial port, UART, pty, ...) with the 8-N-1, no flow
/// control framing the simulator host expects.
pub struct TtySerialBackend {
    port: Box<dyn serialport::SerialPort>,
}

impl TtySerialBackend {
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, SerialError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(IO_TIMEOUT)
            .open()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(TtySerialBackend { port })
    }

    /// Duplicates the underlying file descriptor so the receiving and
    /// sending threads can each own a backend, reading and writing
    /// concurrently with no lock between them — the two directions of a
    /// UART are already independent hardware channels.
    pub fn try_clone(&self) -> Result<Self, SerialError> {
        let port = self
            .port
            .try_clone()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(TtySerialBackend { port })
    }
}

impl SerialBackend for TtySerialBackend {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        loop {
            match self.port.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(SerialError::Io(e)),
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, SerialError> {
        loop {
            match self.port.write(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(SerialError::Io(e)),
            }
        }
    }
}
