//! Simulator Transport: turns a raw byte stream into a stream of typed
//! envelopes and back, framing each one with COWS and a `0x00 0x00`
//! inter-frame delimiter.

use guest_icd::Envelope;
use tracing::{debug, warn};

use crate::config::MAX_PACKET_SIZE;
use crate::error::TransportError;
use crate::serial::{SerialBackend, SerialLink};

/// Owns the framing state machine and both buffers. Not `Clone`: the send
/// buffer belongs to the sending thread, the receive buffer to the
/// receiving thread (see the concurrency notes on [`SimulatorTransport`]'s
/// use across two threads in `guest-firmware`).
pub struct SimulatorTransport<B: SerialBackend> {
    link: SerialLink<B>,
    send_buf: Vec<u8>,
    recv_buf: Vec<u8>,
    synced: bool,
    used: usize,
}

impl<B: SerialBackend> SimulatorTransport<B> {
    /// Opens the transport: the backend is assumed already configured
    /// (line settings, baud) by the caller. Writes a single zero word so a
    /// peer searching for `0x00 0x00` can align immediately.
    pub fn open(backend: B) -> Result<Self, TransportError> {
        let mut link = SerialLink::new(backend);
        link.send_all(&[0, 0])?;
        Ok(SimulatorTransport {
            link,
            send_buf: vec![0u8; MAX_PACKET_SIZE],
            recv_buf: vec![0u8; MAX_PACKET_SIZE],
            synced: false,
            used: 0,
        })
    }

    /// Serializes `msg`, COWS-stuffs it, and writes the framed bytes
    /// (trailing `0x00 0x00` included) to the serial link.
    pub fn send(&mut self, msg: &Envelope) -> Result<(), TransportError> {
        let l = {
            let dest = &mut self.send_buf[2..];
            let written = postcard::to_slice(msg, dest)?;
            written.len()
        };

        let cows_len = l + 4;
        let padded_len = cows_len + (cows_len % 2);
        if padded_len >= MAX_PACKET_SIZE {
            return Err(TransportError::MessageTooLarge);
        }

        guest_cows::stuff(&mut self.send_buf[..padded_len], padded_len / 2);
        self.send_buf[cows_len - 2] = 0;
        self.send_buf[cows_len - 1] = 0;

        self.link.send_all(&self.send_buf[..cows_len])?;
        Ok(())
    }

    /// Blocks until one complete frame is available, unstuffs and parses
    /// it, and advances the receive buffer past it.
    ///
    /// On a hard I/O error the receive state is fully reset (`used = 0`,
    /// `synced = false`) so the next call resyncs from scratch. On a
    /// frame-level error (oversize, parse failure) `used`/`synced` are left
    /// as documented per case: oversize resets both, a parse failure keeps
    /// `synced = true` because a valid boundary was in fact found.
    pub fn recv(&mut self) -> Result<Envelope, TransportError> {
        if !self.synced {
            self.sync()?;
        }

        let packet_end = self.accumulate_until_delimiter()?;

        let cows_end_words = (packet_end + packet_end % 2) / 2;
        guest_cows::unstuff(&mut self.recv_buf[..cows_end_words * 2], cows_end_words);

        let parsed = postcard::from_bytes::<Envelope>(&self.recv_buf[2..packet_end])
            .map_err(TransportError::Parse);

        self.clear_packet(packet_end);

        parsed
    }

    fn sync(&mut self) -> Result<(), TransportError> {
        let mut window = [0u8; 2];
        self.link.recv_exact(&mut window)?;
        while window != [0, 0] {
            window[0] = window[1];
            self.link.recv_exact(&mut window[1..2])?;
        }
        self.synced = true;
        debug!("transport synced");
        Ok(())
    }

    fn accumulate_until_delimiter(&mut self) -> Result<usize, TransportError> {
        // Always scan from the start of whatever is already buffered: a
        // prior burst may have left a complete frame (or more) sitting in
        // `recv_buf` already, and its delimiter can be anywhere in
        // `0..used`. The `old_used - 1` optimization below only applies
        // after a fresh read, where everything before it was already
        // scanned and found clean.
        let mut search_from = 0;
        loop {
            let packet_end = find_end(&self.recv_buf, search_from, self.used);
            if packet_end != 0 {
                return Ok(packet_end);
            }

            if self.used == MAX_PACKET_SIZE {
                warn!("buffer full without finding a delimiter; resetting");
                self.used = 0;
                self.synced = false;
                return Err(TransportError::Oversize);
            }

            let old_used = self.used;
            let n = match self.link.recv_some(&mut self.recv_buf[old_used..MAX_PACKET_SIZE]) {
                Ok(n) => n,
                Err(e) => {
                    self.used = 0;
                    self.synced = false;
                    return Err(e.into());
                }
            };

            search_from = if old_used == 0 { 0 } else { old_used - 1 };
            self.used = old_used + n;
        }
    }

    fn clear_packet(&mut self, packet_end: usize) {
        let tail_start = packet_end + 2;
        self.recv_buf.copy_within(tail_start..self.used, 0);
        self.used -= tail_start;
    }
}

/// Scans `buf[search_from..used]` for the first pair of adjacent zero
/// bytes, returning the index of the first byte of the pair (the start of
/// the stuffed frame's trailing delimiter), or 0 if none is found yet. 0 is
/// never a valid result for a real frame: the shortest possible frame is
/// the two-byte overhead word plus the delimiter, so a genuine delimiter
/// never starts before index 2.
fn find_end(buf: &[u8], search_from: usize, used: usize) -> usize {
    if used < 2 {
        return 0;
    }
    let mut i = search_from;
    while i + 1 < used {
        if buf[i] == 0 && buf[i + 1] == 0 {
            return i;
        }
        i += 1;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::mock::MockSerialBackend;
    use guest_icd::SystemMessage;

    fn transport_with(chunks: Vec<Vec<u8>>) -> SimulatorTransport<MockSerialBackend> {
        let mut backend = MockSerialBackend::new();
        // Consume the Open handshake's leading `0 0` write before queuing
        // any inbound test data.
        for c in chunks {
            backend.push_chunk(c);
        }
        SimulatorTransport::open(backend).expect("open should only write, not read")
    }

    fn frame_bytes(msg: &Envelope) -> Vec<u8> {
        let mut scratch = vec![0u8; MAX_PACKET_SIZE];
        let l = postcard::to_slice(msg, &mut scratch[2..]).unwrap().len();
        let cows_len = l + 4;
        let padded_len = cows_len + (cows_len % 2);
        guest_cows::stuff(&mut scratch[..padded_len], padded_len / 2);
        scratch[cows_len - 2] = 0;
        scratch[cows_len - 1] = 0;
        scratch.truncate(cows_len);
        scratch
    }

    #[test]
    fn round_trip_single_frame() {
        let msg = Envelope {
            system: Some(SystemMessage { shutdown: true }),
            graphics: None,
        };
        let mut wire = vec![0u8, 0u8]; // leading sync delimiter
        wire.extend(frame_bytes(&msg));

        let mut t = transport_with(vec![wire]);
        let got = t.recv().expect("should parse one frame");
        assert_eq!(got, msg);
    }

    #[test]
    fn straddled_delimiter_across_two_reads() {
        let msg = Envelope {
            system: Some(SystemMessage { shutdown: false }),
            graphics: None,
        };
        let mut frame = vec![0u8, 0u8];
        frame.extend(frame_bytes(&msg));

        // Split right after the first byte of the trailing delimiter.
        let split = frame.len() - 1;
        let (a, b) = frame.split_at(split);

        let mut t = transport_with(vec![a.to_vec(), b.to_vec()]);
        let got = t.recv().expect("delimiter straddling two reads still parses");
        assert_eq!(got, msg);
    }

    #[test]
    fn two_frames_in_one_read() {
        let a = Envelope {
            system: Some(SystemMessage { shutdown: true }),
            graphics: None,
        };
        let b = Envelope {
            system: Some(SystemMessage { shutdown: false }),
            graphics: None,
        };

        let mut wire = vec![0u8, 0u8];
        wire.extend(frame_bytes(&a));
        wire.extend(frame_bytes(&b));

        let mut t = transport_with(vec![wire]);
        assert_eq!(t.recv().unwrap(), a);
        assert_eq!(t.recv().unwrap(), b);
    }

    #[test]
    fn oversize_frame_resets_and_resyncs() {
        // Never-zero bytes filling the whole buffer: no delimiter appears.
        let mut wire = vec![0u8, 0u8];
        wire.extend(std::iter::repeat(0xAAu8).take(MAX_PACKET_SIZE + 64));

        let mut t = transport_with(vec![wire]);
        let err = t.recv().unwrap_err();
        assert!(matches!(err, TransportError::Oversize | TransportError::Serial(_)));
    }
}
