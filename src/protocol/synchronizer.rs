//! Frame synchronizer
//!
//! Byte-at-a-time state machine that turns a noisy stream into validated
//! [`RawFrame`]s:
//!
//! ```text
//! SeekSof --0x01--> ReadHeader --cksum ok--> ReadPayload --LEN bytes--> Validate
//!    ^                  |  cksum bad: replay bytes after the false SOF       |
//!    |                  |  LEN > max: drop header                             |
//!    +------------------+----------------------------------------------------+
//! ```
//!
//! Partial state survives across calls, so feeding one byte at a time yields
//! exactly the same frames as feeding the whole stream at once. Framing errors
//! are never reported to the caller; they only show up in [`SyncStats`].

use super::constants::*;
use super::frame::{checksum, RawFrame};

/// Synchronizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Discarding bytes until a start-of-frame marker
    SeekSof,
    /// Collecting ID, LEN, TYPE and the header checksum
    ReadHeader,
    /// Collecting LEN payload bytes
    ReadPayload,
    /// Waiting for the data checksum byte
    Validate,
}

/// Framing counters, cumulative since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Frames that passed both checksums
    pub frames: u64,
    pub header_checksum_errors: u64,
    pub data_checksum_errors: u64,
    /// Headers whose LEN exceeded the configured maximum
    pub oversized_lengths: u64,
    /// Bytes thrown away as noise or as part of a rejected frame
    pub discarded_bytes: u64,
}

impl SyncStats {
    /// All rejected frames, whatever the reason
    pub fn framing_errors(&self) -> u64 {
        self.header_checksum_errors + self.data_checksum_errors + self.oversized_lengths
    }
}

/// Outcome of feeding one byte to the state machine
enum Step {
    Pending,
    Frame,
    /// Header rejected; these bytes followed the false SOF and must be re-scanned
    Replay([u8; SIZE_FRAME_HEADER - SIZE_SOF]),
}

/// Stream-to-frame synchronizer with a bounded payload buffer
pub struct FrameSynchronizer {
    state: SyncState,
    header: [u8; SIZE_FRAME_HEADER],
    header_len: usize,
    payload: [u8; PAYLOAD_CAPACITY],
    payload_len: usize,
    expected_len: usize,
    max_payload_len: usize,
    /// Reusable output frame - avoids allocation on every emit
    frame: RawFrame,
    stats: SyncStats,
}

impl FrameSynchronizer {
    /// Synchronizer accepting payloads up to [`DEFAULT_MAX_PAYLOAD_LEN`]
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD_LEN)
    }

    /// Synchronizer with a custom LEN bound (clamped to [`PAYLOAD_CAPACITY`])
    pub fn with_max_payload(max_payload_len: usize) -> Self {
        Self {
            state: SyncState::SeekSof,
            header: [0u8; SIZE_FRAME_HEADER],
            header_len: 0,
            payload: [0u8; PAYLOAD_CAPACITY],
            payload_len: 0,
            expected_len: 0,
            max_payload_len: max_payload_len.min(PAYLOAD_CAPACITY),
            frame: RawFrame::empty(),
            stats: SyncStats::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> SyncState {
        self.state
    }

    #[inline]
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    #[inline]
    pub fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    /// Drop any partially received frame and go back to hunting for SOF
    pub fn reset(&mut self) {
        self.state = SyncState::SeekSof;
        self.header_len = 0;
        self.payload_len = 0;
        self.expected_len = 0;
    }

    /// Feed one byte
    ///
    /// Returns the completed frame when this byte was its data checksum and
    /// both checksums matched. The reference is valid until the next call.
    pub fn push(&mut self, byte: u8) -> Option<&RawFrame> {
        match self.step(byte) {
            Step::Pending => None,
            Step::Frame => Some(&self.frame),
            Step::Replay(bytes) => {
                // Fewer bytes than a minimal frame: they can only re-arm the header state
                for b in bytes {
                    let step = self.step(b);
                    debug_assert!(matches!(step, Step::Pending));
                }
                None
            }
        }
    }

    /// Feed a chunk of bytes, calling `on_frame` for every validated frame
    ///
    /// Returns the number of frames emitted.
    pub fn feed<F: FnMut(&RawFrame)>(&mut self, bytes: &[u8], mut on_frame: F) -> usize {
        let mut count = 0;
        for &b in bytes {
            if let Some(frame) = self.push(b) {
                on_frame(frame);
                count += 1;
            }
        }
        count
    }

    fn step(&mut self, byte: u8) -> Step {
        match self.state {
            SyncState::SeekSof => {
                if byte == SOF_BYTE {
                    self.header[0] = byte;
                    self.header_len = SIZE_SOF;
                    self.state = SyncState::ReadHeader;
                } else {
                    self.stats.discarded_bytes += 1;
                    log::trace!("Discarding noise byte 0x{:02X}", byte);
                }
                Step::Pending
            }
            SyncState::ReadHeader => {
                self.header[self.header_len] = byte;
                self.header_len += 1;
                if self.header_len < SIZE_FRAME_HEADER {
                    return Step::Pending;
                }
                self.check_header()
            }
            SyncState::ReadPayload => {
                self.payload[self.payload_len] = byte;
                self.payload_len += 1;
                if self.payload_len == self.expected_len {
                    self.state = SyncState::Validate;
                }
                Step::Pending
            }
            SyncState::Validate => self.check_data(byte),
        }
    }

    fn check_header(&mut self) -> Step {
        let received = self.header[SIZE_HEADER_FIELDS];
        let calculated = checksum(&self.header[..SIZE_HEADER_FIELDS]);

        if received != calculated {
            log::warn!(
                "Invalid header checksum: received=0x{:02X}, calculated=0x{:02X}, resynchronizing",
                received,
                calculated
            );
            self.stats.header_checksum_errors += 1;
            // Only the false SOF is dropped; everything after it gets another look
            self.stats.discarded_bytes += SIZE_SOF as u64;
            let mut replay = [0u8; SIZE_FRAME_HEADER - SIZE_SOF];
            replay.copy_from_slice(&self.header[SIZE_SOF..]);
            self.reset();
            return Step::Replay(replay);
        }

        let len = self.header_u16(OFFSET_LEN) as usize;
        if len > self.max_payload_len {
            log::warn!(
                "Data length too large: {} (max {}), resynchronizing",
                len,
                self.max_payload_len
            );
            self.stats.oversized_lengths += 1;
            self.stats.discarded_bytes += SIZE_FRAME_HEADER as u64;
            self.reset();
            return Step::Pending;
        }

        self.expected_len = len;
        self.payload_len = 0;
        self.state = if len == 0 {
            SyncState::Validate
        } else {
            SyncState::ReadPayload
        };
        Step::Pending
    }

    fn check_data(&mut self, received: u8) -> Step {
        let data = &self.payload[..self.payload_len];
        let calculated = checksum(data);
        let id = self.header_u16(OFFSET_ID);
        let type_code = self.header_u16(OFFSET_TYPE);

        let step = if received == calculated {
            self.frame.set(id, type_code, data);
            self.stats.frames += 1;
            Step::Frame
        } else {
            log::warn!(
                "Data checksum mismatch for TYPE=0x{:04X}: received=0x{:02X}, calculated=0x{:02X}",
                type_code,
                received,
                calculated
            );
            self.stats.data_checksum_errors += 1;
            self.stats.discarded_bytes += (MIN_FRAME_SIZE + self.payload_len) as u64;
            Step::Pending
        };

        self.reset();
        step
    }

    /// Big-endian header field at `offset`
    #[inline]
    fn header_u16(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.header[offset], self.header[offset + 1]])
    }
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
