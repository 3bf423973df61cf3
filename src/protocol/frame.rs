//! Frame primitives: checksum, received frames and the frame builder
//!
//! - `checksum`: inverted XOR shared by header and data
//! - `RawFrame`: a validated frame with a fixed-size payload buffer
//! - `FrameBuilder`: produces wire-exact frames (mock sources, tests, captures)

use super::constants::*;

// ============================================================================
// Checksum
// ============================================================================

/// MR60BHA2 checksum: XOR of all covered bytes, bitwise inverted
///
/// ```ignore
/// // Header of a distance frame: 01 00 00 00 08 0A 16
/// assert_eq!(checksum(&[0x01, 0x00, 0x00, 0x00, 0x08, 0x0A, 0x16]), 0xEA);
/// ```
#[inline]
pub fn checksum(data: &[u8]) -> u8 {
    !data.iter().fold(0u8, |acc, &b| acc ^ b)
}

// ============================================================================
// Received frame
// ============================================================================

/// A frame whose header and data checksums have both been verified
///
/// Only the synchronizer constructs these, so holding one means the bytes
/// passed validation. The payload lives in a fixed array to keep the hot
/// path allocation-free.
#[derive(Clone, Copy)]
pub struct RawFrame {
    pub id: u16,
    pub type_code: u16,
    payload: [u8; PAYLOAD_CAPACITY],
    payload_len: usize,
}

impl RawFrame {
    pub(crate) const fn empty() -> Self {
        Self {
            id: 0,
            type_code: 0,
            payload: [0u8; PAYLOAD_CAPACITY],
            payload_len: 0,
        }
    }

    /// Get the payload as a slice
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len]
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    #[inline]
    pub(crate) fn set(&mut self, id: u16, type_code: u16, data: &[u8]) {
        let len = data.len().min(PAYLOAD_CAPACITY);
        self.id = id;
        self.type_code = type_code;
        self.payload[..len].copy_from_slice(&data[..len]);
        self.payload_len = len;
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("id", &format_args!("0x{:04X}", self.id))
            .field("type_code", &format_args!("0x{:04X}", self.type_code))
            .field("payload", &format_args!("{:02X?}", self.payload()))
            .finish()
    }
}

impl PartialEq for RawFrame {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.type_code == other.type_code && self.payload() == other.payload()
    }
}

impl Eq for RawFrame {}

// ============================================================================
// Frame builder
// ============================================================================

/// Builds complete frames with a rolling frame ID
///
/// IDs start at 0x8000 and wrap back to 0x8000 after 0xFFFF.
///
/// # Example
///
/// ```ignore
/// let mut builder = FrameBuilder::new();
/// let frame = builder.build(TYPE_HEART_RATE, &72.0f32.to_le_bytes());
/// mock.inject_read(&frame);
/// ```
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    next_id: u16,
}

impl FrameBuilder {
    pub const fn new() -> Self {
        Self {
            next_id: FRAME_ID_START,
        }
    }

    /// Start the ID sequence somewhere else (captures, tests)
    pub const fn with_id(id: u16) -> Self {
        Self { next_id: id }
    }

    /// ID the next frame will carry
    #[inline]
    pub fn next_id(&self) -> u16 {
        self.next_id
    }

    /// Encode one frame and advance the ID counter
    ///
    /// The data checksum byte is always appended, even for an empty payload.
    pub fn build(&mut self, type_code: u16, data: &[u8]) -> Vec<u8> {
        let frame = encode_frame(self.next_id, type_code, data);
        self.next_id = match self.next_id.wrapping_add(1) {
            0 => FRAME_ID_START,
            id => id,
        };
        frame
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a single frame with an explicit ID
///
/// `data` must fit in the 16-bit LEN field.
pub fn encode_frame(id: u16, type_code: u16, data: &[u8]) -> Vec<u8> {
    let len = u16::try_from(data.len()).unwrap_or(u16::MAX);
    let data = &data[..len as usize];

    let mut frame = Vec::with_capacity(MIN_FRAME_SIZE + data.len());
    frame.push(SOF_BYTE);
    frame.extend_from_slice(&id.to_be_bytes());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&type_code.to_be_bytes());
    frame.push(checksum(&frame));
    frame.extend_from_slice(data);
    frame.push(checksum(data));
    frame
}
