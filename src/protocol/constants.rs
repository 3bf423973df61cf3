//! MR60BHA2 wire constants
//!
//! Frame layout (header fields big-endian, payload fields little-endian):
//!
//! ```text
//! SOF(1) | ID(2) | LEN(2) | TYPE(2) | HEAD_CKSUM(1) | DATA(LEN) | DATA_CKSUM(1)
//! ```

// ============================================================================
// Framing
// ============================================================================

/// Start-of-frame marker
pub const SOF_BYTE: u8 = 0x01;

pub const SIZE_SOF: usize = 1;
pub const SIZE_ID: usize = 2;
pub const SIZE_LEN: usize = 2;
pub const SIZE_TYPE: usize = 2;
pub const SIZE_HEAD_CKSUM: usize = 1;
pub const SIZE_DATA_CKSUM: usize = 1;

/// Bytes covered by the header checksum: SOF + ID + LEN + TYPE
pub const SIZE_HEADER_FIELDS: usize = SIZE_SOF + SIZE_ID + SIZE_LEN + SIZE_TYPE;

/// Full header including its checksum byte
pub const SIZE_FRAME_HEADER: usize = SIZE_HEADER_FIELDS + SIZE_HEAD_CKSUM;

/// Smallest possible frame (empty payload)
pub const MIN_FRAME_SIZE: usize = SIZE_FRAME_HEADER + SIZE_DATA_CKSUM;

// Header field offsets (from SOF)
pub const OFFSET_ID: usize = 1;
pub const OFFSET_LEN: usize = 3;
pub const OFFSET_TYPE: usize = 5;

/// Default bound on the LEN field; longer frames are treated as corruption.
///
/// The largest data frame (phases) carries 12 bytes.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 30;

/// Hard capacity of the synchronizer payload buffer
pub const PAYLOAD_CAPACITY: usize = 256;

/// First frame ID used by the frame builder; IDs wrap back here
pub const FRAME_ID_START: u16 = 0x8000;

// ============================================================================
// Frame types
// ============================================================================

pub const TYPE_HEART_BREATH_PHASE: u16 = 0x0A13;
pub const TYPE_BREATH_RATE: u16 = 0x0A14;
pub const TYPE_HEART_RATE: u16 = 0x0A15;
pub const TYPE_HEART_BREATH_DISTANCE: u16 = 0x0A16;

/// Diagnostic text frames (e.g. "invalid BR = 7082")
pub const TYPE_DEBUG_TEXT: u16 = 0x0100;

/// Range of type codes carrying diagnostic text
pub const DEBUG_TEXT_TYPES: std::ops::RangeInclusive<u16> = 0x0100..=0x01FF;

// ============================================================================
// Payload sizes
// ============================================================================

/// Three f32: total, breath, heart phase
pub const PHASE_PAYLOAD_SIZE: usize = 12;
/// One f32
pub const RATE_PAYLOAD_SIZE: usize = 4;
/// u32 flag + f32 range
pub const DISTANCE_PAYLOAD_SIZE: usize = 8;
