//! Payload decoder
//!
//! Maps a validated frame's type code and payload to a typed [`Measurement`].
//! Numeric payload fields are little-endian (unlike the big-endian header).
//! A known type code with the wrong payload length decodes to
//! [`Measurement::Unknown`] instead of failing.

use super::constants::*;
use super::frame::RawFrame;

/// Frame types understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    HeartBreathPhase,
    BreathRate,
    HeartRate,
    HeartBreathDistance,
    DebugText(u16),
    Unknown(u16),
}

impl From<u16> for FrameType {
    fn from(value: u16) -> Self {
        match value {
            TYPE_HEART_BREATH_PHASE => FrameType::HeartBreathPhase,
            TYPE_BREATH_RATE => FrameType::BreathRate,
            TYPE_HEART_RATE => FrameType::HeartRate,
            TYPE_HEART_BREATH_DISTANCE => FrameType::HeartBreathDistance,
            code if DEBUG_TEXT_TYPES.contains(&code) => FrameType::DebugText(code),
            code => FrameType::Unknown(code),
        }
    }
}

impl FrameType {
    /// Payload size a frame of this type must carry, if fixed
    pub fn expected_len(&self) -> Option<usize> {
        match self {
            FrameType::HeartBreathPhase => Some(PHASE_PAYLOAD_SIZE),
            FrameType::BreathRate | FrameType::HeartRate => Some(RATE_PAYLOAD_SIZE),
            FrameType::HeartBreathDistance => Some(DISTANCE_PAYLOAD_SIZE),
            FrameType::DebugText(_) | FrameType::Unknown(_) => None,
        }
    }
}

/// Distance to the tracked subject
///
/// `detected == true` with a range of tens of meters is a valid frame but a
/// low-confidence reading; callers decide whether to trust it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub detected: bool,
    pub range_m: f32,
}

/// Heart and breath phase values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phases {
    pub total: f32,
    pub breath: f32,
    pub heart: f32,
}

/// Diagnostic text emitted by the sensor firmware
///
/// The bytes are kept verbatim; they are usually ASCII but not guaranteed UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugText {
    pub code: u16,
    pub text: Vec<u8>,
}

impl DebugText {
    /// Text with invalid UTF-8 replaced and trailing NULs/whitespace trimmed
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.text)
            .trim_end_matches(['\0', '\r', '\n', ' '])
            .to_string()
    }
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    HeartRate { bpm: f32 },
    BreathRate { bpm: f32 },
    Distance(Distance),
    Phases(Phases),
    DebugText(DebugText),
    /// Unrecognised type code, or a known code with an inconsistent length
    Unknown { type_code: u16, payload: Vec<u8> },
}

impl Measurement {
    /// Type code this measurement was decoded from (best effort for typed variants)
    pub fn type_code(&self) -> u16 {
        match self {
            Measurement::HeartRate { .. } => TYPE_HEART_RATE,
            Measurement::BreathRate { .. } => TYPE_BREATH_RATE,
            Measurement::Distance(_) => TYPE_HEART_BREATH_DISTANCE,
            Measurement::Phases(_) => TYPE_HEART_BREATH_PHASE,
            Measurement::DebugText(text) => text.code,
            Measurement::Unknown { type_code, .. } => *type_code,
        }
    }
}

/// Decode a validated frame
#[inline]
pub fn decode_frame(frame: &RawFrame) -> Measurement {
    decode(frame.type_code, frame.payload())
}

/// Decode a payload according to its type code
pub fn decode(type_code: u16, payload: &[u8]) -> Measurement {
    let frame_type = FrameType::from(type_code);

    let decoded = match frame_type {
        FrameType::HeartBreathPhase => {
            fixed::<PHASE_PAYLOAD_SIZE>(payload).map(|b| {
                Measurement::Phases(Phases {
                    total: f32_le(&b, 0),
                    breath: f32_le(&b, 4),
                    heart: f32_le(&b, 8),
                })
            })
        }
        FrameType::BreathRate => fixed::<RATE_PAYLOAD_SIZE>(payload)
            .map(|b| Measurement::BreathRate { bpm: f32::from_le_bytes(b) }),
        FrameType::HeartRate => fixed::<RATE_PAYLOAD_SIZE>(payload)
            .map(|b| Measurement::HeartRate { bpm: f32::from_le_bytes(b) }),
        FrameType::HeartBreathDistance => fixed::<DISTANCE_PAYLOAD_SIZE>(payload).map(|b| {
            Measurement::Distance(Distance {
                detected: u32::from_le_bytes([b[0], b[1], b[2], b[3]]) != 0,
                range_m: f32_le(&b, 4),
            })
        }),
        FrameType::DebugText(code) => Some(Measurement::DebugText(DebugText {
            code,
            text: payload.to_vec(),
        })),
        FrameType::Unknown(code) => {
            log::debug!("Unknown frame type: 0x{:04X}", code);
            None
        }
    };

    decoded.unwrap_or_else(|| {
        if let Some(expected) = frame_type.expected_len() {
            log::warn!(
                "Payload length mismatch for TYPE=0x{:04X}: got {}, expected {}",
                type_code,
                payload.len(),
                expected
            );
        }
        Measurement::Unknown {
            type_code,
            payload: payload.to_vec(),
        }
    })
}

/// Payload as a fixed-size array, only if the length matches exactly
#[inline]
fn fixed<const N: usize>(payload: &[u8]) -> Option<[u8; N]> {
    <[u8; N]>::try_from(payload).ok()
}

#[inline]
fn f32_le(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
