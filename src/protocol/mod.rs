//! MR60BHA2 frame protocol
//!
//! Packet format: [SOF] [ID] [LEN] [TYPE] [HEAD_CKSUM] [DATA...] [DATA_CKSUM]
//!
//! - `synchronizer`: stream to validated `RawFrame`s, resyncing on corruption
//! - `decoder`: `RawFrame` to typed `Measurement`
//! - `frame`: checksum, `RawFrame`, `FrameBuilder`

pub mod constants;
pub mod decoder;
pub mod frame;
pub mod synchronizer;

pub use decoder::{decode, decode_frame, DebugText, Distance, FrameType, Measurement, Phases};
pub use frame::{checksum, encode_frame, FrameBuilder, RawFrame};
pub use synchronizer::{FrameSynchronizer, SyncState, SyncStats};
