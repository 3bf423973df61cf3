//! MR60BHA2 - Driver for the Seeed MR60BHA2 mmWave vital signs sensor
//!
//! Turns the sensor's serial byte stream into heart rate, breath rate,
//! distance and phase measurements. The driver is read-only and pull-based:
//! call [`Mr60bha2::update`] (or a `wait_for_*` method) to process bytes.
//!
//! ## Layers
//!
//! - [`transport`]: Byte Source (serial port, in-memory mock)
//! - [`protocol`]: frame synchronizer, checksum and payload decoder
//! - [`store`]: latest value per channel with consume-on-read
//! - [`sensor`]: polling engine and public API
//!
//! ## Features
//!
//! - `serial` (default): serial port transport via the `serialport` crate

pub mod config;
pub mod error;
pub mod protocol;
pub mod sensor;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use config::{AppConfig, SensorConfig};
pub use error::{Error, Result};
pub use protocol::{DebugText, Distance, Measurement, Phases};
pub use sensor::{Mr60bha2, SensorStats};
pub use store::{Channel, Reading, Snapshot};
pub use transport::{MockTransport, Transport};
#[cfg(feature = "serial")]
pub use transport::SerialTransport;
