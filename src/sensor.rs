//! MR60BHA2 sensor API and polling engine
//!
//! Everything is pull-based: bytes are read, framed, decoded and stored only
//! while the caller is inside [`Mr60bha2::update`] or one of the
//! `wait_for_*` calls. No background thread is involved.

use crate::config::SensorConfig;
use crate::error::{Error, Result};
use crate::protocol::decoder::{decode_frame, DebugText, Distance, Phases};
use crate::protocol::synchronizer::{FrameSynchronizer, SyncStats};
use crate::store::{Channel, MeasurementStore, Snapshot};
use crate::transport::Transport;
#[cfg(feature = "serial")]
use crate::transport::SerialTransport;
use std::thread;
use std::time::{Duration, Instant};

/// Bytes requested from the transport per read
const READ_CHUNK_SIZE: usize = 256;

/// Driver counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorStats {
    pub sync: SyncStats,
    /// Checksum-valid frames that decoded to `Unknown`
    pub unknown_frames: u64,
}

/// End of a time budget; `None` when the budget is too large to represent
#[derive(Debug, Clone, Copy)]
struct Deadline(Option<Instant>);

impl Deadline {
    fn after(timeout: Duration) -> Self {
        Deadline(Instant::now().checked_add(timeout))
    }

    fn remaining(&self) -> Duration {
        match self.0 {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }

    fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// MR60BHA2 mmWave heart rate and breath monitoring sensor
///
/// # Examples
///
/// ```no_run
/// use mr60bha2_io::{Mr60bha2, SensorConfig};
/// use std::time::Duration;
///
/// # fn main() -> mr60bha2_io::Result<()> {
/// let mut sensor = Mr60bha2::open(&SensorConfig::default())?;
///
/// loop {
///     if sensor.update(Duration::from_millis(100))? {
///         if let Some(bpm) = sensor.get_heart_rate() {
///             println!("Heart rate: {:.1} BPM", bpm);
///         }
///         if let Some(bpm) = sensor.get_breath_rate() {
///             println!("Breath rate: {:.1} BPM", bpm);
///         }
///     }
/// }
/// # }
/// ```
///
/// Zero BPM or a large detected range usually means no subject is in view;
/// the driver passes such values through unchanged.
pub struct Mr60bha2<T: Transport> {
    transport: T,
    synchronizer: FrameSynchronizer,
    store: MeasurementStore,
    config: SensorConfig,
}

#[cfg(feature = "serial")]
impl Mr60bha2<SerialTransport> {
    /// Open the configured serial port
    ///
    /// The port is closed when the sensor is dropped or [`close`](Self::close)d.
    pub fn open(config: &SensorConfig) -> Result<Self> {
        config.validate()?;
        log::info!("MR60BHA2: Connecting on {}", config.port);
        let transport = SerialTransport::open(&config.port, config.baud_rate)?;
        Ok(Self::with_transport(transport, config.clone()))
    }
}

impl<T: Transport> Mr60bha2<T> {
    /// Wrap an already-open transport with default settings
    pub fn new(transport: T) -> Self {
        Self::with_transport(transport, SensorConfig::default())
    }

    /// Wrap an already-open transport
    pub fn with_transport(transport: T, config: SensorConfig) -> Self {
        Self {
            transport,
            synchronizer: FrameSynchronizer::with_max_payload(config.max_payload_len),
            store: MeasurementStore::new(),
            config,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Release the transport; later `update` calls fail with [`Error::NotOpen`]
    pub fn close(&mut self) -> Result<()> {
        if self.transport.is_open() {
            self.transport.close()?;
            self.synchronizer.reset();
        }
        Ok(())
    }

    #[inline]
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ========================================================================
    // Polling engine
    // ========================================================================

    /// Drain the transport for at most `timeout`, decoding every complete frame
    ///
    /// Stops early once the transport has nothing more to give. Returns true
    /// if at least one frame passed validation during this call. Line noise
    /// never makes this fail; only transport errors do.
    pub fn update(&mut self, timeout: Duration) -> Result<bool> {
        if !self.transport.is_open() {
            return Err(Error::NotOpen);
        }

        let deadline = Deadline::after(timeout);
        let mut buffer = [0u8; READ_CHUNK_SIZE];
        let mut frames = 0;

        loop {
            let n = self.transport.read_available(&mut buffer, deadline.remaining())?;
            if n == 0 {
                break;
            }
            frames += self.ingest(&buffer[..n]);
            if deadline.expired() {
                break;
            }
        }

        Ok(frames > 0)
    }

    /// [`update`](Self::update) with the configured timeout
    pub fn poll(&mut self) -> Result<bool> {
        self.update(self.config.update_timeout())
    }

    /// Feed raw bytes through synchronizer, decoder and store
    fn ingest(&mut self, bytes: &[u8]) -> usize {
        let Self {
            synchronizer,
            store,
            ..
        } = self;

        synchronizer.feed(bytes, |frame| {
            log::debug!(
                "Recv <<< ID=0x{:04X} TYPE=0x{:04X} DATA={:02X?}",
                frame.id,
                frame.type_code,
                frame.payload()
            );
            if let Some(channel) = store.apply(decode_frame(frame)) {
                log::trace!("Channel {} updated", channel.name());
            }
        })
    }

    /// Poll until `channel` turns fresh or `timeout` runs out
    fn wait_for(&mut self, channel: Channel, timeout: Duration) -> Result<bool> {
        let deadline = Deadline::after(timeout);

        loop {
            if self.store.is_fresh(channel) {
                return Ok(true);
            }
            if deadline.expired() {
                log::debug!("Timed out waiting for {}", channel.name());
                return Ok(false);
            }

            self.update(deadline.remaining().min(self.config.update_timeout()))?;

            if !self.store.is_fresh(channel) {
                thread::sleep(self.config.poll_interval().min(deadline.remaining()));
            }
        }
    }

    // ========================================================================
    // Consuming reads
    // ========================================================================

    /// Latest heart rate in BPM, once per received frame
    pub fn get_heart_rate(&mut self) -> Option<f32> {
        self.store.take_heart_rate()
    }

    /// Latest breath rate in BPM, once per received frame
    pub fn get_breath_rate(&mut self) -> Option<f32> {
        self.store.take_breath_rate()
    }

    /// Latest distance reading, including `detected == false` readings
    pub fn get_distance(&mut self) -> Option<Distance> {
        self.store.take_distance()
    }

    /// Latest heart/breath phases
    pub fn get_phases(&mut self) -> Option<Phases> {
        self.store.take_phases()
    }

    /// Latest diagnostic text frame
    pub fn get_debug_text(&mut self) -> Option<DebugText> {
        self.store.take_debug_text()
    }

    // ========================================================================
    // Blocking reads
    // ========================================================================

    pub fn wait_for_heart_rate(&mut self, timeout: Duration) -> Result<Option<f32>> {
        Ok(if self.wait_for(Channel::HeartRate, timeout)? {
            self.store.take_heart_rate()
        } else {
            None
        })
    }

    pub fn wait_for_breath_rate(&mut self, timeout: Duration) -> Result<Option<f32>> {
        Ok(if self.wait_for(Channel::BreathRate, timeout)? {
            self.store.take_breath_rate()
        } else {
            None
        })
    }

    pub fn wait_for_distance(&mut self, timeout: Duration) -> Result<Option<Distance>> {
        Ok(if self.wait_for(Channel::Distance, timeout)? {
            self.store.take_distance()
        } else {
            None
        })
    }

    pub fn wait_for_phases(&mut self, timeout: Duration) -> Result<Option<Phases>> {
        Ok(if self.wait_for(Channel::Phases, timeout)? {
            self.store.take_phases()
        } else {
            None
        })
    }

    /// Next heart rate within the configured `wait_timeout_ms`
    pub fn next_heart_rate(&mut self) -> Result<Option<f32>> {
        self.wait_for_heart_rate(self.config.wait_timeout())
    }

    /// Next breath rate within the configured `wait_timeout_ms`
    pub fn next_breath_rate(&mut self) -> Result<Option<f32>> {
        self.wait_for_breath_rate(self.config.wait_timeout())
    }

    pub fn next_distance(&mut self) -> Result<Option<Distance>> {
        self.wait_for_distance(self.config.wait_timeout())
    }

    pub fn next_phases(&mut self) -> Result<Option<Phases>> {
        self.wait_for_phases(self.config.wait_timeout())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Every channel's value and freshness, without consuming anything
    pub fn get_all(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn stats(&self) -> SensorStats {
        SensorStats {
            sync: self.synchronizer.stats(),
            unknown_frames: self.store.unknown_frames(),
        }
    }

    #[inline]
    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }
}

impl<T: Transport> Drop for Mr60bha2<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("MR60BHA2: failed to close transport: {}", e);
        }
    }
}
