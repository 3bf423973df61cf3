//! Serial transport implementation

use super::Transport;
use crate::error::{Error, Result};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Read;
use std::time::Duration;

/// Read timeout used when the port is opened; replaced per read
const INITIAL_TIMEOUT: Duration = Duration::from_millis(100);

/// Upper bound on a single blocking read
const MAX_READ_WAIT: Duration = Duration::from_secs(1);

/// Serial transport for the sensor UART (8N1, no flow control)
pub struct SerialTransport {
    path: String,
    port: Option<Box<dyn SerialPort>>,
    timeout: Duration,
}

impl SerialTransport {
    /// Open a serial port and drop anything already sitting in its input buffer
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/serial0")
    /// * `baud_rate` - Baud rate (e.g., 115200)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(INITIAL_TIMEOUT)
            .open()?;

        port.clear(ClearBuffer::All)?;

        log::info!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(SerialTransport {
            path: path.to_string(),
            port: Some(port),
            timeout: INITIAL_TIMEOUT,
        })
    }
}

impl Transport for SerialTransport {
    fn read_available(&mut self, buffer: &mut [u8], max_wait: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotOpen)?;

        // serialport treats a zero timeout as "block forever" on some platforms
        let max_wait = max_wait.clamp(Duration::from_millis(1), MAX_READ_WAIT);
        if max_wait != self.timeout {
            port.set_timeout(max_wait)?;
            self.timeout = max_wait;
        }

        match port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            log::info!("Serial port {} closed", self.path);
        }
        Ok(())
    }
}
