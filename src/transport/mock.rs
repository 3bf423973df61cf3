//! Mock transport for testing
//!
//! Clones share one byte queue, so a test can keep a handle for injecting
//! bytes while the sensor owns another.

use super::Transport;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// In-memory Byte Source
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    /// Max bytes handed out per read (0 = unlimited)
    chunk_size: usize,
    pending_error: Option<io::ErrorKind>,
    open: bool,
    reads: usize,
}

impl MockTransport {
    /// Create a new, open mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                read_buffer: VecDeque::new(),
                chunk_size: 0,
                pending_error: None,
                open: true,
                reads: 0,
            })),
        }
    }

    /// Create a mock transport with `data` already queued
    pub fn with_data(data: &[u8]) -> Self {
        let mock = Self::new();
        mock.inject_read(data);
        mock
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Limit every read to at most `size` bytes (0 = unlimited)
    pub fn set_chunk_size(&self, size: usize) {
        self.inner.lock().chunk_size = size;
    }

    /// Make the next read fail with an I/O error of `kind`
    pub fn inject_error(&self, kind: io::ErrorKind) {
        self.inner.lock().pending_error = Some(kind);
    }

    /// Number of bytes not yet read
    pub fn pending(&self) -> usize {
        self.inner.lock().read_buffer.len()
    }

    /// Number of `read_available` calls served so far
    pub fn read_calls(&self) -> usize {
        self.inner.lock().reads
    }
}

impl Transport for MockTransport {
    fn read_available(&mut self, buffer: &mut [u8], _max_wait: Duration) -> Result<usize> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(Error::NotOpen);
        }
        inner.reads += 1;
        if let Some(kind) = inner.pending_error.take() {
            return Err(io::Error::new(kind, "injected mock failure").into());
        }

        let mut available = inner.read_buffer.len().min(buffer.len());
        if inner.chunk_size > 0 {
            available = available.min(inner.chunk_size);
        }

        for (slot, byte) in buffer.iter_mut().zip(inner.read_buffer.drain(..available)) {
            *slot = byte;
        }

        Ok(available)
    }

    fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    fn close(&mut self) -> Result<()> {
        self.inner.lock().open = false;
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_drains_in_order() {
        let mut mock = MockTransport::with_data(&[1, 2, 3, 4, 5]);
        let mut buf = [0u8; 3];

        assert_eq!(mock.read_available(&mut buf, Duration::ZERO).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(mock.read_available(&mut buf, Duration::ZERO).unwrap(), 2);
        assert_eq!(&buf[..2], &[4, 5]);
        assert_eq!(mock.read_available(&mut buf, Duration::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_chunk_size_limits_reads() {
        let mut mock = MockTransport::with_data(&[9; 10]);
        mock.set_chunk_size(1);
        let mut buf = [0u8; 16];

        assert_eq!(mock.read_available(&mut buf, Duration::ZERO).unwrap(), 1);
        assert_eq!(mock.pending(), 9);
    }

    #[test]
    fn test_clones_share_state() {
        let handle = MockTransport::new();
        let mut owned = handle.clone();

        handle.inject_read(&[0xAA]);
        let mut buf = [0u8; 4];
        assert_eq!(owned.read_available(&mut buf, Duration::ZERO).unwrap(), 1);

        owned.close().unwrap();
        assert!(!handle.is_open());
        assert!(matches!(
            owned.read_available(&mut buf, Duration::ZERO),
            Err(Error::NotOpen)
        ));
    }

    #[test]
    fn test_injected_error_is_one_shot() {
        let mut mock = MockTransport::with_data(&[1]);
        mock.inject_error(io::ErrorKind::BrokenPipe);
        let mut buf = [0u8; 4];

        assert!(matches!(
            mock.read_available(&mut buf, Duration::ZERO),
            Err(Error::Io(_))
        ));
        assert_eq!(mock.read_available(&mut buf, Duration::ZERO).unwrap(), 1);
    }
}
