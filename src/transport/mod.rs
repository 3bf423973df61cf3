//! Transport layer for I/O abstraction
//!
//! A transport is the Byte Source the polling engine pulls from. The protocol
//! is read-only, so there is no write side.

use crate::error::Result;
use std::time::Duration;

mod mock;
#[cfg(feature = "serial")]
mod serial;

pub use mock::MockTransport;
#[cfg(feature = "serial")]
pub use serial::SerialTransport;

/// Byte Source consumed by the polling engine
pub trait Transport {
    /// Read whatever bytes are available into `buffer`, waiting at most
    /// `max_wait` for the first one.
    ///
    /// Returns `Ok(0)` when nothing arrived in time. Never reads more than
    /// `buffer.len()` bytes. A closed source returns [`Error::NotOpen`].
    ///
    /// [`Error::NotOpen`]: crate::error::Error::NotOpen
    fn read_available(&mut self, buffer: &mut [u8], max_wait: Duration) -> Result<usize>;

    /// Whether the source can still deliver bytes
    fn is_open(&self) -> bool;

    /// Release the underlying resource. Closing twice is a no-op.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_available(&mut self, buffer: &mut [u8], max_wait: Duration) -> Result<usize> {
        (**self).read_available(buffer, max_wait)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
