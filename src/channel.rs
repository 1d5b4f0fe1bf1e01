//! Byte transport the sensor handle talks through.

use core::time::Duration;

use embedded_hal::serial::{Read, Write};

/// Default read/write deadline, matching the sensor's response time at 9600 baud
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

/// A blocking duplex byte channel with a timeout configured at construction.
pub trait Channel {
    type Error;

    /// Write `bytes`, returning how many were accepted before the timeout.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;

    /// Fill `buffer`, returning how many bytes arrived before the timeout.
    ///
    /// A return value smaller than `buffer.len()` is not an error at this level.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;

    /// Release the underlying resource.
    fn close(&mut self) -> Result<(), Self::Error>;
}

impl<T: Channel + ?Sized> Channel for &mut T {
    type Error = T::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(bytes)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buffer)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }
}

pub trait MonotonicCounter {
    /// Returns a measurement of the monotonic counter
    fn value(&self) -> u32;

    /// Returns the frequency at which the monotonic counter is operating at
    fn frequency(&self) -> u32;
}

#[cfg(feature = "std")]
impl MonotonicCounter for std::time::Instant {
    fn value(&self) -> u32 {
        (self.elapsed().as_millis() & 0xffffffff) as u32
    }

    fn frequency(&self) -> u32 {
        1000
    }
}

/// [`Channel`] over a non-blocking `embedded-hal` serial port.
///
/// Every `write`/`read` call gets its own deadline measured with the counter.
pub struct SerialChannel<S, C> {
    serial: S,
    counter: C,
    timeout: Duration,
}

impl<E, S: Read<u8, Error = E> + Write<u8, Error = E>, C: MonotonicCounter> SerialChannel<S, C> {
    pub fn new(serial: S, counter: C) -> Self {
        Self::with_timeout(serial, counter, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(serial: S, counter: C, timeout: Duration) -> Self {
        Self {
            serial,
            counter,
            timeout,
        }
    }

    pub fn free(self) -> (S, C) {
        (self.serial, self.counter)
    }

    fn deadline_ticks(&self) -> u32 {
        let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let ticks = millis.saturating_mul(u64::from(self.counter.frequency())) / 1000;
        ticks.min(u64::from(u32::MAX)) as u32
    }

    fn expired(&self, t0: u32, dt: u32) -> bool {
        self.counter.value().wrapping_sub(t0) >= dt
    }
}

impl<E, S: Read<u8, Error = E> + Write<u8, Error = E>, C: MonotonicCounter> Channel
    for SerialChannel<S, C>
{
    type Error = E;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, E> {
        let t0 = self.counter.value();
        let dt = self.deadline_ticks();

        let mut written = 0;
        while written < bytes.len() {
            if self.expired(t0, dt) {
                break;
            }
            match self.serial.write(bytes[written]) {
                Ok(()) => written += 1,
                Err(nb::Error::Other(e)) => return Err(e),
                Err(nb::Error::WouldBlock) => {}
            }
        }

        // Drain the transmit buffer within the same deadline
        loop {
            if self.expired(t0, dt) {
                break;
            }
            match self.serial.flush() {
                Ok(()) => break,
                Err(nb::Error::Other(e)) => return Err(e),
                Err(nb::Error::WouldBlock) => {}
            }
        }
        Ok(written)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, E> {
        let t0 = self.counter.value();
        let dt = self.deadline_ticks();

        let mut received = 0;
        while received < buffer.len() {
            if self.expired(t0, dt) {
                break;
            }
            match self.serial.read() {
                Ok(byte) => {
                    buffer[received] = byte;
                    received += 1;
                }
                Err(nb::Error::Other(e)) => return Err(e),
                Err(nb::Error::WouldBlock) => {}
            }
        }
        Ok(received)
    }

    /// `embedded-hal` ports have no notion of closing; the port is released with `free`.
    fn close(&mut self) -> Result<(), E> {
        Ok(())
    }
}
