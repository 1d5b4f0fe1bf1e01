use std::string::String;
use std::time::Duration;

use crate::channel::DEFAULT_TIMEOUT;

/// Sensors ship configured for 9600 8N1
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// Settings used to open a serial port for the sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Port name, for example `/dev/ttyUSB0` (Linux), `/dev/tty.usbserial` (macOS) or `COM4` (Windows).
    pub port: String,
    /// Baudrate to use.
    pub baudrate: u32,
    /// Deadline for each read or write.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Creates a config for `port` with the default baudrate and timeout.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baudrate: DEFAULT_BAUDRATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = baudrate;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout from fractional seconds, e.g. `0.2`.
    ///
    /// Negative and non-finite values fall back to the default timeout.
    pub fn timeout_secs(self, secs: f64) -> Self {
        let timeout = Duration::try_from_secs_f64(secs).unwrap_or(DEFAULT_TIMEOUT);
        self.timeout(timeout)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!("/dev/ttyUSB0", config.port);
        assert_eq!(9600, config.baudrate);
        assert_eq!(Duration::from_millis(200), config.timeout);
    }

    #[test]
    fn builder() {
        let config = SerialConfig::new("COM4")
            .baudrate(19200)
            .timeout_secs(0.5);
        assert_eq!(19200, config.baudrate);
        assert_eq!(Duration::from_millis(500), config.timeout);

        let config = SerialConfig::new("COM4").timeout_secs(-1.0);
        assert_eq!(DEFAULT_TIMEOUT, config.timeout);
    }
}
