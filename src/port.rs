//! [`Channel`] backed by an OS serial port.

use std::boxed::Box;
use std::io::{self, Read, Write};

use log::debug;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::channel::Channel;
use crate::config::SerialConfig;

pub struct SerialPortChannel {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortChannel {
    /// Open and configure the port named in `config` (8N1, no flow control).
    pub fn open(config: &SerialConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(config.port.as_str(), config.baudrate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout)
            .open()?;
        debug!(
            "Opened {} at {} baud, timeout {:?}",
            config.port, config.baudrate, config.timeout
        );
        Ok(Self::from_port(port))
    }

    /// Wrap a port that was opened elsewhere. Its configured timeout bounds every read.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port: Some(port) }
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port closed"))
    }
}

impl Channel for SerialPortChannel {
    type Error = io::Error;

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let port = self.port()?;
        let mut written = 0;
        while written < bytes.len() {
            match port.write(&bytes[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        port.flush()?;
        Ok(written)
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let port = self.port()?;
        let mut received = 0;
        while received < buffer.len() {
            match port.read(&mut buffer[received..]) {
                Ok(0) => break,
                Ok(n) => received += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(received)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.port.take() {
            Some(port) => {
                debug!("Closing {}", port.name().unwrap_or_default());
                Ok(())
            }
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "serial port closed")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn open_missing_port_fails() {
        let config = SerialConfig::new("/dev/this-port-does-not-exist");
        assert!(SerialPortChannel::open(&config).is_err());
    }

    #[test]
    fn closed_channel_refuses_io() {
        let mut channel = SerialPortChannel { port: None };
        let err = channel.read(&mut [0u8; 9]).unwrap_err();
        assert_eq!(io::ErrorKind::NotConnected, err.kind());
        let err = channel.write(&[0xFF]).unwrap_err();
        assert_eq!(io::ErrorKind::NotConnected, err.kind());
        assert!(channel.close().is_err());
    }
}
