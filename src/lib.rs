//! Winsen infrared CO2 module MH-Z16 / MH-Z19 driver.
//!
//! [MH-Z19 Datasheet](https://www.winsen-sensor.com/d/files/PDF/Infrared%20Gas%20Sensor/NDIR%20CO2%20SENSOR/MH-Z19%20CO2%20Ver1.0.pdf)
//!
//! [MH-Z16 Datasheet](https://www.winsen-sensor.com/d/files/PDF/Infrared%20Gas%20Sensor/NDIR%20CO2%20SENSOR/MH-Z16%20CO2%20V2.4.pdf)
//!
//! The sensor talks 9-byte frames over a UART. [`MhzSensor`] drives the protocol over any
//! [`Channel`]: [`SerialChannel`] adapts an `embedded-hal` serial port, and with the
//! `serialport` feature `SerialPortChannel` opens an OS serial port from a `SerialConfig`.
//!
//! A handle owns its channel and serves one request at a time; every operation takes
//! `&mut self`. Wrap it in a mutex to share it between threads.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use log::{debug, error, info, warn};

mod channel;
pub use channel::*;

mod error;
pub use error::*;

pub mod frame;
pub use frame::{checksum, parse_response, Command, Measurement, Packet};

#[cfg(feature = "std")]
mod config;
#[cfg(feature = "std")]
pub use config::*;

#[cfg(feature = "serialport")]
mod port;
#[cfg(feature = "serialport")]
#[cfg_attr(docsrs, doc(cfg(feature = "serialport")))]
pub use port::SerialPortChannel;

/// Whether a handle still owns a usable channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Channel is owned, I/O is allowed
    Open,
    /// Channel was closed, every operation fails with [`Error::ChannelClosed`]
    Closed,
}

/// MH-Z16 / MH-Z19 sensor handle.
///
/// The channel is closed exactly once: by [`close`](Self::close), or on drop if the
/// handle is still open. [`free`](Self::free) hands the channel back unclosed.
pub struct MhzSensor<C: Channel> {
    channel: Option<C>,
}

impl<C: Channel> MhzSensor<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    pub fn state(&self) -> State {
        if self.channel.is_some() {
            State::Open
        } else {
            State::Closed
        }
    }

    /// Give the channel back without closing it. `None` if the handle was closed.
    pub fn free(mut self) -> Option<C> {
        self.channel.take()
    }

    fn channel(&mut self) -> Result<&mut C, Error<C::Error>> {
        self.channel.as_mut().ok_or(Error::ChannelClosed)
    }

    /// Check that a sensor answers on the channel.
    ///
    /// Protocol errors and short writes are ignored: the MH-Z19B needs two attempts
    /// in order to skip its bootloader prompt and the first frames after power-up may
    /// be corrupted. Channel errors and [`Error::ChannelClosed`] are returned.
    pub fn probe(&mut self) -> Result<bool, Error<C::Error>> {
        for _ in 0..2 {
            match self.read() {
                Ok(_) => return Ok(true),
                Err(e) if Self::retryable(&e) => {}
                Err(e) => return Err(e),
            }
        }

        // Final try
        match self.read() {
            Ok(_) => Ok(true),
            Err(e) if Self::retryable(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn retryable(e: &Error<C::Error>) -> bool {
        e.is_protocol_error() || matches!(e, Error::Timeout)
    }

    fn send_packet(&mut self, command: Command) -> Result<(), Error<C::Error>> {
        let packet = command.wire_frame();
        debug!("Writing {:?}: {:02X?}", command, packet);

        let written = self.channel()?.write(&packet).map_err(Error::Channel)?;
        if written != packet.len() {
            error!("Short write: {} of {} bytes", written, packet.len());
            return Err(Error::Timeout);
        }
        Ok(())
    }

    fn receive_packet(&mut self) -> Result<Measurement, Error<C::Error>> {
        let mut buffer = [0u8; frame::PACKET_LEN];
        let received = self.channel()?.read(&mut buffer).map_err(Error::Channel)?;
        debug!("Read {} bytes: {:02X?}", received, &buffer[..received]);

        parse_response(&buffer[..received]).map_err(|e| {
            error!("{}", e);
            e.widen()
        })
    }

    /// Read all values: CO2 concentration, temperature, status and ABC point.
    pub fn read(&mut self) -> Result<Measurement, Error<C::Error>> {
        debug!("Reading values from sensor");
        self.send_packet(Command::ReadCo2)?;
        self.receive_packet()
    }

    /// Read the CO2 gas concentration in ppm
    pub fn read_co2(&mut self) -> Result<u16, Error<C::Error>> {
        self.read().map(|m| m.co2)
    }

    /// Read the temperature in degrees Celsius
    pub fn read_temperature(&mut self) -> Result<i16, Error<C::Error>> {
        self.read().map(|m| m.temperature)
    }

    /// Read the device status byte
    pub fn read_status(&mut self) -> Result<u8, Error<C::Error>> {
        self.read().map(|m| m.status)
    }

    /// Perform zero point calibration
    ///
    /// Zero point is 400ppm, please make sure the sensor has been worked under
    /// 400ppm (fresh air) for over 20 minutes. The sensor does not answer, so a
    /// failed calibration cannot be detected here.
    pub fn zero_calibration(&mut self) -> Result<(), Error<C::Error>> {
        info!("Zero calibration");
        self.send_packet(Command::ZeroCalibration)
    }

    /// Perform span point calibration
    ///
    /// Quoting the datasheet: "Note: Pls do ZERO calibration before span calibration
    /// Please make sure the sensor worked under a certain level co2 for over 20 minutes.
    ///
    /// Suggest using 2000ppm as span, at least 1000ppm"
    pub fn span_calibration(&mut self, span: u16) -> Result<(), Error<C::Error>> {
        info!("Span calibration to {}", span);
        self.send_packet(Command::SpanCalibration(span))
    }

    /// Enable or disable Automatic Baseline Correction (ABC)
    pub fn set_auto_calibration(&mut self, enabled: bool) -> Result<(), Error<C::Error>> {
        info!("Setting auto calibration to {}", enabled);
        self.send_packet(Command::AutoCalibration(enabled))
    }

    /// Close the channel. Any later operation fails with [`Error::ChannelClosed`].
    ///
    /// The handle is closed even if the channel reports an error while closing.
    pub fn close(&mut self) -> Result<(), Error<C::Error>> {
        let mut channel = self.channel.take().ok_or(Error::ChannelClosed)?;
        info!("Closing channel");
        channel.close().map_err(Error::Channel)
    }
}

impl<C: Channel> Drop for MhzSensor<C> {
    fn drop(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if channel.close().is_err() {
                warn!("Failed to close channel on drop");
            }
        }
    }
}
