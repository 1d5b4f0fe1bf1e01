//! Frame layout, checksum and response decoding.
//!
//! Both directions use 9-byte frames:
//!
//! ```text
//! request:  FF 01 cmd b3 b4 b5 b6 b7 cs
//! response: FF 86 co2_hi co2_lo temp status abc_point -- cs
//! ```

use core::fmt;

use crate::error::Error;

/// Both input and output packets are 9 bytes long
pub type Packet = [u8; 9];

/// A request frame before the checksum is appended
pub type CommandFrame = [u8; 8];

pub const PACKET_LEN: usize = 9;

/// Start marker of every frame
pub const START_BYTE: u8 = 0xFF;

/// Sensor address, always 1 on a point-to-point UART
pub const SENSOR_ADDRESS: u8 = 0x01;

/// Raw temperature byte is degrees Celsius plus this offset
pub const TEMPERATURE_OFFSET: i16 = 40;

pub const READ_CO2: CommandFrame = [START_BYTE, SENSOR_ADDRESS, 0x86, 0x00, 0x00, 0x00, 0x00, 0x00];
pub const ZERO_CALIBRATION: CommandFrame = [START_BYTE, SENSOR_ADDRESS, 0x87, 0x00, 0x00, 0x00, 0x00, 0x00];
pub const SPAN_CALIBRATION: CommandFrame = [START_BYTE, SENSOR_ADDRESS, 0x88, 0x00, 0x00, 0x00, 0x00, 0x00];
pub const AUTO_CALIBRATION_ON: CommandFrame = [START_BYTE, SENSOR_ADDRESS, 0x79, 0xA0, 0x00, 0x00, 0x00, 0x00];
pub const AUTO_CALIBRATION_OFF: CommandFrame = [START_BYTE, SENSOR_ADDRESS, 0x79, 0x00, 0x00, 0x00, 0x00, 0x00];

/// Commands understood by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Read CO2 concentration, temperature and status
    ReadCo2,
    /// Execute a zero point calibration
    ZeroCalibration,
    /// Execute a span point calibration against the given concentration in ppm
    SpanCalibration(u16),
    /// Enable or disable Automatic Baseline Correction (ABC)
    AutoCalibration(bool),
}

impl Command {
    fn template(&self) -> CommandFrame {
        match self {
            Command::ReadCo2 => READ_CO2,
            Command::ZeroCalibration => ZERO_CALIBRATION,
            Command::SpanCalibration(_) => SPAN_CALIBRATION,
            Command::AutoCalibration(true) => AUTO_CALIBRATION_ON,
            Command::AutoCalibration(false) => AUTO_CALIBRATION_OFF,
        }
    }

    /// Command code placed at offset 2
    pub fn code(&self) -> u8 {
        self.template()[2]
    }

    /// The 8-byte frame with arguments filled in
    pub fn frame(&self) -> CommandFrame {
        let mut frame = self.template();
        if let Command::SpanCalibration(span) = self {
            frame[3..5].copy_from_slice(&span.to_be_bytes());
        }
        frame
    }

    /// The 9-byte frame as written to the channel
    pub fn wire_frame(&self) -> Packet {
        let frame = self.frame();
        let mut packet = [0u8; PACKET_LEN];
        packet[..8].copy_from_slice(&frame);
        packet[8] = checksum(&frame[1..]);
        packet
    }
}

/// Frame checksum: `(0xFF - (sum mod 256) + 1) mod 256`.
///
/// Callers pass the frame without its start byte, i.e. bytes 1..8.
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |sum, c| sum.wrapping_add(*c));
    0xFFu8.wrapping_sub(sum).wrapping_add(1)
}

pub fn build_read_frame() -> Packet {
    Command::ReadCo2.wire_frame()
}

pub fn build_zero_calibration_frame() -> Packet {
    Command::ZeroCalibration.wire_frame()
}

pub fn build_span_frame(span: u16) -> Packet {
    Command::SpanCalibration(span).wire_frame()
}

pub fn build_auto_calibration_frame(enabled: bool) -> Packet {
    Command::AutoCalibration(enabled).wire_frame()
}

/// A decoded answer to [`Command::ReadCo2`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// CO2 concentration in ppm
    pub co2: u16,
    /// Temperature in degrees Celsius
    pub temperature: i16,
    /// Device status byte, passed through unmodified
    pub status: u8,
    /// Automatic baseline correction reference byte, passed through unmodified
    pub auto_calibration_point: u8,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ppm, {} °C", self.co2, self.temperature)
    }
}

/// Validate a response to [`Command::ReadCo2`] and decode it.
///
/// Header bytes are checked before the checksum, so a frame that is misaligned
/// reports `InvalidResponse` rather than `InvalidChecksum`. `bytes` must hold exactly
/// one frame.
pub fn parse_response(bytes: &[u8]) -> Result<Measurement, Error> {
    let packet: Packet = bytes
        .try_into()
        .map_err(|_| Error::WrongPacketLength(bytes.len()))?;

    if packet[0] != START_BYTE || packet[1] != Command::ReadCo2.code() {
        return Err(Error::InvalidResponse(packet));
    }
    if checksum(&packet[1..8]) != packet[8] {
        return Err(Error::InvalidChecksum(packet));
    }

    Ok(Measurement {
        co2: u16::from_be_bytes([packet[2], packet[3]]),
        temperature: i16::from(packet[4]) - TEMPERATURE_OFFSET,
        status: packet[5],
        auto_calibration_point: packet[6],
    })
}
