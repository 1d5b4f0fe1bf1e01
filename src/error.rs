use core::convert::Infallible;
use core::fmt;

use crate::frame::Packet;

/// Errors returned by the sensor handle.
///
/// `E` is the error type of the underlying [`Channel`](crate::Channel). Errors produced
/// by the pure frame functions use the default `Infallible` parameter and can be
/// [`widen`](Error::widen)ed into any transport-specific error.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error<E = Infallible> {
    /// Underlying channel error
    Channel(E),
    /// The handle was closed, no I/O was attempted
    ChannelClosed,
    /// The channel accepted fewer than 9 bytes of the command frame
    Timeout,
    /// Response was not exactly 9 bytes, e.g. the channel timeout expired mid-frame
    WrongPacketLength(usize),
    /// Start byte or command echo does not match (eg must be 0xFF 0x86 when reading gas concentration)
    InvalidResponse(Packet),
    /// Packet of bytes has the wrong checksum
    InvalidChecksum(Packet),
}

impl Error {
    /// Convert a frame-level error into an error carrying a transport error type.
    pub fn widen<E>(self) -> Error<E> {
        match self {
            Error::Channel(never) => match never {},
            Error::ChannelClosed => Error::ChannelClosed,
            Error::Timeout => Error::Timeout,
            Error::WrongPacketLength(n) => Error::WrongPacketLength(n),
            Error::InvalidResponse(packet) => Error::InvalidResponse(packet),
            Error::InvalidChecksum(packet) => Error::InvalidChecksum(packet),
        }
    }
}

impl<E> Error<E> {
    /// Returns `true` for errors raised by frame validation rather than by the transport.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::WrongPacketLength(_) | Error::InvalidResponse(_) | Error::InvalidChecksum(_)
        )
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            Channel(e) => write!(f, "Channel error: {:?}", e),
            ChannelClosed => write!(f, "Channel is closed"),
            Timeout => write!(f, "Timed out writing command frame"),
            WrongPacketLength(n) => write!(f, "Wrong packet length, expected 9, found {}", n),
            InvalidResponse(packet) => write!(f, "Invalid response: {:02X?}", packet),
            InvalidChecksum(packet) => write!(f, "Invalid checksum: {:02X?}", packet),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
