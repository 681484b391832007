//! Binary coded decimal.
//!
//! This module contains a wrapper for a byte that is a BCD, along with conversions between BCD
//! and plain binary form.

use crate::Error;

/// Binary coded decimal.
///
/// The DS1307 stores every timekeeping register as BCD, meaning each half-byte represents a
/// digit. For example, the value `12` is not represented as `0x0c`, but is instead represented as
/// `0x12`.
///
/// The contained value must be a valid BCD value, meaning neither half-byte can be greater than
/// `0x9`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Bcd(u8);

impl Bcd {
    /// Encodes a binary value as BCD.
    ///
    /// Only values less than `100` are representable in a single BCD byte; larger values are
    /// reduced modulo `100` before encoding.
    pub(crate) fn from_binary(value: u8) -> Self {
        let value = value % 100;
        Self((value / 10) << 4 | (value % 10))
    }

    /// Converts the binary coded decimal to its equivalent binary form.
    ///
    /// This is guaranteed to result in a value less than `100`.
    pub(crate) fn to_binary(self) -> u8 {
        10 * (self.0 >> 4 & 0x0f) + (self.0 & 0x0f)
    }
}

/// Directly wraps a byte as a BCD, or returns an error if the byte is not a valid BCD.
impl TryFrom<u8> for Bcd {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 0xa0 && (value & 0x0f) < 0x0a {
            Ok(Self(value))
        } else {
            Err(Error::InvalidBinaryCodedDecimal(value))
        }
    }
}

/// Extracts the raw BCD byte, as stored on the device.
impl From<Bcd> for u8 {
    fn from(bcd: Bcd) -> Self {
        bcd.0
    }
}
