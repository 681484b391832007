//! Errors that may occur when interacting with the RTC.

#[cfg(feature = "serde")]
use core::str;
use core::{
    fmt,
    fmt::{
        Display,
        Formatter,
    },
};
#[cfg(feature = "serde")]
use serde::{
    de,
    de::{
        EnumAccess,
        Unexpected,
        VariantAccess,
        Visitor,
    },
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};

/// Errors that may occur when interacting with the RTC.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// The bus controller never reported completion of an operation.
    ///
    /// Returned when the completion flag is still clear after the configured number of polls,
    /// rather than busy-waiting forever on a stuck or disconnected bus.
    BusTimeout,
    /// The device answered a transferred byte with a negative acknowledge.
    Nack,
    InvalidBinaryCodedDecimal(u8),
    InvalidMonth(u8),
    InvalidDay(u8),
    InvalidHour(u8),
    InvalidMinute(u8),
    InvalidSecond(u8),
}

impl Display for Error {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            Self::BusTimeout => formatter.write_str("timed out waiting for the bus controller"),
            Self::Nack => formatter.write_str("the device did not acknowledge a transfer"),
            Self::InvalidBinaryCodedDecimal(value) => {
                write!(
                    formatter,
                    "RTC returned a value that was not a binary coded decimal: {}",
                    value
                )
            }
            Self::InvalidMonth(value) => {
                write!(formatter, "RTC returned an invalid month: {}", value)
            }
            Self::InvalidDay(value) => write!(formatter, "RTC returned an invalid day: {}", value),
            Self::InvalidHour(value) => {
                write!(formatter, "RTC returned an invalid hour: {}", value)
            }
            Self::InvalidMinute(value) => {
                write!(formatter, "RTC returned an invalid minute: {}", value)
            }
            Self::InvalidSecond(value) => {
                write!(formatter, "RTC returned an invalid second: {}", value)
            }
        }
    }
}

#[cfg(feature = "serde")]
impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::BusTimeout => serializer.serialize_unit_variant("Error", 0, "BusTimeout"),
            Self::Nack => serializer.serialize_unit_variant("Error", 1, "Nack"),
            Self::InvalidBinaryCodedDecimal(value) => {
                serializer.serialize_newtype_variant("Error", 2, "InvalidBinaryCodedDecimal", value)
            }
            Self::InvalidMonth(value) => {
                serializer.serialize_newtype_variant("Error", 3, "InvalidMonth", value)
            }
            Self::InvalidDay(value) => {
                serializer.serialize_newtype_variant("Error", 4, "InvalidDay", value)
            }
            Self::InvalidHour(value) => {
                serializer.serialize_newtype_variant("Error", 5, "InvalidHour", value)
            }
            Self::InvalidMinute(value) => {
                serializer.serialize_newtype_variant("Error", 6, "InvalidMinute", value)
            }
            Self::InvalidSecond(value) => {
                serializer.serialize_newtype_variant("Error", 7, "InvalidSecond", value)
            }
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Error {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        enum Variant {
            BusTimeout,
            Nack,
            InvalidBinaryCodedDecimal,
            InvalidMonth,
            InvalidDay,
            InvalidHour,
            InvalidMinute,
            InvalidSecond,
        }

        impl<'de> Deserialize<'de> for Variant {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct VariantVisitor;

                impl<'de> Visitor<'de> for VariantVisitor {
                    type Value = Variant;

                    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                        formatter.write_str("`BusTimeout`, `Nack`, `InvalidBinaryCodedDecimal`, `InvalidMonth`, `InvalidDay`, `InvalidHour`, `InvalidMinute`, or `InvalidSecond`")
                    }

                    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        match value {
                            0 => Ok(Variant::BusTimeout),
                            1 => Ok(Variant::Nack),
                            2 => Ok(Variant::InvalidBinaryCodedDecimal),
                            3 => Ok(Variant::InvalidMonth),
                            4 => Ok(Variant::InvalidDay),
                            5 => Ok(Variant::InvalidHour),
                            6 => Ok(Variant::InvalidMinute),
                            7 => Ok(Variant::InvalidSecond),
                            _ => Err(de::Error::invalid_value(Unexpected::Unsigned(value), &self)),
                        }
                    }

                    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        match value {
                            "BusTimeout" => Ok(Variant::BusTimeout),
                            "Nack" => Ok(Variant::Nack),
                            "InvalidBinaryCodedDecimal" => Ok(Variant::InvalidBinaryCodedDecimal),
                            "InvalidMonth" => Ok(Variant::InvalidMonth),
                            "InvalidDay" => Ok(Variant::InvalidDay),
                            "InvalidHour" => Ok(Variant::InvalidHour),
                            "InvalidMinute" => Ok(Variant::InvalidMinute),
                            "InvalidSecond" => Ok(Variant::InvalidSecond),
                            _ => Err(de::Error::unknown_variant(value, VARIANTS)),
                        }
                    }

                    fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        match value {
                            b"BusTimeout" => Ok(Variant::BusTimeout),
                            b"Nack" => Ok(Variant::Nack),
                            b"InvalidBinaryCodedDecimal" => Ok(Variant::InvalidBinaryCodedDecimal),
                            b"InvalidMonth" => Ok(Variant::InvalidMonth),
                            b"InvalidDay" => Ok(Variant::InvalidDay),
                            b"InvalidHour" => Ok(Variant::InvalidHour),
                            b"InvalidMinute" => Ok(Variant::InvalidMinute),
                            b"InvalidSecond" => Ok(Variant::InvalidSecond),
                            _ => {
                                let utf8_value =
                                    str::from_utf8(value).unwrap_or("\u{fffd}\u{fffd}\u{fffd}");
                                Err(de::Error::unknown_variant(utf8_value, VARIANTS))
                            }
                        }
                    }
                }

                deserializer.deserialize_identifier(VariantVisitor)
            }
        }

        struct ErrorVisitor;

        impl<'de> Visitor<'de> for ErrorVisitor {
            type Value = Error;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("enum Error")
            }

            fn visit_enum<A>(self, data: A) -> Result<Self::Value, A::Error>
            where
                A: EnumAccess<'de>,
            {
                let (variant, access) = data.variant()?;

                Ok(match variant {
                    Variant::BusTimeout => {
                        access.unit_variant()?;
                        Error::BusTimeout
                    }
                    Variant::Nack => {
                        access.unit_variant()?;
                        Error::Nack
                    }
                    Variant::InvalidBinaryCodedDecimal => {
                        Error::InvalidBinaryCodedDecimal(access.newtype_variant()?)
                    }
                    Variant::InvalidMonth => Error::InvalidMonth(access.newtype_variant()?),
                    Variant::InvalidDay => Error::InvalidDay(access.newtype_variant()?),
                    Variant::InvalidHour => Error::InvalidHour(access.newtype_variant()?),
                    Variant::InvalidMinute => Error::InvalidMinute(access.newtype_variant()?),
                    Variant::InvalidSecond => Error::InvalidSecond(access.newtype_variant()?),
                })
            }
        }

        const VARIANTS: &[&str] = &[
            "BusTimeout",
            "Nack",
            "InvalidBinaryCodedDecimal",
            "InvalidMonth",
            "InvalidDay",
            "InvalidHour",
            "InvalidMinute",
            "InvalidSecond",
        ];
        deserializer.deserialize_enum("Error", VARIANTS, ErrorVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_bus_timeout() {
        assert_eq!(
            Error::BusTimeout.to_string(),
            "timed out waiting for the bus controller"
        );
    }

    #[test]
    fn display_nack() {
        assert_eq!(
            Error::Nack.to_string(),
            "the device did not acknowledge a transfer"
        );
    }

    #[test]
    fn display_invalid_bcd_includes_value() {
        assert_eq!(
            Error::InvalidBinaryCodedDecimal(0xff).to_string(),
            "RTC returned a value that was not a binary coded decimal: 255"
        );
    }

    #[test]
    fn display_invalid_month_includes_value() {
        assert_eq!(
            Error::InvalidMonth(13).to_string(),
            "RTC returned an invalid month: 13"
        );
    }
}
