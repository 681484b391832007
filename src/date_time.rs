//! The date and time value stored within the RTC, and the arithmetic used to schedule against it.

#[cfg(feature = "serde")]
use core::fmt;
#[cfg(feature = "serde")]
use core::fmt::Formatter;
#[cfg(feature = "serde")]
use serde::{
    de,
    de::{
        MapAccess,
        SeqAccess,
        Visitor,
    },
    ser::SerializeStruct,
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use time::{
    Date,
    Month,
    PrimitiveDateTime,
    Time,
};

use crate::Error;

/// A calendar/clock instant, in the device's own representation.
///
/// Each field is stored in plain binary form; conversion to and from the packed BCD bytes on the
/// wire happens at the register-protocol boundary. The year is the last two digits of a year in
/// the range 2000-2099.
///
/// No validity invariant is enforced on construction: the fields are plain public integers, and
/// callers are expected to supply well-formed values. Arithmetic results always stay within field
/// bounds via carry/borrow normalization.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DateTime {
    /// Seconds, `0-59`.
    pub second: u8,
    /// Minutes, `0-59`.
    pub minute: u8,
    /// Hours, `0-23`.
    pub hour: u8,
    /// Day of month, `1-31`.
    pub day: u8,
    /// Month, `1-12`.
    pub month: u8,
    /// Last two digits of the year, `0-99`.
    pub year: u8,
}

impl DateTime {
    /// Adds a sub-day offset to this instant, wrapping within the day.
    ///
    /// Seconds, minutes, and hours are added field-wise, with carries propagated from seconds
    /// into minutes and from minutes into hours, and the hour wrapped into `0-23`. The day,
    /// month, and year are taken
    /// from `self` unchanged; day rollover is not supported. This is intended for computing a
    /// future alarm point from the current time and a countdown duration.
    pub fn add(self, other: DateTime) -> DateTime {
        let mut second = self.second + other.second;
        let mut minute = self.minute + other.minute;
        let mut hour = self.hour + other.hour;
        if second >= 60 {
            minute += 1;
            second -= 60;
        }
        if minute >= 60 {
            hour += 1;
            minute -= 60;
        }
        hour %= 24;
        DateTime {
            second,
            minute,
            hour,
            ..self
        }
    }

    /// Computes the time remaining from `earlier` until this instant.
    ///
    /// One second and one minute are pre-subtracted as borrow margin before the seconds and
    /// minutes are normalized into `0-59` with borrows propagated into the next field, and the
    /// hour is normalized into `0-23`. The date fields are taken from `self` unchanged.
    ///
    /// This is only meaningful when `self` is chronologically at or after `earlier` within the
    /// same day. When that precondition is violated the result is still normalized into field
    /// ranges, but carries no chronological meaning.
    pub fn difference(self, earlier: DateTime) -> DateTime {
        let mut second = i16::from(self.second) + 60 - i16::from(earlier.second) - 1;
        let mut minute = i16::from(self.minute) + 60 - i16::from(earlier.minute) - 1;
        let mut hour = i16::from(self.hour) - i16::from(earlier.hour) - 1;
        if second >= 60 {
            minute += 1;
            second -= 60;
        }
        if minute >= 60 {
            hour += 1;
            minute -= 60;
        }
        if hour < 0 {
            hour += 24;
        }
        DateTime {
            second: second as u8,
            minute: minute as u8,
            hour: hour as u8,
            ..self
        }
    }

    /// Returns whether the seconds, minutes, and hours are all exactly zero.
    ///
    /// Used to detect that a countdown computed with [`difference`](Self::difference) has reached
    /// its target.
    pub fn is_expired(self) -> bool {
        self.second == 0 && self.minute == 0 && self.hour == 0
    }

    /// Converts this instant into a [`PrimitiveDateTime`], validating every field.
    ///
    /// The two-digit year is interpreted as an offset from the year 2000.
    pub fn to_calendar(self) -> Result<PrimitiveDateTime, Error> {
        let month = Month::try_from(self.month).map_err(|_| Error::InvalidMonth(self.month))?;
        let date = Date::from_calendar_date(2000 + i32::from(self.year), month, self.day)
            .map_err(|_| Error::InvalidDay(self.day))?;
        let time =
            Time::from_hms(self.hour, self.minute, self.second).map_err(|error| {
                match error.name() {
                    "hour" => Error::InvalidHour(self.hour),
                    "minute" => Error::InvalidMinute(self.minute),
                    _ => Error::InvalidSecond(self.second),
                }
            })?;
        Ok(PrimitiveDateTime::new(date, time))
    }
}

#[cfg(feature = "serde")]
impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("DateTime", 6)?;
        state.serialize_field("second", &self.second)?;
        state.serialize_field("minute", &self.minute)?;
        state.serialize_field("hour", &self.hour)?;
        state.serialize_field("day", &self.day)?;
        state.serialize_field("month", &self.month)?;
        state.serialize_field("year", &self.year)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        enum Field {
            Second,
            Minute,
            Hour,
            Day,
            Month,
            Year,
        }

        impl<'de> Deserialize<'de> for Field {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct FieldVisitor;

                impl<'de> Visitor<'de> for FieldVisitor {
                    type Value = Field;

                    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                        formatter.write_str(
                            "`second`, `minute`, `hour`, `day`, `month`, or `year`",
                        )
                    }

                    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        match value {
                            0 => Ok(Field::Second),
                            1 => Ok(Field::Minute),
                            2 => Ok(Field::Hour),
                            3 => Ok(Field::Day),
                            4 => Ok(Field::Month),
                            5 => Ok(Field::Year),
                            _ => Err(de::Error::invalid_value(
                                de::Unexpected::Unsigned(value),
                                &self,
                            )),
                        }
                    }

                    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        match value {
                            "second" => Ok(Field::Second),
                            "minute" => Ok(Field::Minute),
                            "hour" => Ok(Field::Hour),
                            "day" => Ok(Field::Day),
                            "month" => Ok(Field::Month),
                            "year" => Ok(Field::Year),
                            _ => Err(de::Error::unknown_field(value, FIELDS)),
                        }
                    }
                }

                deserializer.deserialize_identifier(FieldVisitor)
            }
        }

        struct DateTimeVisitor;

        impl<'de> Visitor<'de> for DateTimeVisitor {
            type Value = DateTime;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("struct DateTime")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let second = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let minute = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let hour = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(2, &self))?;
                let day = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(3, &self))?;
                let month = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(4, &self))?;
                let year = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(5, &self))?;
                Ok(DateTime {
                    second,
                    minute,
                    hour,
                    day,
                    month,
                    year,
                })
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut second = None;
                let mut minute = None;
                let mut hour = None;
                let mut day = None;
                let mut month = None;
                let mut year = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Second => {
                            if second.is_some() {
                                return Err(de::Error::duplicate_field("second"));
                            }
                            second = Some(map.next_value()?);
                        }
                        Field::Minute => {
                            if minute.is_some() {
                                return Err(de::Error::duplicate_field("minute"));
                            }
                            minute = Some(map.next_value()?);
                        }
                        Field::Hour => {
                            if hour.is_some() {
                                return Err(de::Error::duplicate_field("hour"));
                            }
                            hour = Some(map.next_value()?);
                        }
                        Field::Day => {
                            if day.is_some() {
                                return Err(de::Error::duplicate_field("day"));
                            }
                            day = Some(map.next_value()?);
                        }
                        Field::Month => {
                            if month.is_some() {
                                return Err(de::Error::duplicate_field("month"));
                            }
                            month = Some(map.next_value()?);
                        }
                        Field::Year => {
                            if year.is_some() {
                                return Err(de::Error::duplicate_field("year"));
                            }
                            year = Some(map.next_value()?);
                        }
                    }
                }
                Ok(DateTime {
                    second: second.ok_or_else(|| de::Error::missing_field("second"))?,
                    minute: minute.ok_or_else(|| de::Error::missing_field("minute"))?,
                    hour: hour.ok_or_else(|| de::Error::missing_field("hour"))?,
                    day: day.ok_or_else(|| de::Error::missing_field("day"))?,
                    month: month.ok_or_else(|| de::Error::missing_field("month"))?,
                    year: year.ok_or_else(|| de::Error::missing_field("year"))?,
                })
            }
        }

        const FIELDS: &[&str] = &["second", "minute", "hour", "day", "month", "year"];
        deserializer.deserialize_struct("DateTime", FIELDS, DateTimeVisitor)
    }
}
