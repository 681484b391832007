//! Register access sequences for the RTC device.
//!
//! Each operation here is one semantically complete register access: a full bus session from
//! start condition to stop condition. Whole-time-value reads and writes are composed from one
//! session per timekeeping register; they are not atomic across registers, which is an inherent
//! limitation of the wire protocol (see the notes on [`read_time`] and [`write_time`]).

use crate::{
    bcd::Bcd,
    twi::{
        Direction,
        Twi,
        TwiRegisters,
    },
    DateTime,
    Error,
};

/// The device's fixed 7-bit bus address.
pub(crate) const DEVICE_ADDRESS: u8 = 0b110_1000;

/// The timekeeping register address map.
///
/// Each time field lives at a fixed one-byte address on the device and holds one packed-BCD
/// byte. Address `0x03` (day of week) is unused by this driver.
pub(crate) struct Register;

impl Register {
    pub(crate) const SECONDS: u8 = 0x00;
    pub(crate) const MINUTES: u8 = 0x01;
    pub(crate) const HOURS: u8 = 0x02;
    pub(crate) const DAY: u8 = 0x04;
    pub(crate) const MONTH: u8 = 0x05;
    pub(crate) const YEAR: u8 = 0x06;
}

/// Writes one byte to a device register.
///
/// A single bus session covers both the register select and the data byte.
pub(crate) fn write_register<R>(twi: &mut Twi<R>, register: u8, value: u8) -> Result<(), Error>
where
    R: TwiRegisters,
{
    twi.start()?;
    twi.send_address(DEVICE_ADDRESS, Direction::Write)?;
    twi.write(register)?;
    twi.write(value)?;
    twi.stop();
    Ok(())
}

/// Reads one byte from a device register.
///
/// The register select and the read are joined by a repeated start rather than a stop/start
/// pair: releasing the bus between the two phases would let another bus party move the device's
/// register pointer, so holding ownership across the direction turnaround is a correctness
/// requirement.
pub(crate) fn read_register<R>(twi: &mut Twi<R>, register: u8) -> Result<u8, Error>
where
    R: TwiRegisters,
{
    twi.start()?;
    twi.send_address(DEVICE_ADDRESS, Direction::Write)?;
    twi.write(register)?;
    twi.start()?;
    twi.send_address(DEVICE_ADDRESS, Direction::Read)?;
    let value = twi.read()?;
    twi.stop();
    Ok(value)
}

/// Writes a whole time value to the device, one register per session.
///
/// The seconds register is always written as zero, restarting the current minute; the remaining
/// fields are taken from `date_time`. The sequence is not atomic: a bus failure or power loss
/// partway through leaves the device with a mix of old and new fields.
pub(crate) fn write_time<R>(twi: &mut Twi<R>, date_time: DateTime) -> Result<(), Error>
where
    R: TwiRegisters,
{
    write_register(twi, Register::SECONDS, Bcd::from_binary(0).into())?;
    write_register(
        twi,
        Register::MINUTES,
        Bcd::from_binary(date_time.minute).into(),
    )?;
    write_register(twi, Register::HOURS, Bcd::from_binary(date_time.hour).into())?;
    write_register(twi, Register::DAY, Bcd::from_binary(date_time.day).into())?;
    write_register(
        twi,
        Register::MONTH,
        Bcd::from_binary(date_time.month).into(),
    )?;
    write_register(twi, Register::YEAR, Bcd::from_binary(date_time.year).into())
}

/// Reads a whole time value from the device, one register per session.
///
/// The fields are read in register order, so a clock tick between two sessions can yield a torn
/// snapshot (for example, the minute rolling over just after the seconds were read as 59).
pub(crate) fn read_time<R>(twi: &mut Twi<R>) -> Result<DateTime, Error>
where
    R: TwiRegisters,
{
    let second = Bcd::try_from(read_register(twi, Register::SECONDS)?)?.to_binary();
    let minute = Bcd::try_from(read_register(twi, Register::MINUTES)?)?.to_binary();
    let hour = Bcd::try_from(read_register(twi, Register::HOURS)?)?.to_binary();
    let day = Bcd::try_from(read_register(twi, Register::DAY)?)?.to_binary();
    let month = Bcd::try_from(read_register(twi, Register::MONTH)?)?.to_binary();
    let year = Bcd::try_from(read_register(twi, Register::YEAR)?)?.to_binary();
    Ok(DateTime {
        second,
        minute,
        hour,
        day,
        month,
        year,
    })
}
