//! A real-time clock driver for DS1307-style devices on an AVR-style two-wire interface.
//!
//! The driver owns the two-wire interface controller and composes its clocked, acknowledge-based
//! handshake into whole-time-value reads and writes against the device's timekeeping registers.
//! Values cross the wire as packed BCD and are exposed to the application in plain binary form as
//! [`DateTime`], which also carries the sub-day arithmetic ([`add`](DateTime::add),
//! [`difference`](DateTime::difference), [`is_expired`](DateTime::is_expired)) used to schedule
//! alarms against the clock.
//!
//! Hardware access goes through the [`TwiRegisters`] trait, implemented over the controller's
//! memory-mapped registers on a device. All bus operations are synchronous and blocking, with a
//! bounded completion poll: a stuck or disconnected bus surfaces as [`Error::BusTimeout`] rather
//! than an indefinite hang, and a device that fails to acknowledge surfaces as [`Error::Nack`].

#![cfg_attr(not(test), no_std)]

mod bcd;
mod date_time;
mod error;
mod rtc;
mod twi;

pub use date_time::DateTime;
pub use error::Error;
pub use twi::{
    Config,
    Direction,
    Twi,
    TwiRegisters,
};

/// Access to the real-time clock.
///
/// Instantiating a `Clock` brings up the two-wire interface once; the controller hardware is
/// never torn down. Owning the register block makes the bus a singleton resource, so no locking
/// is needed: exactly one transaction is ever in flight.
#[derive(Debug)]
pub struct Clock<R> {
    twi: Twi<R>,
}

impl<R> Clock<R>
where
    R: TwiRegisters,
{
    /// Creates a new `Clock`, initializing the two-wire interface with the given configuration.
    pub fn new(registers: R, config: Config) -> Self {
        log::debug!(
            "bringing up two-wire interface (bit rate {}, poll limit {})",
            config.bit_rate,
            config.poll_limit
        );
        Self {
            twi: Twi::new(registers, config),
        }
    }

    /// Reads the currently stored date and time.
    ///
    /// The six fields are read one register session at a time, so a clock tick occurring between
    /// two sessions can yield a torn snapshot; callers that need consistency should re-read when
    /// the seconds roll over.
    pub fn read_time(&mut self) -> Result<DateTime, Error> {
        rtc::read_time(&mut self.twi)
    }

    /// Writes a new date and time to the device.
    ///
    /// The seconds register is always written as zero, restarting the current minute. The fields
    /// are written one register session at a time and the sequence is not atomic: a failure
    /// partway through leaves the device with a mix of old and new fields.
    pub fn write_time(&mut self, date_time: DateTime) -> Result<(), Error> {
        rtc::write_time(&mut self.twi, date_time)
    }

    /// Releases the underlying register block.
    pub fn free(self) -> R {
        self.twi.registers
    }
}
