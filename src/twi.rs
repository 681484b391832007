//! The two-wire interface transaction layer.
//!
//! This module drives the clocked, addressed, acknowledge-based handshake of a TWI (I2C)
//! controller in master mode: start condition, addressing, byte transfers, stop condition. Every
//! blocking operation polls the controller's completion flag a bounded number of times, failing
//! with [`Error::BusTimeout`] instead of hanging on a stuck or disconnected bus.
//!
//! Access to the controller hardware goes through the [`TwiRegisters`] trait, so the same state
//! machine runs against memory-mapped registers on a device and against a simulated controller in
//! tests.

use crate::Error;

/// Control register bits.
mod control {
    /// Completion flag. Set by the controller when an operation finishes; cleared by writing it
    /// back as part of issuing the next operation.
    pub(super) const INTERRUPT: u8 = 1 << 7;
    /// Requests a start condition.
    pub(super) const START: u8 = 1 << 5;
    /// Requests a stop condition.
    pub(super) const STOP: u8 = 1 << 4;
    /// Enables the two-wire interface.
    pub(super) const ENABLE: u8 = 1 << 2;
}

/// Status codes reported in the upper five bits of the status register.
///
/// Only the negative-acknowledge codes are inspected; every other code on a completed operation
/// is treated as success.
mod status {
    pub(super) const MASK: u8 = 0xf8;
    pub(super) const ADDRESS_WRITE_NACK: u8 = 0x20;
    pub(super) const DATA_WRITE_NACK: u8 = 0x30;
    pub(super) const ADDRESS_READ_NACK: u8 = 0x48;
}

/// Access to a two-wire interface controller's register block.
///
/// The layout follows the AVR TWI peripheral: a control register carrying the completion flag
/// and the start/stop/enable request bits, a status register whose upper five bits report the
/// outcome of the last operation, a data register holding the byte to transmit or the byte
/// received, and a bit-rate divider register. On hardware, implementations perform volatile
/// reads and writes of the memory-mapped registers.
pub trait TwiRegisters {
    /// Reads the control register.
    fn control(&self) -> u8;

    /// Writes the control register.
    fn set_control(&mut self, value: u8);

    /// Reads the status register.
    fn status(&self) -> u8;

    /// Writes the status register. The writable low bits select the clock prescaler.
    fn set_status(&mut self, value: u8);

    /// Reads the data register.
    fn data(&self) -> u8;

    /// Writes the data register.
    fn set_data(&mut self, value: u8);

    /// Writes the bit-rate divider register.
    fn set_bit_rate(&mut self, value: u8);
}

/// Bus configuration, applied once when the interface is brought up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Bit-rate divider for the serial clock.
    ///
    /// The default of `8` yields a 100 kHz clock from a 16 MHz core clock with the prescaler at
    /// one.
    pub bit_rate: u8,
    /// Maximum number of completion-flag polls before a blocking operation fails with
    /// [`Error::BusTimeout`].
    pub poll_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bit_rate: 8,
            poll_limit: 100_000,
        }
    }
}

/// Transfer direction, encoded in the lowest bit of the addressing byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// A two-wire interface controller in master mode.
///
/// Owning the register block makes the bus a singleton resource: exactly one transaction can be
/// in flight at a time, with no locking required.
#[derive(Debug)]
pub struct Twi<R> {
    pub(crate) registers: R,
    poll_limit: u32,
}

impl<R> Twi<R>
where
    R: TwiRegisters,
{
    /// Brings up the interface: programs the bit rate, sets the prescaler to one, and enables
    /// the controller.
    pub fn new(mut registers: R, config: Config) -> Self {
        registers.set_bit_rate(config.bit_rate);
        registers.set_status(0);
        registers.set_control(control::ENABLE);
        Self {
            registers,
            poll_limit: config.poll_limit,
        }
    }

    /// Asserts a start condition, claiming the bus.
    ///
    /// Issued again without an intervening [`stop`](Self::stop), this produces a repeated start,
    /// which changes transfer direction while retaining bus ownership. Blocks until the
    /// controller reports the condition complete.
    pub fn start(&mut self) -> Result<(), Error> {
        self.registers
            .set_control(control::INTERRUPT | control::ENABLE | control::START);
        self.wait_for_completion()
    }

    /// Asserts a stop condition, releasing the bus.
    ///
    /// The controller reports no completion for a stop condition, so none is awaited; the
    /// operation is fire-and-forget.
    pub fn stop(&mut self) {
        self.registers
            .set_control(control::INTERRUPT | control::ENABLE | control::STOP);
    }

    /// Transmits a 7-bit device address together with the transfer direction.
    ///
    /// Blocks until the controller reports the addressing phase complete. An absent or
    /// unresponsive device surfaces as [`Error::Nack`].
    pub fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
        self.transfer(address << 1 | direction as u8)
    }

    /// Transmits one byte, blocking until the device's acknowledge is reported.
    pub fn write(&mut self, byte: u8) -> Result<(), Error> {
        self.transfer(byte)
    }

    /// Receives one byte, blocking until the controller has latched it.
    ///
    /// The byte is answered with a negative acknowledge, ending the read phase; this layer only
    /// performs single-byte reads.
    pub fn read(&mut self) -> Result<u8, Error> {
        self.registers
            .set_control(control::INTERRUPT | control::ENABLE);
        self.wait_for_completion()?;
        Ok(self.registers.data())
    }

    /// Loads a byte into the data register, clocks it out, and checks the acknowledge.
    fn transfer(&mut self, byte: u8) -> Result<(), Error> {
        self.registers.set_data(byte);
        self.registers
            .set_control(control::INTERRUPT | control::ENABLE);
        self.wait_for_completion()?;
        match self.registers.status() & status::MASK {
            status::ADDRESS_WRITE_NACK | status::ADDRESS_READ_NACK | status::DATA_WRITE_NACK => {
                log::warn!("device did not acknowledge byte {:#04x}", byte);
                Err(Error::Nack)
            }
            _ => Ok(()),
        }
    }

    /// Polls the completion flag, up to the configured limit.
    fn wait_for_completion(&self) -> Result<(), Error> {
        for _ in 0..self.poll_limit {
            if self.registers.control() & control::INTERRUPT != 0 {
                return Ok(());
            }
        }
        log::warn!(
            "bus controller did not report completion within {} polls",
            self.poll_limit
        );
        Err(Error::BusTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        control,
        status,
        Config,
        Direction,
        Twi,
        TwiRegisters,
    };
    use crate::Error;
    use claims::{
        assert_err_eq,
        assert_ok,
        assert_ok_eq,
    };
    use core::cell::Cell;

    /// A controller that completes every operation immediately and acknowledges everything.
    #[derive(Default)]
    struct Responsive {
        control: u8,
        status: u8,
        data: u8,
        bit_rate: u8,
        last_written: Option<u8>,
    }

    impl TwiRegisters for Responsive {
        fn control(&self) -> u8 {
            self.control | control::INTERRUPT
        }

        fn set_control(&mut self, value: u8) {
            self.control = value;
            if value & control::INTERRUPT != 0 && value & (control::START | control::STOP) == 0 {
                self.last_written = Some(self.data);
            }
        }

        fn status(&self) -> u8 {
            self.status
        }

        fn set_status(&mut self, value: u8) {
            self.status = value;
        }

        fn data(&self) -> u8 {
            self.data
        }

        fn set_data(&mut self, value: u8) {
            self.data = value;
        }

        fn set_bit_rate(&mut self, value: u8) {
            self.bit_rate = value;
        }
    }

    /// A controller whose completion flag never asserts, counting how often it is polled.
    #[derive(Default)]
    struct Stuck {
        polls: Cell<u32>,
    }

    impl TwiRegisters for Stuck {
        fn control(&self) -> u8 {
            self.polls.set(self.polls.get() + 1);
            0
        }

        fn set_control(&mut self, _value: u8) {}

        fn status(&self) -> u8 {
            0
        }

        fn set_status(&mut self, _value: u8) {}

        fn data(&self) -> u8 {
            0
        }

        fn set_data(&mut self, _value: u8) {}

        fn set_bit_rate(&mut self, _value: u8) {}
    }

    /// A controller that completes operations but reports a negative acknowledge.
    struct Nacking {
        status: u8,
    }

    impl TwiRegisters for Nacking {
        fn control(&self) -> u8 {
            control::INTERRUPT
        }

        fn set_control(&mut self, _value: u8) {}

        fn status(&self) -> u8 {
            self.status
        }

        fn set_status(&mut self, _value: u8) {}

        fn data(&self) -> u8 {
            0
        }

        fn set_data(&mut self, _value: u8) {}

        fn set_bit_rate(&mut self, _value: u8) {}
    }

    #[test]
    fn new_programs_bit_rate_and_enables() {
        let twi = Twi::new(
            Responsive::default(),
            Config {
                bit_rate: 8,
                poll_limit: 16,
            },
        );
        assert_eq!(twi.registers.bit_rate, 8);
        assert_eq!(twi.registers.control & control::ENABLE, control::ENABLE);
    }

    #[test]
    fn start_completes() {
        let mut twi = Twi::new(Responsive::default(), Config::default());
        assert_ok!(twi.start());
    }

    #[test]
    fn send_address_appends_write_direction_bit() {
        let mut twi = Twi::new(Responsive::default(), Config::default());
        assert_ok!(twi.send_address(0b110_1000, Direction::Write));
        assert_eq!(twi.registers.last_written, Some(0b1101_0000));
    }

    #[test]
    fn send_address_appends_read_direction_bit() {
        let mut twi = Twi::new(Responsive::default(), Config::default());
        assert_ok!(twi.send_address(0b110_1000, Direction::Read));
        assert_eq!(twi.registers.last_written, Some(0b1101_0001));
    }

    #[test]
    fn write_loads_data_register() {
        let mut twi = Twi::new(Responsive::default(), Config::default());
        assert_ok!(twi.write(0x42));
        assert_eq!(twi.registers.last_written, Some(0x42));
    }

    #[test]
    fn read_returns_latched_byte() {
        let mut registers = Responsive::default();
        registers.data = 0x59;
        let mut twi = Twi::new(registers, Config::default());
        assert_ok_eq!(twi.read(), 0x59);
    }

    #[test]
    fn stuck_bus_times_out() {
        let mut twi = Twi::new(
            Stuck::default(),
            Config {
                poll_limit: 32,
                ..Config::default()
            },
        );
        assert_err_eq!(twi.start(), Error::BusTimeout);
    }

    #[test]
    fn stuck_bus_polls_are_bounded() {
        let mut twi = Twi::new(
            Stuck::default(),
            Config {
                poll_limit: 32,
                ..Config::default()
            },
        );
        assert_err_eq!(twi.write(0x00), Error::BusTimeout);
        assert_eq!(twi.registers.polls.get(), 32);
    }

    #[test]
    fn address_nack_is_surfaced() {
        let mut twi = Twi::new(
            Nacking {
                status: status::ADDRESS_WRITE_NACK,
            },
            Config::default(),
        );
        assert_ok!(twi.start());
        assert_err_eq!(twi.send_address(0b110_1000, Direction::Write), Error::Nack);
    }

    #[test]
    fn data_nack_is_surfaced() {
        let mut twi = Twi::new(
            Nacking {
                status: status::DATA_WRITE_NACK,
            },
            Config::default(),
        );
        assert_err_eq!(twi.write(0x00), Error::Nack);
    }
}
