//! A platform agnostic driver to interface with the QMC5883L (3-axis
//! magnetometer)
//!
//! The driver talks to the chip through an [`Interface`]: a bus session,
//! register reads and writes, a blocking delay and an optional log sink.
//! [`I2cInterface`] implements it on top of [`embedded-hal`] traits.
//!
//! All configuration lives in the chip. Setters read the owning control
//! register, replace their bit-field and write it back, so settings sharing
//! a register never clobber each other.
//!
//! [`Interface`]: ./trait.Interface.html
//! [`I2cInterface`]: ./struct.I2cInterface.html
//! [`embedded-hal`]: https://docs.rs/embedded-hal

#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

extern crate cast;
extern crate embedded_hal as hal;
extern crate generic_array;
extern crate nalgebra;

macro_rules! debug {
    ($iface:expr, $($arg:tt)*) => {
        $iface.debug_print(format_args!($($arg)*))
    };
}

mod conf;
mod info;
mod interface;
mod register;
mod status;

use cast::{f32, u16};
use generic_array::typenum::{U1, U2, U6};
use generic_array::{ArrayLength, GenericArray};

pub use nalgebra::Vector3;

pub use conf::{modify, Config, FullScale, Mode, OutputRate, OverSample};
pub use info::{info, ChipInfo, InterfaceKind, CHIP_INFO, DRIVER_VERSION};
pub use interface::{I2cError, I2cInterface, Interface, NoLog, MAX_WRITE_LEN};
pub use register::{Register, ADDRESS, CHIP_ID};
pub use status::{Status, StatusFlag};

use conf::{InterruptPin, PointerRollOver, RegisterBits};
use register::SOFT_RST;

const TEMP_SENSITIVITY: f32 = 100.0;
const TEMP_ZERO_OFFSET: f32 = 30.0;

const RESET_DELAY_MS: u32 = 100;
const STANDBY_DELAY_MS: u32 = 10;
const READY_POLL_INTERVAL_MS: u32 = 10;

/// Poll budget for [`read_when_ready`], 50 s at the 10 ms poll interval
///
/// [`read_when_ready`]: ./struct.Qmc5883l.html#method.read_when_ready
pub const DEFAULT_READY_POLLS: u32 = 5000;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Used before `init` or after `deinit`
    NotInitialized,
    /// Bus open, close, read or write failed
    Transport(E),
    /// Argument out of range
    InvalidParameter,
    /// Register holds a bit pattern no setting maps to
    DataParse(u8),
    /// Chip id register did not read `0xFF`
    InvalidChipId(u8),
    /// Data ready flag was not raised within the poll budget
    DataNotReady,
}

/// Magnetometer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Raw axis outputs
    pub raw: Vector3<i16>,
    /// Field strength in milligauss
    pub milli_gauss: Vector3<f32>,
}

/// Converts a raw axis output to milligauss at the given full scale
pub fn raw_to_physical(raw: i16, scale: FullScale) -> f32 {
    f32(raw) * 1000.0 / scale.sensitivity()
}

/// QMC5883L driver
pub struct Qmc5883l<IF> {
    iface: IF,
    initialized: bool,
}

impl<IF, E> Qmc5883l<IF> where IF: Interface<Error = E>
{
    /// Creates a driver over `iface`. Nothing is sent until [`init`].
    ///
    /// [`init`]: #method.init
    pub fn new(iface: IF) -> Self {
        Qmc5883l { iface,
                   initialized: false, }
    }

    /// Whether [`init`] succeeded and [`deinit`] has not been called since
    ///
    /// [`init`]: #method.init
    /// [`deinit`]: #method.deinit
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Gives back the interface
    pub fn release(self) -> IF {
        self.iface
    }

    /// Opens the bus, checks the chip id and soft resets the chip
    ///
    /// If anything fails after the bus was opened, the bus is closed again
    /// and the driver is left uninitialized, even if it was initialized
    /// before the call.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        self.initialized = false;

        if let Err(e) = self.iface.open() {
            debug!(self.iface, "qmc5883l: iic init failed.");
            return Err(Error::Transport(e));
        }

        if let Err(e) = self.identify_and_reset() {
            let _ = self.iface.close();
            return Err(e);
        }

        self.initialized = true;
        Ok(())
    }

    /// Puts the chip in standby and closes the bus
    ///
    /// On failure the driver stays initialized so `deinit` can be retried.
    pub fn deinit(&mut self) -> Result<(), Error<E>> {
        self.check_init()?;

        self.write_field(Mode::Standby)?;
        self.iface.delay_ms(STANDBY_DELAY_MS);

        if let Err(e) = self.iface.close() {
            debug!(self.iface, "qmc5883l: iic deinit failed.");
            return Err(Error::Transport(e));
        }

        self.initialized = false;
        Ok(())
    }

    /// Resets every register to its power-on default and waits for the chip
    /// to settle. The chip comes back in standby.
    pub fn soft_reset(&mut self) -> Result<(), Error<E>> {
        self.check_init()?;
        self.modify_register(Register::CONTROL2, |r| r | SOFT_RST)?;
        self.iface.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Applies every setting present in `config`
    ///
    /// The mode is written last so measurements start with the final
    /// settings.
    pub fn configure(&mut self, config: &Config) -> Result<(), Error<E>> {
        self.check_init()?;

        if let Some(period) = config.period {
            self.set_period(period)?;
        }
        if let Some(enable) = config.pointer_roll_over {
            self.set_pointer_roll_over(enable)?;
        }
        if let Some(enable) = config.interrupt {
            self.set_interrupt(enable)?;
        }
        if let Some(over_sample) = config.over_sample {
            self.set_over_sample(over_sample)?;
        }
        if let Some(full_scale) = config.full_scale {
            self.set_full_scale(full_scale)?;
        }
        if let Some(output_rate) = config.output_rate {
            self.set_output_rate(output_rate)?;
        }
        if let Some(mode) = config.mode {
            self.set_mode(mode)?;
        }
        Ok(())
    }

    /// Latest axis outputs, fetched in a single burst
    ///
    /// Does not wait for the data ready flag; whatever is latched is
    /// returned.
    pub fn read_raw(&mut self) -> Result<Vector3<i16>, Error<E>> {
        self.check_init()?;
        self.read_axes()
    }

    /// Latest sample, converted with the full scale read back from the chip
    pub fn read(&mut self) -> Result<Measurement, Error<E>> {
        self.check_init()?;

        let scale: FullScale = self.read_field()?;
        let raw = self.read_axes()?;

        Ok(Measurement { raw,
                         milli_gauss: raw.map(|v| raw_to_physical(v, scale)), })
    }

    /// Polls the data ready flag every 10 ms, at most `max_polls` times,
    /// then reads the sample
    pub fn read_when_ready(&mut self,
                           max_polls: u32)
                           -> Result<Measurement, Error<E>> {
        self.check_init()?;
        if max_polls == 0 {
            return Err(Error::InvalidParameter);
        }

        for _ in 0..max_polls {
            if self.status()?.data_ready() {
                return self.read();
            }
            self.iface.delay_ms(READY_POLL_INTERVAL_MS);
        }

        debug!(self.iface, "qmc5883l: read timeout.");
        Err(Error::DataNotReady)
    }

    /// Temperature sensor measurement, raw and in Celsius
    pub fn read_temperature(&mut self) -> Result<(i16, f32), Error<E>> {
        self.check_init()?;

        let buffer: GenericArray<u8, U2> =
            self.read_registers(Register::TEMP_LSB)?;
        let raw = (u16(buffer[0]) | (u16(buffer[1]) << 8)) as i16;

        Ok((raw, f32(raw) / TEMP_SENSITIVITY + TEMP_ZERO_OFFSET))
    }

    /// Reads the status register
    pub fn get_status(&mut self) -> Result<Status, Error<E>> {
        self.check_init()?;
        self.status()
    }

    /// Sets the operating mode
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<E>> {
        self.check_init()?;
        self.write_field(mode)
    }

    /// Operating mode
    pub fn get_mode(&mut self) -> Result<Mode, Error<E>> {
        self.check_init()?;
        self.read_field()
    }

    /// Sets the output data rate
    pub fn set_output_rate(&mut self,
                           rate: OutputRate)
                           -> Result<(), Error<E>> {
        self.check_init()?;
        self.write_field(rate)
    }

    /// Output data rate
    pub fn get_output_rate(&mut self) -> Result<OutputRate, Error<E>> {
        self.check_init()?;
        self.read_field()
    }

    /// Sets the over sample ratio
    pub fn set_over_sample(&mut self,
                           over_sample: OverSample)
                           -> Result<(), Error<E>> {
        self.check_init()?;
        self.write_field(over_sample)
    }

    /// Over sample ratio
    pub fn get_over_sample(&mut self) -> Result<OverSample, Error<E>> {
        self.check_init()?;
        self.read_field()
    }

    /// Sets the full scale
    pub fn set_full_scale(&mut self, scale: FullScale) -> Result<(), Error<E>> {
        self.check_init()?;
        self.write_field(scale)
    }

    /// Full scale
    pub fn get_full_scale(&mut self) -> Result<FullScale, Error<E>> {
        self.check_init()?;
        self.read_field()
    }

    /// Enables or disables pointer roll-over
    pub fn set_pointer_roll_over(&mut self,
                                 enable: bool)
                                 -> Result<(), Error<E>> {
        self.check_init()?;
        self.write_field(PointerRollOver::from(enable))
    }

    /// Whether pointer roll-over is enabled
    pub fn get_pointer_roll_over(&mut self) -> Result<bool, Error<E>> {
        self.check_init()?;
        let rol: PointerRollOver = self.read_field()?;
        Ok(rol == PointerRollOver::Enable)
    }

    /// Enables or disables the data ready interrupt pin
    pub fn set_interrupt(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.check_init()?;
        self.write_field(InterruptPin::from(enable))
    }

    /// Whether the data ready interrupt pin is enabled
    pub fn get_interrupt(&mut self) -> Result<bool, Error<E>> {
        self.check_init()?;
        let pin: InterruptPin = self.read_field()?;
        Ok(pin == InterruptPin::Enable)
    }

    /// Sets the SET/RESET period register
    pub fn set_period(&mut self, period: u8) -> Result<(), Error<E>> {
        self.check_init()?;
        self.write_register(Register::PERIOD, period)
    }

    /// SET/RESET period register
    pub fn get_period(&mut self) -> Result<u8, Error<E>> {
        self.check_init()?;
        self.read_register(Register::PERIOD)
    }

    /// Writes one byte to register `reg`
    pub fn set_reg(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.set_regs(reg, &[value])
    }

    /// Reads register `reg`
    pub fn get_reg(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut buffer = [0u8; 1];
        self.get_regs(reg, &mut buffer)?;
        Ok(buffer[0])
    }

    /// Writes `bytes` to consecutive registers starting at `reg` in one
    /// transaction
    ///
    /// The interface may refuse payloads it cannot send in one transfer;
    /// [`I2cInterface`] does so above [`MAX_WRITE_LEN`] bytes.
    ///
    /// [`I2cInterface`]: ./struct.I2cInterface.html
    /// [`MAX_WRITE_LEN`]: ./constant.MAX_WRITE_LEN.html
    pub fn set_regs(&mut self, reg: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        self.check_init()?;
        if bytes.is_empty() {
            return Err(Error::InvalidParameter);
        }
        self.write_bytes(reg, bytes)
    }

    /// Fills `buffer` from consecutive registers starting at `reg` in one
    /// transaction
    pub fn get_regs(&mut self,
                    reg: u8,
                    buffer: &mut [u8])
                    -> Result<(), Error<E>> {
        self.check_init()?;
        if buffer.is_empty() {
            return Err(Error::InvalidParameter);
        }
        self.read_bytes(reg, buffer)
    }

    fn check_init(&mut self) -> Result<(), Error<E>> {
        if self.initialized {
            Ok(())
        } else {
            debug!(self.iface, "qmc5883l: handle is not initialized.");
            Err(Error::NotInitialized)
        }
    }

    fn identify_and_reset(&mut self) -> Result<(), Error<E>> {
        let id = self.read_register(Register::CHIP_ID)?;
        if id != CHIP_ID {
            debug!(self.iface, "qmc5883l: id is invalid: 0x{:02X}.", id);
            return Err(Error::InvalidChipId(id));
        }

        self.modify_register(Register::CONTROL2, |r| r | SOFT_RST)?;
        self.iface.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    fn status(&mut self) -> Result<Status, Error<E>> {
        self.read_register(Register::STATUS).map(Status::from_bits)
    }

    // X, Y, Z little-endian pairs; one transaction so the axes belong to
    // the same sample
    fn read_axes(&mut self) -> Result<Vector3<i16>, Error<E>> {
        let buffer: GenericArray<u8, U6> =
            self.read_registers(Register::X_LSB)?;

        Ok(Vector3::new((u16(buffer[0]) | (u16(buffer[1]) << 8)) as i16,
                        (u16(buffer[2]) | (u16(buffer[3]) << 8)) as i16,
                        (u16(buffer[4]) | (u16(buffer[5]) << 8)) as i16))
    }

    fn write_field<RB>(&mut self, v: RB) -> Result<(), Error<E>>
        where RB: RegisterBits
    {
        self.modify_register(RB::register(),
                             |r| modify(r, RB::mask(), v.value()))
    }

    fn read_field<RB>(&mut self) -> Result<RB, Error<E>>
        where RB: RegisterBits
    {
        let reg = RB::register();
        let r = self.read_register(reg)?;
        match RB::from_bits(r) {
            Some(v) => Ok(v),
            None => {
                debug!(self.iface,
                       "qmc5883l: register 0x{:02X} holds unknown \
                        value 0x{:02X}.",
                       reg.addr(),
                       r);
                Err(Error::DataParse(r))
            }
        }
    }

    fn modify_register<F>(&mut self,
                          reg: Register,
                          f: F)
                          -> Result<(), Error<E>>
        where F: FnOnce(u8) -> u8
    {
        let r = self.read_register(reg)?;
        self.write_register(reg, f(r))?;
        Ok(())
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, Error<E>> {
        let buffer: GenericArray<u8, U1> = self.read_registers(reg)?;
        Ok(buffer[0])
    }

    fn read_registers<N>(&mut self,
                         reg: Register)
                         -> Result<GenericArray<u8, N>, Error<E>>
        where N: ArrayLength<u8>
    {
        let mut buffer: GenericArray<u8, N> = GenericArray::default();
        self.read_bytes(reg.addr(), &mut buffer)?;
        Ok(buffer)
    }

    fn write_register(&mut self,
                      reg: Register,
                      byte: u8)
                      -> Result<(), Error<E>> {
        self.write_bytes(reg.addr(), &[byte])
    }

    fn read_bytes(&mut self,
                  reg: u8,
                  buffer: &mut [u8])
                  -> Result<(), Error<E>> {
        self.iface.read(reg, buffer).map_err(|e| {
            debug!(self.iface, "qmc5883l: read register 0x{:02X} failed.", reg);
            Error::Transport(e)
        })
    }

    fn write_bytes(&mut self, reg: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        self.iface.write(reg, bytes).map_err(|e| {
            debug!(self.iface,
                   "qmc5883l: write register 0x{:02X} failed.",
                   reg);
            Error::Transport(e)
        })
    }
}
