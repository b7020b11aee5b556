//! Transport used by the driver to reach the chip

use core::fmt;

use hal::blocking::delay::DelayMs;
use hal::blocking::i2c::{Write, WriteRead};

use crate::register::ADDRESS;

/// Capabilities the driver needs from the platform: a bus session, register
/// transfers, a blocking delay and an optional log sink.
///
/// Every transfer is blocking. Timeouts and retries, if any, belong to the
/// implementation; the driver surfaces the first error it gets.
pub trait Interface {
    /// Transport error
    type Error;

    /// Opens the bus session
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Closes the bus session
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Reads `buffer.len()` consecutive bytes starting at register `reg`
    fn read(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `bytes` to consecutive registers starting at `reg`
    ///
    /// An implementation that cannot send the whole payload in one
    /// transaction must return an error and send nothing.
    fn write(&mut self, reg: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Blocks for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Diagnostic output. Ignored unless overridden.
    fn debug_print(&mut self, _args: fmt::Arguments) {}
}

/// Longest payload [`I2cInterface`] sends in one write
///
/// [`I2cInterface`]: ./struct.I2cInterface.html
pub const MAX_WRITE_LEN: usize = 15;

/// [`I2cInterface`] error
///
/// [`I2cInterface`]: ./struct.I2cInterface.html
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError<E> {
    /// The I2C peripheral reported an error
    Bus(E),
    /// Write payload longer than [`MAX_WRITE_LEN`]; nothing was sent
    ///
    /// [`MAX_WRITE_LEN`]: ./constant.MAX_WRITE_LEN.html
    PayloadTooLong(usize),
}

/// Log sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLog;

impl fmt::Write for NoLog {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

/// [`Interface`] over `embedded-hal` blocking I2C and delay traits
///
/// The peripheral is configured by the HAL before it is handed over, so
/// opening and closing the session is a no-op here.
///
/// [`Interface`]: ./trait.Interface.html
pub struct I2cInterface<I2C, D, L = NoLog> {
    i2c: I2C,
    delay: D,
    logger: L,
}

impl<I2C, D> I2cInterface<I2C, D, NoLog> {
    /// Creates an interface without logging
    pub fn new(i2c: I2C, delay: D) -> Self {
        I2cInterface { i2c,
                       delay,
                       logger: NoLog, }
    }
}

impl<I2C, D, L> I2cInterface<I2C, D, L> where L: fmt::Write
{
    /// Creates an interface that narrates driver diagnostics to `logger`
    pub fn with_logger(i2c: I2C, delay: D, logger: L) -> Self {
        I2cInterface { i2c, delay, logger }
    }

    /// Gives back the I2C peripheral, the delay provider and the logger
    pub fn release(self) -> (I2C, D, L) {
        (self.i2c, self.delay, self.logger)
    }
}

impl<I2C, D, L, E> Interface for I2cInterface<I2C, D, L>
    where I2C: WriteRead<Error = E> + Write<Error = E>,
          D: DelayMs<u32>,
          L: fmt::Write
{
    type Error = I2cError<E>;

    fn open(&mut self) -> Result<(), I2cError<E>> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), I2cError<E>> {
        Ok(())
    }

    fn read(&mut self,
            reg: u8,
            buffer: &mut [u8])
            -> Result<(), I2cError<E>> {
        self.i2c
            .write_read(ADDRESS, &[reg], buffer)
            .map_err(I2cError::Bus)
    }

    fn write(&mut self, reg: u8, bytes: &[u8]) -> Result<(), I2cError<E>> {
        let n = bytes.len();
        if n > MAX_WRITE_LEN {
            return Err(I2cError::PayloadTooLong(n));
        }

        // register address followed by the payload in one transaction
        let mut frame = [0u8; MAX_WRITE_LEN + 1];
        frame[0] = reg;
        frame[1..=n].copy_from_slice(bytes);
        self.i2c.write(ADDRESS, &frame[..=n]).map_err(I2cError::Bus)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms)
    }

    fn debug_print(&mut self, args: fmt::Arguments) {
        let _ = self.logger.write_fmt(args);
        let _ = self.logger.write_str("\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeI2cPort {
        writes: Vec<(u8, Vec<u8>)>,
        reads: Vec<(u8, u8, usize)>,
    }

    impl Write for FakeI2cPort {
        type Error = ();

        fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), ()> {
            self.writes.push((addr, bytes.to_vec()));
            Ok(())
        }
    }

    impl WriteRead for FakeI2cPort {
        type Error = ();

        fn write_read(&mut self,
                      addr: u8,
                      bytes: &[u8],
                      buffer: &mut [u8])
                      -> Result<(), ()> {
            self.reads.push((addr, bytes[0], buffer.len()));
            for (i, b) in buffer.iter_mut().enumerate() {
                *b = i as u8;
            }
            Ok(())
        }
    }

    struct FakeDelay(u32);

    impl DelayMs<u32> for FakeDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.0 += ms;
        }
    }

    #[test]
    fn write_prefixes_register_address() {
        let mut iface = I2cInterface::new(FakeI2cPort::default(), FakeDelay(0));
        iface.write(0x0B, &[0x01]).unwrap();

        let (i2c, _, _) = iface.release();
        assert_eq!(i2c.writes, [(ADDRESS, vec![0x0B, 0x01])]);
    }

    #[test]
    fn full_length_write_is_sent_whole() {
        let mut iface = I2cInterface::new(FakeI2cPort::default(), FakeDelay(0));
        let payload = [0xA5u8; MAX_WRITE_LEN];
        iface.write(0x00, &payload).unwrap();

        let (i2c, _, _) = iface.release();
        assert_eq!(i2c.writes.len(), 1);
        assert_eq!(i2c.writes[0].1.len(), MAX_WRITE_LEN + 1);
        assert_eq!(i2c.writes[0].1[0], 0x00);
        assert_eq!(&i2c.writes[0].1[1..], &payload[..]);
    }

    #[test]
    fn oversized_write_is_refused() {
        let mut iface = I2cInterface::new(FakeI2cPort::default(), FakeDelay(0));
        assert_eq!(iface.write(0x00, &[7; 20]),
                   Err(I2cError::PayloadTooLong(20)));
        assert_eq!(iface.write(0x00, &[7; MAX_WRITE_LEN + 1]),
                   Err(I2cError::PayloadTooLong(MAX_WRITE_LEN + 1)));

        let (i2c, _, _) = iface.release();
        assert!(i2c.writes.is_empty());
    }

    #[test]
    fn bus_errors_are_wrapped() {
        struct DeadPort;

        impl Write for DeadPort {
            type Error = u8;

            fn write(&mut self, _addr: u8, _bytes: &[u8]) -> Result<(), u8> {
                Err(1)
            }
        }

        impl WriteRead for DeadPort {
            type Error = u8;

            fn write_read(&mut self,
                          _addr: u8,
                          _bytes: &[u8],
                          _buffer: &mut [u8])
                          -> Result<(), u8> {
                Err(2)
            }
        }

        let mut iface = I2cInterface::new(DeadPort, FakeDelay(0));
        let mut buffer = [0u8; 1];
        assert_eq!(iface.write(0x0B, &[1]), Err(I2cError::Bus(1)));
        assert_eq!(iface.read(0x0D, &mut buffer), Err(I2cError::Bus(2)));
    }

    #[test]
    fn read_is_a_single_write_read() {
        let mut iface = I2cInterface::new(FakeI2cPort::default(), FakeDelay(0));
        let mut buffer = [0u8; 6];
        iface.read(0x00, &mut buffer).unwrap();

        assert_eq!(buffer, [0, 1, 2, 3, 4, 5]);
        let (i2c, _, _) = iface.release();
        assert_eq!(i2c.reads, [(ADDRESS, 0x00, 6)]);
    }

    #[test]
    fn delay_and_log_are_forwarded() {
        let mut iface = I2cInterface::with_logger(FakeI2cPort::default(),
                                                  FakeDelay(0),
                                                  String::new());
        iface.delay_ms(100);
        iface.delay_ms(10);
        iface.debug_print(format_args!("qmc5883l: {} failed.", "init"));

        let (_, delay, log) = iface.release();
        assert_eq!(delay.0, 110);
        assert_eq!(log, "qmc5883l: init failed.\r\n");
    }
}
