/// 7-bit I2C address of the QMC5883L
pub const ADDRESS: u8 = 0x0D;

/// Value the chip id register always reads back
pub const CHIP_ID: u8 = 0xFF;

/// Register map
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// X axis output, low byte
    X_LSB = 0x00,
    /// X axis output, high byte
    X_MSB = 0x01,
    /// Y axis output, low byte
    Y_LSB = 0x02,
    /// Y axis output, high byte
    Y_MSB = 0x03,
    /// Z axis output, low byte
    Z_LSB = 0x04,
    /// Z axis output, high byte
    Z_MSB = 0x05,
    /// DRDY, OVL and DOR flags
    STATUS = 0x06,
    /// Temperature output, low byte
    TEMP_LSB = 0x07,
    /// Temperature output, high byte
    TEMP_MSB = 0x08,
    /// Mode, output rate, full scale and over sample ratio
    CONTROL1 = 0x09,
    /// Interrupt pin, pointer roll-over and soft reset
    CONTROL2 = 0x0A,
    /// SET/RESET period
    PERIOD = 0x0B,
    /// Chip id, reads `0xFF`
    CHIP_ID = 0x0D,
}

impl Register {
    /// Register address
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}

// CONTROL2 bits that are not owned by a configuration enum
pub(crate) const SOFT_RST: u8 = 1 << 7;
