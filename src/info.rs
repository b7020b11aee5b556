/// Bus the chip is reached over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceKind {
    /// Two-wire I2C
    I2c,
}

/// Static chip and driver metadata
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipInfo {
    /// Chip name
    pub chip_name: &'static str,
    /// Manufacturer name
    pub manufacturer_name: &'static str,
    /// Bus interface
    pub interface: InterfaceKind,
    /// Minimum supply voltage, V
    pub supply_voltage_min_v: f32,
    /// Maximum supply voltage, V
    pub supply_voltage_max_v: f32,
    /// Maximum current draw, mA
    pub max_current_ma: f32,
    /// Minimum operating temperature, C
    pub temperature_min: f32,
    /// Maximum operating temperature, C
    pub temperature_max: f32,
    /// Driver version, `major * 1000 + minor * 100 + patch`
    pub driver_version: u32,
}

/// Driver version
pub const DRIVER_VERSION: u32 = 1000;

/// QMC5883L metadata
pub const CHIP_INFO: ChipInfo = ChipInfo { chip_name: "QST QMC5883L",
                                           manufacturer_name: "QST",
                                           interface: InterfaceKind::I2c,
                                           supply_voltage_min_v: 2.16,
                                           supply_voltage_max_v: 3.6,
                                           max_current_ma: 2.6,
                                           temperature_min: -40.0,
                                           temperature_max: 85.0,
                                           driver_version: DRIVER_VERSION, };

/// Returns the chip metadata; callable without a driver instance
pub fn info() -> ChipInfo {
    CHIP_INFO
}
