use crate::register::Register;

/// A setting that occupies a fixed bit-field of one control register
pub(crate) trait RegisterBits: Sized {
    /// Register the field lives in
    fn register() -> Register;
    /// Bits owned by the field
    fn mask() -> u8;
    /// Field value, already shifted into place
    fn value(&self) -> u8;
    /// Decodes the field from a full register byte
    fn from_bits(bits: u8) -> Option<Self>;
}

/// Replaces the bits selected by `mask` in `old` with those of `value`,
/// leaving every other bit of the register untouched.
pub fn modify(old: u8, mask: u8, value: u8) -> u8 {
    (old & !mask) | (value & mask)
}

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// No measurements, lowest power
    Standby = 0x00,
    /// Measures continuously at the configured output rate
    Continuous = 0x01,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Standby
    }
}

impl RegisterBits for Mode {
    fn register() -> Register {
        Register::CONTROL1
    }

    fn mask() -> u8 {
        0x03
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        match bits & Self::mask() {
            0x00 => Some(Mode::Standby),
            0x01 => Some(Mode::Continuous),
            _ => None,
        }
    }
}

/// Output data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(non_camel_case_types)]
pub enum OutputRate {
    /// 10 Hz
    _10_Hz = 0x00,
    /// 50 Hz
    _50_Hz = 0x04,
    /// 100 Hz
    _100_Hz = 0x08,
    /// 200 Hz
    _200_Hz = 0x0C,
}

impl Default for OutputRate {
    fn default() -> Self {
        OutputRate::_10_Hz
    }
}

impl RegisterBits for OutputRate {
    fn register() -> Register {
        Register::CONTROL1
    }

    fn mask() -> u8 {
        OutputRate::_200_Hz.value()
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        match bits & Self::mask() {
            0x00 => Some(OutputRate::_10_Hz),
            0x04 => Some(OutputRate::_50_Hz),
            0x08 => Some(OutputRate::_100_Hz),
            _ => Some(OutputRate::_200_Hz),
        }
    }
}

impl OutputRate {
    /// Rate in Hz
    pub fn hz(&self) -> u16 {
        match self {
            OutputRate::_10_Hz => 10,
            OutputRate::_50_Hz => 50,
            OutputRate::_100_Hz => 100,
            OutputRate::_200_Hz => 200,
        }
    }
}

/// Magnetometer full scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(non_camel_case_types)]
pub enum FullScale {
    /// +/- 2 gauss
    _2_Ga = 0x00,
    /// +/- 8 gauss
    _8_Ga = 0x10,
}

impl Default for FullScale {
    fn default() -> Self {
        FullScale::_2_Ga
    }
}

impl RegisterBits for FullScale {
    fn register() -> Register {
        Register::CONTROL1
    }

    // two bits wide, upper pattern reserved
    fn mask() -> u8 {
        0x30
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        match bits & Self::mask() {
            0x00 => Some(FullScale::_2_Ga),
            0x10 => Some(FullScale::_8_Ga),
            _ => None,
        }
    }
}

impl FullScale {
    /// LSB per gauss
    pub fn sensitivity(&self) -> f32 {
        match self {
            FullScale::_2_Ga => 12000.0,
            FullScale::_8_Ga => 3000.0,
        }
    }

    /// mgauss per LSB
    pub fn resolution(&self) -> f32 {
        1000.0 / self.sensitivity()
    }
}

/// Over sample ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(non_camel_case_types)]
pub enum OverSample {
    /// 512 samples
    _512 = 0x00,
    /// 256 samples
    _256 = 0x40,
    /// 128 samples
    _128 = 0x80,
    /// 64 samples
    _64 = 0xC0,
}

impl Default for OverSample {
    fn default() -> Self {
        OverSample::_512
    }
}

impl RegisterBits for OverSample {
    fn register() -> Register {
        Register::CONTROL1
    }

    fn mask() -> u8 {
        OverSample::_64.value()
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        match bits & Self::mask() {
            0x00 => Some(OverSample::_512),
            0x40 => Some(OverSample::_256),
            0x80 => Some(OverSample::_128),
            _ => Some(OverSample::_64),
        }
    }
}

impl OverSample {
    /// Number of internal samples per output sample
    pub fn ratio(&self) -> u16 {
        match self {
            OverSample::_512 => 512,
            OverSample::_256 => 256,
            OverSample::_128 => 128,
            OverSample::_64 => 64,
        }
    }
}

/// Register pointer rolls over from the last output register back to X
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerRollOver {
    Enable = 0x40,
    Disable = 0x00,
}

impl From<bool> for PointerRollOver {
    fn from(enable: bool) -> Self {
        if enable {
            PointerRollOver::Enable
        } else {
            PointerRollOver::Disable
        }
    }
}

impl RegisterBits for PointerRollOver {
    fn register() -> Register {
        Register::CONTROL2
    }

    fn mask() -> u8 {
        PointerRollOver::Enable.value()
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        Some((bits & Self::mask() != 0).into())
    }
}

// INT_ENB is active high: setting the bit disables the DRDY pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InterruptPin {
    Enable = 0x00,
    Disable = 0x01,
}

impl From<bool> for InterruptPin {
    fn from(enable: bool) -> Self {
        if enable {
            InterruptPin::Enable
        } else {
            InterruptPin::Disable
        }
    }
}

impl RegisterBits for InterruptPin {
    fn register() -> Register {
        Register::CONTROL2
    }

    fn mask() -> u8 {
        InterruptPin::Disable.value()
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        Some((bits & Self::mask() == 0).into())
    }
}

/// Configuration of Qmc5883l
///
/// Only the settings that were set are written by [`configure`].
///
/// [`configure`]: ./struct.Qmc5883l.html#method.configure
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub(crate) mode: Option<Mode>,
    pub(crate) output_rate: Option<OutputRate>,
    pub(crate) over_sample: Option<OverSample>,
    pub(crate) full_scale: Option<FullScale>,
    pub(crate) pointer_roll_over: Option<bool>,
    pub(crate) interrupt: Option<bool>,
    pub(crate) period: Option<u8>,
}

impl Config {
    /// Creates an empty configuration that leaves every register as is
    pub fn new() -> Self {
        Config { mode: None,
                 output_rate: None,
                 over_sample: None,
                 full_scale: None,
                 pointer_roll_over: None,
                 interrupt: None,
                 period: None, }
    }

    /// Continuous measurement at 10 Hz, +/- 2 gauss, 512 over sample,
    /// pointer roll-over on, interrupt pin off and the recommended SET/RESET
    /// period of `0x01`.
    pub fn basic() -> Self {
        let mut config = Config::new();
        config.mode(Mode::Continuous)
              .output_rate(OutputRate::_10_Hz)
              .over_sample(OverSample::_512)
              .full_scale(FullScale::_2_Ga)
              .pointer_roll_over(true)
              .interrupt(false)
              .period(0x01);
        config
    }

    /// Sets operating mode ([`Mode`])
    ///
    /// [`Mode`]: ./enum.Mode.html
    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    /// Sets output data rate ([`OutputRate`])
    ///
    /// [`OutputRate`]: ./enum.OutputRate.html
    pub fn output_rate(&mut self, output_rate: OutputRate) -> &mut Self {
        self.output_rate = Some(output_rate);
        self
    }

    /// Sets over sample ratio ([`OverSample`])
    ///
    /// [`OverSample`]: ./enum.OverSample.html
    pub fn over_sample(&mut self, over_sample: OverSample) -> &mut Self {
        self.over_sample = Some(over_sample);
        self
    }

    /// Sets full reading scale ([`FullScale`])
    ///
    /// [`FullScale`]: ./enum.FullScale.html
    pub fn full_scale(&mut self, full_scale: FullScale) -> &mut Self {
        self.full_scale = Some(full_scale);
        self
    }

    /// Enables or disables pointer roll-over
    pub fn pointer_roll_over(&mut self, enable: bool) -> &mut Self {
        self.pointer_roll_over = Some(enable);
        self
    }

    /// Enables or disables the data ready interrupt pin
    pub fn interrupt(&mut self, enable: bool) -> &mut Self {
        self.interrupt = Some(enable);
        self
    }

    /// Sets the SET/RESET period register
    pub fn period(&mut self, period: u8) -> &mut Self {
        self.period = Some(period);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_touches_only_masked_bits() {
        assert_eq!(modify(0xFF, 0x30, 0x10), 0xDF);
        assert_eq!(modify(0x00, 0x30, 0x10), 0x10);
        assert_eq!(modify(0b1010_1010, 0x03, 0x01), 0b1010_1001);
        // stray bits outside the mask are dropped
        assert_eq!(modify(0x00, 0x01, 0xFF), 0x01);
    }

    #[test]
    fn fields_do_not_overlap() {
        let control1 = [Mode::mask(),
                        OutputRate::mask(),
                        FullScale::mask(),
                        OverSample::mask()];
        assert_eq!(control1.iter().fold(0u8, |acc, m| acc | *m), 0xFF);
        for (i, a) in control1.iter().enumerate() {
            for b in &control1[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
        assert_eq!(PointerRollOver::mask() & InterruptPin::mask(), 0);
    }

    #[test]
    fn reserved_patterns_are_rejected() {
        assert_eq!(Mode::from_bits(0x02), None);
        assert_eq!(Mode::from_bits(0x03), None);
        assert_eq!(FullScale::from_bits(0x20), None);
        assert_eq!(FullScale::from_bits(0x30), None);
        assert_eq!(FullScale::from_bits(0x1F), Some(FullScale::_8_Ga));
    }

    #[test]
    fn interrupt_bit_is_inverted() {
        assert_eq!(InterruptPin::from(true).value(), 0x00);
        assert_eq!(InterruptPin::from(false).value(), 0x01);
        assert_eq!(InterruptPin::from_bits(0xFE), Some(InterruptPin::Enable));
        assert_eq!(InterruptPin::from_bits(0x01), Some(InterruptPin::Disable));
    }

    #[test]
    fn basic_config_sets_everything() {
        let c = Config::basic();
        assert_eq!(c.mode, Some(Mode::Continuous));
        assert_eq!(c.output_rate, Some(OutputRate::_10_Hz));
        assert_eq!(c.pointer_roll_over, Some(true));
        assert_eq!(c.interrupt, Some(false));
        assert_eq!(c.period, Some(0x01));
        assert_eq!(Config::new(), Config::default());
    }
}
