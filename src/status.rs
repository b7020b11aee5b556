/// One flag of the status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusFlag {
    /// New data is ready to be read (DRDY)
    DataReady = 1 << 0,
    /// An axis exceeded the full scale range (OVL)
    Overflow = 1 << 1,
    /// A sample was overwritten before it was read (DOR)
    DataSkipped = 1 << 2,
}

/// Snapshot of the status register
///
/// Flags are independent; any combination may be reported at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u8);

impl Status {
    /// Wraps a raw status register byte
    pub fn from_bits(bits: u8) -> Self {
        Status(bits)
    }

    /// Raw register byte
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether `flag` is set
    pub fn contains(&self, flag: StatusFlag) -> bool {
        self.0 & flag as u8 != 0
    }

    /// DRDY
    pub fn data_ready(&self) -> bool {
        self.contains(StatusFlag::DataReady)
    }

    /// OVL
    pub fn overflow(&self) -> bool {
        self.contains(StatusFlag::Overflow)
    }

    /// DOR
    pub fn data_skipped(&self) -> bool {
        self.contains(StatusFlag::DataSkipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [StatusFlag; 3] = [StatusFlag::DataReady,
                                  StatusFlag::Overflow,
                                  StatusFlag::DataSkipped];

    fn set(status: Status) -> [bool; 3] {
        [status.contains(ALL[0]),
         status.contains(ALL[1]),
         status.contains(ALL[2])]
    }

    #[test]
    fn flags_are_independent() {
        assert_eq!(set(Status::from_bits(0b000)), [false, false, false]);
        assert_eq!(set(Status::from_bits(0b001)), [true, false, false]);
        assert_eq!(set(Status::from_bits(0b010)), [false, true, false]);
        assert_eq!(set(Status::from_bits(0b100)), [false, false, true]);
        assert_eq!(set(Status::from_bits(0b111)), [true, true, true]);
    }

    #[test]
    fn reserved_bits_are_ignored() {
        let status = Status::from_bits(0b1111_1000);
        assert!(!status.data_ready());
        assert!(!status.overflow());
        assert!(!status.data_skipped());
        assert_eq!(status.bits(), 0b1111_1000);
    }
}
