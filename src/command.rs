use crate::oversampling::OversamplingRatio;

const RESET: u8 = 0x1E;
const PROM_READ_BASE: u8 = 0xA0;
const D1_CONVERSION_BASE: u8 = 0x40;
const D2_CONVERSION_BASE: u8 = 0x50;
const ADC_READ: u8 = 0x00;

/// Number of 16 bit words in the PROM.
pub(crate) const PROM_WORDS: u8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Reset,
    /// PROM word `0..=7`. Words 1..=6 hold C1..C6, word 7 ends with the CRC.
    ReadProm(u8),
    /// Start a pressure conversion.
    D1Conversion(OversamplingRatio),
    /// Start a temperature conversion.
    D2Conversion(OversamplingRatio),
    /// 24 bit pressure / temperature
    ReadAdc,
}

impl Command {
    pub fn value(&self) -> u8 {
        match *self {
            Command::Reset => RESET,
            Command::ReadProm(index) => {
                debug_assert!(index < PROM_WORDS, "PROM word {} out of range", index);
                PROM_READ_BASE + index * 2
            }
            Command::D1Conversion(ratio) => D1_CONVERSION_BASE + ratio.command_offset(),
            Command::D2Conversion(ratio) => D2_CONVERSION_BASE + ratio.command_offset(),
            Command::ReadAdc => ADC_READ,
        }
    }

    /// Bytes the device answers with.
    pub fn response_len(&self) -> usize {
        match self {
            Command::ReadProm(_) => 2,
            Command::ReadAdc => 3,
            _ => 0,
        }
    }
}
