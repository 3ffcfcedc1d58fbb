use crate::bus::{read_exact, Bus};
use crate::command::{Command, PROM_WORDS};
use crate::error::DeviceError;

/// Number of calibration coefficients, C1..C6.
pub const COEFFICIENT_COUNT: usize = 6;

/// Factory calibration data read from PROM
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// C1: Pressure sensitivity | SENST1
    pub sens_t1: u16,
    /// C2: Pressure offset | OFFT1
    pub off_t1: u16,
    /// C3: Temperature coefficient of pressure sensitivity | TCS
    pub tcs: u16,
    /// C4: Temperature coefficient of pressure offset | TCO
    pub tco: u16,
    /// C5: Reference temperature | TREF
    pub t_ref: u16,
    /// C6: Temperature coefficient of the temperature | TEMPSENS
    pub temp_sens: u16,
    // We don't store PROM[0] (manufacturer info) or PROM[7] (Serial/CRC) here
}

impl Calibration {
    /// Builds the coefficients from a full PROM image.
    pub fn new(prom: &[u16; 8]) -> Calibration {
        Calibration {
            sens_t1: prom[1],
            off_t1: prom[2],
            tcs: prom[3],
            tco: prom[4],
            t_ref: prom[5],
            temp_sens: prom[6],
        }
    }

    pub fn from_coefficients(c: [u16; COEFFICIENT_COUNT]) -> Calibration {
        Calibration {
            sens_t1: c[0],
            off_t1: c[1],
            tcs: c[2],
            tco: c[3],
            t_ref: c[4],
            temp_sens: c[5],
        }
    }

    /// C1..C6 in datasheet order.
    pub fn coefficients(&self) -> [u16; COEFFICIENT_COUNT] {
        [
            self.sens_t1,
            self.off_t1,
            self.tcs,
            self.tco,
            self.t_ref,
            self.temp_sens,
        ]
    }

    /// Coefficient `C<index>`, `index` in `1..=6`.
    pub fn coefficient(&self, index: usize) -> Option<u16> {
        index
            .checked_sub(1)
            .and_then(|i| self.coefficients().get(i).copied())
    }

    /// Reads C1..C6 from PROM, one word per command.
    ///
    /// With `verify_crc` the manufacturer word and the CRC word are read as
    /// well and the whole image is checked against the stored CRC-4.
    pub(crate) fn load<B: Bus>(
        bus: &mut B,
        verify_crc: bool,
    ) -> Result<Self, DeviceError<B::Error>> {
        let mut prom = [0u16; PROM_WORDS as usize];
        let words = if verify_crc {
            0..PROM_WORDS
        } else {
            1..1 + COEFFICIENT_COUNT as u8
        };

        for index in words {
            prom[index as usize] = read_prom_word(bus, index)?;
        }

        if verify_crc {
            let expected = (prom[7] & 0x000F) as u8;
            let computed = crc4(&prom);
            if expected != computed {
                warn!("PROM CRC mismatch: stored {}, computed {}", expected, computed);
                return Err(DeviceError::InvalidCrc { expected, computed });
            }
        }

        let calibration = Calibration::new(&prom);
        debug!(
            "PROM loaded: C1={} C2={} C3={} C4={} C5={} C6={}",
            calibration.sens_t1,
            calibration.off_t1,
            calibration.tcs,
            calibration.tco,
            calibration.t_ref,
            calibration.temp_sens
        );

        Ok(calibration)
    }
}

fn read_prom_word<B: Bus>(bus: &mut B, index: u8) -> Result<u16, DeviceError<B::Error>> {
    let mut buf = [0u8; 2];
    read_exact(bus, Command::ReadProm(index), &mut buf)?;

    Ok(u16::from_be_bytes(buf))
}

/// CRC-4 over the PROM image as described in application note AN520.
///
/// The low byte of word 7 (which holds the CRC itself) is excluded.
pub fn crc4(prom: &[u16; 8]) -> u8 {
    let mut remainder: u16 = 0;

    for count in 0..16 {
        let mut word = prom[count >> 1];
        if count >> 1 == 7 {
            word &= 0xFF00;
        }
        remainder ^= if count % 2 == 1 { word & 0x00FF } else { word >> 8 };

        for _ in 0..8 {
            remainder = if remainder & 0x8000 != 0 {
                (remainder << 1) ^ 0x3000
            } else {
                remainder << 1
            };
        }
    }

    ((remainder >> 12) & 0x000F) as u8
}
