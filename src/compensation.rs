//! Fixed-point compensation of the raw ADC words.
//!
//! All intermediates are `i64` and every power-of-two scaling is a signed
//! integer division, which truncates toward zero. Shifting signed values is
//! avoided on purpose: `>>` floors, and for negative `dT` the two differ.
//!
//! Pressure compensation consumes the `dT` of a temperature computation. The
//! only way to obtain one is [`compute_temperature`], and [`compute_pressure`]
//! takes the resulting [`Temperature`] by argument.

use crate::calibration::Calibration;

/// First order follows the datasheet's basic formulas. Second order
/// additionally corrects readings below 20 °C.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompensationOrder {
    #[default]
    FirstOrder,
    SecondOrder,
}

/// A compensated temperature together with the `dT` it was computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    d_t: i64,
    first_order: i32,
    centi_celsius: i32,
    order: CompensationOrder,
}

impl Temperature {
    /// Temperature in hundredths of a degree Celsius.
    pub fn centi_celsius(&self) -> i32 {
        self.centi_celsius
    }

    pub fn celsius(&self) -> f32 {
        self.centi_celsius as f32 / 100.0
    }

    /// Difference between actual and reference temperature, `D2 - C5 * 2^8`.
    pub fn delta(&self) -> i64 {
        self.d_t
    }

    pub fn order(&self) -> CompensationOrder {
        self.order
    }
}

/// Computes TEMP (-40.00..85.00 °C with 0.01 °C resolution) from the raw `d2` word.
pub fn compute_temperature(
    d2: u32,
    calibration: &Calibration,
    order: CompensationOrder,
) -> Temperature {
    let d_t = d2 as i64 - calibration.t_ref as i64 * 256;
    // |dT * C6| < 2^40, the quotient always fits an i32
    let first_order = (2000 + d_t * calibration.temp_sens as i64 / 8_388_608) as i32;

    let centi_celsius = match order {
        CompensationOrder::FirstOrder => first_order,
        CompensationOrder::SecondOrder if first_order < 2000 => {
            first_order - (d_t * d_t / 2_147_483_648) as i32
        }
        CompensationOrder::SecondOrder => first_order,
    };

    Temperature {
        d_t,
        first_order,
        centi_celsius,
        order,
    }
}

/// Computes P (10..1200 mbar with 0.01 mbar resolution) from the raw `d1`
/// word and the temperature of the same reading.
pub fn compute_pressure(d1: u32, temperature: &Temperature, calibration: &Calibration) -> i32 {
    let d_t = temperature.d_t;

    // Offset at actual temperature
    let mut off = calibration.off_t1 as i64 * 65_536 + calibration.tco as i64 * d_t / 128;
    // Sensitivity at actual temperature
    let mut sens = calibration.sens_t1 as i64 * 32_768 + calibration.tcs as i64 * d_t / 256;

    if temperature.order == CompensationOrder::SecondOrder {
        let (off2, sens2) = second_order_offsets(temperature.first_order);
        off -= off2;
        sens -= sens2;
    }

    ((d1 as i64 * sens / 2_097_152 - off) / 32_768) as i32
}

/// OFF2 and SENS2 for a first order temperature below 20 °C, zero above.
fn second_order_offsets(temp: i32) -> (i64, i64) {
    if temp >= 2000 {
        return (0, 0);
    }

    let low = (temp as i64 - 2000).pow(2);
    let mut off2 = 5 * low / 2;
    let mut sens2 = 5 * low / 4;

    if temp < -1500 {
        let very_low = (temp as i64 + 1500).pow(2);
        off2 += 7 * very_low;
        sens2 += 11 * very_low / 2;
    }

    (off2, sens2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::REFERENCE_COEFFICIENTS;

    const D1: u32 = 9_085_466;
    const D2: u32 = 8_569_150;

    fn calibration() -> Calibration {
        Calibration::from_coefficients(REFERENCE_COEFFICIENTS)
    }

    #[test]
    fn check_temp_compensation() {
        let temperature = compute_temperature(D2, &calibration(), CompensationOrder::FirstOrder);

        assert_eq!(temperature.delta(), 2366);
        assert_eq!(temperature.centi_celsius(), 2007);
    }

    #[test]
    fn check_pressure_compensation() {
        let calibration = calibration();
        let temperature = compute_temperature(D2, &calibration, CompensationOrder::FirstOrder);

        assert_eq!(compute_pressure(D1, &temperature, &calibration), 100_009);
    }

    #[test]
    fn temperature_is_deterministic() {
        let calibration = calibration();
        let a = compute_temperature(D2, &calibration, CompensationOrder::FirstOrder);
        let b = compute_temperature(D2, &calibration, CompensationOrder::FirstOrder);
        assert_eq!(a, b);
    }

    #[test]
    fn negative_delta_truncates_toward_zero() {
        // dT = -1566784, dT * C6 / 2^23 = -5287.4...
        let temperature =
            compute_temperature(7_000_000, &calibration(), CompensationOrder::FirstOrder);

        assert_eq!(temperature.delta(), -1_566_784);
        assert_eq!(temperature.centi_celsius(), -3287);
        assert_eq!(compute_pressure(D1, &temperature, &calibration()), 89_823);
    }

    #[test]
    fn second_order_is_identity_above_20c() {
        let calibration = calibration();
        let first = compute_temperature(D2, &calibration, CompensationOrder::FirstOrder);
        let second = compute_temperature(D2, &calibration, CompensationOrder::SecondOrder);

        assert_eq!(first.centi_celsius(), second.centi_celsius());
        assert_eq!(
            compute_pressure(D1, &first, &calibration),
            compute_pressure(D1, &second, &calibration)
        );
    }

    #[test]
    fn second_order_low_temperature() {
        let calibration = calibration();
        let temperature =
            compute_temperature(8_200_000, &calibration, CompensationOrder::SecondOrder);

        // TEMP = 763, T2 = 62
        assert_eq!(temperature.centi_celsius(), 701);
        assert_eq!(compute_pressure(D1, &temperature, &calibration), 97_476);
    }

    #[test]
    fn second_order_very_low_temperature() {
        let calibration = calibration();
        let temperature =
            compute_temperature(7_000_000, &calibration, CompensationOrder::SecondOrder);

        // TEMP = -3287, T2 = 1143
        assert_eq!(temperature.centi_celsius(), -4430);
        assert_eq!(compute_pressure(D1, &temperature, &calibration), 85_696);
    }

    #[test]
    fn second_order_offsets_by_range() {
        assert_eq!(second_order_offsets(2000), (0, 0));
        assert_eq!(second_order_offsets(763), (3_825_422, 1_912_711));
        assert_eq!(second_order_offsets(-3287), (92_234_505, 52_503_990));
    }
}
