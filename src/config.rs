use crate::compensation::CompensationOrder;
use crate::oversampling::{ConversionTiming, OversamplingRatio};

/// Lower bound for the wait between reset and the first PROM read.
pub const MIN_RESET_SETTLE_MS: u32 = 10;

#[derive(Clone, Copy, Debug)]
pub struct Configuration {
    pub(crate) oversampling_ratio: OversamplingRatio,
    pub(crate) timing: ConversionTiming,
    pub(crate) compensation: CompensationOrder,
    pub(crate) settle_time_ms: u32,
    pub(crate) verify_crc: bool,
    pub(crate) temperature_refresh_ms: Option<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            oversampling_ratio: OversamplingRatio::OSR2048,
            timing: ConversionTiming::Nominal,
            compensation: CompensationOrder::FirstOrder,
            settle_time_ms: 100,
            verify_crc: false,
            temperature_refresh_ms: None,
        }
    }
}

impl Configuration {
    pub fn oversampling_ratio(mut self, ratio: OversamplingRatio) -> Self {
        self.oversampling_ratio = ratio;

        self
    }

    pub fn conversion_timing(mut self, timing: ConversionTiming) -> Self {
        self.timing = timing;

        self
    }

    pub fn compensation(mut self, order: CompensationOrder) -> Self {
        self.compensation = order;

        self
    }

    /// Time to wait after a reset before the PROM is read. Clamped to
    /// [`MIN_RESET_SETTLE_MS`].
    pub fn settle_time_ms(mut self, ms: u32) -> Self {
        self.settle_time_ms = ms.max(MIN_RESET_SETTLE_MS);

        self
    }

    /// Also read PROM words 0 and 7 during calibration and check the CRC-4.
    pub fn verify_crc(mut self, enable: bool) -> Self {
        self.verify_crc = enable;

        self
    }

    /// Lets `read_pressure_cached` reuse a temperature younger than `window_ms`.
    ///
    /// A change of 1 °C shifts pressure by roughly 2 hPa, so keep the window short.
    /// `None` refreshes the temperature on every pressure reading.
    pub fn temperature_refresh_ms(mut self, window_ms: Option<u32>) -> Self {
        self.temperature_refresh_ms = window_ms;

        self
    }
}
