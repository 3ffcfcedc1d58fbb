/// Oversampling Ratio
///
/// Higher ratios trade conversion time for resolution. The discriminant is
/// the level (0..=4) used to build the conversion command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OversamplingRatio {
    OSR256 = 0,
    OSR512 = 1,
    OSR1024 = 2,
    #[default]
    OSR2048 = 3,
    OSR4096 = 4,
}

/// How long the driver waits between triggering a conversion and reading it back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionTiming {
    /// `1 + 2 * level` milliseconds: 1 / 3 / 5 / 7 / 9 ms.
    #[default]
    Nominal,
    /// The nominal wait, stretched to the datasheet maximum conversion time
    /// rounded up to the next millisecond where that is longer:
    /// 1 / 3 / 5 / 7 / 10 ms.
    Datasheet,
}

impl OversamplingRatio {
    pub const ALL: [OversamplingRatio; 5] = [
        OversamplingRatio::OSR256,
        OversamplingRatio::OSR512,
        OversamplingRatio::OSR1024,
        OversamplingRatio::OSR2048,
        OversamplingRatio::OSR4096,
    ];

    /// Looks up the ratio for a level in `0..=4`.
    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.get(level as usize).copied()
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Offset added to the D1/D2 conversion base command.
    pub fn command_offset(&self) -> u8 {
        self.level() * 2
    }

    /// Worst-case ADC conversion time in MICROSECONDS.
    pub fn max_conversion_time_us(&self) -> u32 {
        // 0.60 / 1.17 / 2.28 / 4.54 / 9.04 ms
        match *self {
            OversamplingRatio::OSR256 => 600,
            OversamplingRatio::OSR512 => 1_170,
            OversamplingRatio::OSR1024 => 2_280,
            OversamplingRatio::OSR2048 => 4_540,
            OversamplingRatio::OSR4096 => 9_040,
        }
    }

    /// Gets the post-trigger delay in MILLISECONDS for the given timing policy.
    pub fn delay(&self, timing: ConversionTiming) -> u32 {
        match timing {
            ConversionTiming::Nominal => self.nominal_delay(),
            ConversionTiming::Datasheet => self
                .nominal_delay()
                .max(self.max_conversion_time_us().div_ceil(1_000)),
        }
    }

    fn nominal_delay(&self) -> u32 {
        1 + 2 * self.level() as u32
    }
}
