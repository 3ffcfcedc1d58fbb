//! Trigger, wait and read back one ADC conversion.

use embedded_hal::delay::DelayNs;

use crate::bus::{read_exact, Bus};
use crate::command::Command;
use crate::error::DeviceError;
use crate::oversampling::{ConversionTiming, OversamplingRatio};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// D1
    Pressure,
    /// D2
    Temperature,
}

/// Progress of the current reading.
///
/// `Compensated` and `Failed` are terminal. After `Failed` nothing is retried;
/// the next read starts over from `Triggered`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    #[default]
    Idle,
    Triggered,
    Waiting,
    ReadComplete,
    Compensated,
    Failed,
}

pub(crate) struct ConversionController {
    pub oversampling_ratio: OversamplingRatio,
    pub timing: ConversionTiming,
    pub state: CycleState,
}

impl ConversionController {
    pub fn new(oversampling_ratio: OversamplingRatio, timing: ConversionTiming) -> Self {
        Self {
            oversampling_ratio,
            timing,
            state: CycleState::Idle,
        }
    }

    /// Runs one conversion on `channel` and returns the raw 24 bit word.
    ///
    /// The bus is held for the whole sequence; the conversion cannot be
    /// interrupted once triggered.
    pub fn convert<B: Bus, D: DelayNs>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        channel: Channel,
    ) -> Result<u32, DeviceError<B::Error>> {
        let result = self.run(bus, delay, channel);
        if result.is_err() {
            self.state = CycleState::Failed;
        }
        result
    }

    fn run<B: Bus, D: DelayNs>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        channel: Channel,
    ) -> Result<u32, DeviceError<B::Error>> {
        let ratio = self.oversampling_ratio;
        let trigger = match channel {
            Channel::Pressure => Command::D1Conversion(ratio),
            Channel::Temperature => Command::D2Conversion(ratio),
        };

        bus.send_command(trigger.value()).map_err(DeviceError::Io)?;
        self.state = CycleState::Triggered;

        let wait_ms = ratio.delay(self.timing);
        self.state = CycleState::Waiting;
        delay.delay_ms(wait_ms);

        let mut buf = [0u8; 3];
        read_exact(bus, Command::ReadAdc, &mut buf)?;
        self.state = CycleState::ReadComplete;

        let raw = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]);
        trace!("conversion {} done after {} ms: {}", trigger.value(), wait_ms, raw);

        Ok(raw)
    }
}
