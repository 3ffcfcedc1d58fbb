//! Platform agnostic driver for the MS5611-01BA barometric pressure sensor.
//!
//! The sensor is driven through a blocking command protocol: reset, read the
//! six factory calibration coefficients from PROM, then for every reading
//! trigger a conversion, wait for it to finish and read back the 24 bit
//! result. Temperature is always converted before pressure, since pressure
//! compensation depends on it.
//!
//! Readings are fixed point: temperature in hundredths of a degree Celsius,
//! pressure in hundredths of a millibar.
//!
//! ```no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use ms5611_baro::{Configuration, DeviceError, I2cAddress, Ms5611, OversamplingRatio};
//!
//! fn altitude_source<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Result<i32, DeviceError<I::Error>> {
//!     let config = Configuration::default().oversampling_ratio(OversamplingRatio::OSR4096);
//!     let mut barometer = Ms5611::new_i2c(i2c, I2cAddress::CsbLow, delay, config);
//!     barometer.initialize(false)?;
//!     barometer.read_pressure()
//! }
//! ```
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod bus;
mod calibration;
mod command;
mod compensation;
pub mod config;
mod conversion;
mod error;
mod oversampling;
#[cfg(test)]
mod testing;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

pub use bus::{Bus, I2cAddress};
pub use calibration::{crc4, Calibration, COEFFICIENT_COUNT};
pub use compensation::{compute_pressure, compute_temperature, CompensationOrder, Temperature};
pub use config::Configuration;
pub use conversion::{Channel, CycleState};
pub use error::DeviceError;
pub use oversampling::{ConversionTiming, OversamplingRatio};

use command::Command;
use conversion::ConversionController;

/// One temperature and pressure pair from the same reading cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Hundredths of a degree Celsius.
    pub temperature: i32,
    /// Hundredths of a millibar.
    pub pressure: i32,
}

impl Reading {
    pub fn celsius(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    pub fn mbar(&self) -> f32 {
        self.pressure as f32 / 100.0
    }
}

pub struct Ms5611<B, D> {
    bus: B,
    delay: D,
    calibration: Option<Calibration>, // None until the PROM has been read after a reset
    controller: ConversionController,
    config: Configuration,
    last_temperature: Option<Temperature>,
    last_pressure: Option<i32>,
    // Temperature plus the caller supplied timestamp it was taken at
    cached_temperature: Option<(Temperature, u32)>,
}

impl<I2cType, D> Ms5611<bus::I2c<I2cType>, D>
where
    I2cType: embedded_hal::i2c::I2c,
    D: DelayNs,
{
    pub fn new_i2c(i2c: I2cType, address: I2cAddress, delay: D, config: Configuration) -> Self {
        Self::new(bus::I2c::new(i2c, address), delay, config)
    }
}

impl<SpiType, D> Ms5611<bus::Spi<SpiType>, D>
where
    SpiType: SpiDevice,
    D: DelayNs,
{
    pub fn new_spi(spi: SpiType, delay: D, config: Configuration) -> Self {
        Self::new(bus::Spi::new(spi), delay, config)
    }
}

impl<B, D> Ms5611<B, D>
where
    B: Bus,
    D: DelayNs,
{
    /// Creates the driver without touching the bus. Call [`initialize`](Self::initialize)
    /// before reading compensated values.
    pub fn new(bus: B, delay: D, config: Configuration) -> Self {
        Self {
            bus,
            delay,
            calibration: None,
            controller: ConversionController::new(config.oversampling_ratio, config.timing),
            config,
            last_temperature: None,
            last_pressure: None,
            cached_temperature: None,
        }
    }

    /// Resets the device and loads its calibration.
    ///
    /// Pass `shared_bus = true` when other devices live on the same bus and
    /// the peripheral has already been brought up elsewhere. Access to a shared
    /// bus must be serialized by the caller.
    pub fn initialize(&mut self, shared_bus: bool) -> Result<(), DeviceError<B::Error>> {
        if !shared_bus {
            self.bus.init().map_err(DeviceError::Io)?;
        }

        self.reset()?;
        self.calibrate()?;

        Ok(())
    }

    /// Sends the reset command and waits for the device to reload its PROM.
    ///
    /// Discards the loaded calibration and every cached reading.
    pub fn reset(&mut self) -> Result<(), DeviceError<B::Error>> {
        self.calibration = None;
        self.last_temperature = None;
        self.last_pressure = None;
        self.cached_temperature = None;
        self.controller.state = CycleState::Idle;

        self.bus
            .send_command(Command::Reset.value())
            .map_err(DeviceError::Io)?;
        self.delay.delay_ms(self.config.settle_time_ms);
        debug!("reset, settled for {} ms", self.config.settle_time_ms);

        Ok(())
    }

    /// Every module is individually factory calibrated at two temperatures and two pressures.
    /// As a result, 6 coefficients necessary to compensate for process variations and
    /// temperature variations are calculated and stored in the 128-bit PROM of each module.
    /// These must be read before converting D1 and D2 into compensated pressure and
    /// temperature.
    ///
    /// Only needs to be called once after a reset; [`initialize`](Self::initialize) does it
    /// for you.
    pub fn calibrate(&mut self) -> Result<Calibration, DeviceError<B::Error>> {
        let calibration = Calibration::load(&mut self.bus, self.config.verify_crc)?;
        self.calibration = Some(calibration);

        Ok(calibration)
    }

    /// The loaded calibration coefficients.
    pub fn calibration(&self) -> Result<Calibration, DeviceError<B::Error>> {
        self.calibration.ok_or(DeviceError::Uncalibrated)
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn set_oversampling_ratio(&mut self, ratio: OversamplingRatio) {
        self.controller.oversampling_ratio = ratio;
    }

    pub fn oversampling_ratio(&self) -> OversamplingRatio {
        self.controller.oversampling_ratio
    }

    /// Where the most recent reading got to.
    pub fn cycle_state(&self) -> CycleState {
        self.controller.state
    }

    /// Uncompensated temperature word D2.
    pub fn read_raw_temperature(&mut self) -> Result<u32, DeviceError<B::Error>> {
        self.controller
            .convert(&mut self.bus, &mut self.delay, Channel::Temperature)
    }

    /// Uncompensated pressure word D1.
    pub fn read_raw_pressure(&mut self) -> Result<u32, DeviceError<B::Error>> {
        self.controller
            .convert(&mut self.bus, &mut self.delay, Channel::Pressure)
    }

    /// Converts and compensates a temperature, in hundredths of a degree Celsius.
    ///
    /// Does not feed the cache used by [`read_pressure_cached`](Self::read_pressure_cached);
    /// use [`read_temperature_at`](Self::read_temperature_at) for that.
    pub fn read_temperature(&mut self) -> Result<i32, DeviceError<B::Error>> {
        let calibration = self.calibration()?;
        let temperature = self.temperature_cycle(&calibration)?;

        Ok(temperature.centi_celsius())
    }

    /// Same as [`read_temperature`](Self::read_temperature), and remembers the
    /// result as taken at `now_ms` for [`read_pressure_cached`](Self::read_pressure_cached).
    pub fn read_temperature_at(&mut self, now_ms: u32) -> Result<i32, DeviceError<B::Error>> {
        let calibration = self.calibration()?;
        let temperature = self.temperature_cycle(&calibration)?;
        self.cached_temperature = Some((temperature, now_ms));

        Ok(temperature.centi_celsius())
    }

    /// Converts a fresh temperature, then pressure, and returns the compensated
    /// pressure in hundredths of a millibar.
    pub fn read_pressure(&mut self) -> Result<i32, DeviceError<B::Error>> {
        Ok(self.read_sample()?.pressure)
    }

    /// Temperature and pressure from one cycle.
    pub fn read_sample(&mut self) -> Result<Reading, DeviceError<B::Error>> {
        let calibration = self.calibration()?;
        let temperature = self.temperature_cycle(&calibration)?;
        let pressure = self.pressure_cycle(&temperature, &calibration)?;

        Ok(Reading {
            temperature: temperature.centi_celsius(),
            pressure,
        })
    }

    /// Like [`read_pressure`](Self::read_pressure), but reuses a temperature
    /// taken less than [`Configuration::temperature_refresh_ms`] before `now_ms`.
    ///
    /// `now_ms` comes from any free running millisecond counter; wrap-around is handled.
    pub fn read_pressure_cached(&mut self, now_ms: u32) -> Result<i32, DeviceError<B::Error>> {
        let calibration = self.calibration()?;

        let temperature = match (self.config.temperature_refresh_ms, self.cached_temperature) {
            (Some(window), Some((temperature, taken_at)))
                if now_ms.wrapping_sub(taken_at) < window =>
            {
                trace!("reusing temperature taken at {} ms", taken_at);
                temperature
            }
            _ => {
                let temperature = self.temperature_cycle(&calibration)?;
                self.cached_temperature = Some((temperature, now_ms));
                temperature
            }
        };

        self.pressure_cycle(&temperature, &calibration)
    }

    /// Most recent compensated temperature, if any since the last reset.
    pub fn last_temperature(&self) -> Option<Temperature> {
        self.last_temperature
    }

    /// Most recent compensated pressure, if any since the last reset.
    pub fn last_pressure(&self) -> Option<i32> {
        self.last_pressure
    }

    /// Destroys the driver, giving back the bus and the delay.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    fn temperature_cycle(
        &mut self,
        calibration: &Calibration,
    ) -> Result<Temperature, DeviceError<B::Error>> {
        let d2 = self.read_raw_temperature()?;
        let temperature = compute_temperature(d2, calibration, self.config.compensation);
        self.controller.state = CycleState::Compensated;
        self.last_temperature = Some(temperature);

        Ok(temperature)
    }

    fn pressure_cycle(
        &mut self,
        temperature: &Temperature,
        calibration: &Calibration,
    ) -> Result<i32, DeviceError<B::Error>> {
        let d1 = self.read_raw_pressure()?;
        let pressure = compute_pressure(d1, temperature, calibration);
        self.controller.state = CycleState::Compensated;
        self.last_pressure = Some(pressure);

        Ok(pressure)
    }
}
