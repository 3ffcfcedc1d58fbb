//! Transport to the sensor.
//!
//! The MS5611 speaks the same command set over I2C and SPI: a one byte
//! command, optionally followed by a big-endian response.

use embedded_hal::spi::Operation;

use crate::command::Command;
use crate::error::DeviceError;

/// 7 bit I2C address, selected by the CSB strap pin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum I2cAddress {
    /// CSB connected to GND.
    #[default]
    CsbLow = 0x77,
    /// CSB connected to VCC.
    CsbHigh = 0x76,
}

impl I2cAddress {
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}

pub trait Bus {
    type Error;

    /// Brings up the peripheral. Skipped when the bus is shared with other devices.
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Issues `command` and reads the response into `data`.
    ///
    /// Returns the number of bytes the device actually delivered.
    fn read_response(&mut self, command: u8, data: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    type Error = B::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        B::init(self)
    }

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        B::send_command(self, command)
    }

    fn read_response(&mut self, command: u8, data: &mut [u8]) -> Result<usize, Self::Error> {
        B::read_response(self, command, data)
    }
}

pub struct I2c<I2cType> {
    i2c: I2cType,
    address: u8,
}

impl<I2cType> I2c<I2cType>
where
    I2cType: embedded_hal::i2c::I2c,
{
    pub fn new(i2c: I2cType, address: I2cAddress) -> Self {
        Self {
            i2c,
            address: address.addr(),
        }
    }

    pub fn release(self) -> I2cType {
        self.i2c
    }
}

impl<I2cType> Bus for I2c<I2cType>
where
    I2cType: embedded_hal::i2c::I2c,
{
    type Error = <I2cType as embedded_hal::i2c::ErrorType>::Error;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[command])
    }

    fn read_response(&mut self, command: u8, data: &mut [u8]) -> Result<usize, Self::Error> {
        self.i2c.write_read(self.address, &[command], data)?;

        Ok(data.len())
    }
}

/// Clock speed must not exceed 20MHz. Accepts mode 0 or 3.
pub struct Spi<SpiType> {
    spi: SpiType,
}

impl<SpiType> Spi<SpiType>
where
    SpiType: embedded_hal::spi::SpiDevice,
{
    pub fn new(spi: SpiType) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SpiType {
        self.spi
    }
}

impl<SpiType> Bus for Spi<SpiType>
where
    SpiType: embedded_hal::spi::SpiDevice,
{
    type Error = <SpiType as embedded_hal::spi::ErrorType>::Error;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.spi.write(&[command])
    }

    fn read_response(&mut self, command: u8, data: &mut [u8]) -> Result<usize, Self::Error> {
        self.spi
            .transaction(&mut [Operation::Write(&[command]), Operation::Read(data)])?;

        Ok(data.len())
    }
}

/// Sends `command` and fills `data` with exactly `command.response_len()` bytes.
pub(crate) fn read_exact<B: Bus>(
    bus: &mut B,
    command: Command,
    data: &mut [u8],
) -> Result<(), DeviceError<B::Error>> {
    let expected = command.response_len();
    let received = bus
        .read_response(command.value(), &mut data[..expected])
        .map_err(DeviceError::Io)?;

    if received != expected {
        warn!(
            "command {} returned {} bytes, expected {}",
            command.value(),
            received,
            expected
        );
        return Err(DeviceError::ByteCount { expected, received });
    }

    Ok(())
}
