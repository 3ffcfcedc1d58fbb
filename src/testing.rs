use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;

use crate::bus::Bus;

/// C1..C6 of the datasheet example.
pub const REFERENCE_COEFFICIENTS: [u16; 6] = [40127, 36924, 23317, 23282, 33464, 28312];

/// Full PROM image around [`REFERENCE_COEFFICIENTS`] with a valid CRC-4 (0xE).
pub const REFERENCE_PROM: [u16; 8] = [0x0030, 40127, 36924, 23317, 23282, 33464, 28312, 0x000E];

/// Scripted sensor: serves PROM words and queued ADC results, logs every command.
pub struct FakeBus {
    prom: [u16; 8],
    adc: VecDeque<u32>,
    short_adc_read: Option<usize>,
    short_prom_read: Option<usize>,
    pub initialized: bool,
    pub commands: Vec<u8>,
}

impl FakeBus {
    pub fn new(prom: [u16; 8]) -> Self {
        FakeBus {
            prom,
            adc: VecDeque::new(),
            short_adc_read: None,
            short_prom_read: None,
            initialized: false,
            commands: Vec::new(),
        }
    }

    pub fn with_adc(mut self, values: &[u32]) -> Self {
        self.adc.extend(values);
        self
    }

    /// Report `len` delivered bytes for every ADC read.
    pub fn with_short_adc_read(mut self, len: usize) -> Self {
        self.short_adc_read = Some(len);
        self
    }

    pub fn with_short_prom_read(mut self, len: usize) -> Self {
        self.short_prom_read = Some(len);
        self
    }

    /// Commands sent, excluding PROM reads.
    pub fn conversion_commands(&self) -> Vec<u8> {
        self.commands
            .iter()
            .copied()
            .filter(|c| !(0xA0..=0xAE).contains(c))
            .collect()
    }
}

impl Bus for FakeBus {
    type Error = ();

    fn init(&mut self) -> Result<(), Self::Error> {
        self.initialized = true;
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.commands.push(command);
        Ok(())
    }

    fn read_response(&mut self, command: u8, data: &mut [u8]) -> Result<usize, Self::Error> {
        self.commands.push(command);
        match command {
            0x00 => {
                let value = self.adc.pop_front().expect("no ADC value queued");
                data.copy_from_slice(&value.to_be_bytes()[1..]);
                Ok(self.short_adc_read.unwrap_or(data.len()))
            }
            0xA0..=0xAE => {
                let word = self.prom[((command - 0xA0) / 2) as usize];
                data.copy_from_slice(&word.to_be_bytes());
                Ok(self.short_prom_read.unwrap_or(data.len()))
            }
            _ => panic!("unexpected read command {:#x}", command),
        }
    }
}

/// Records every requested delay.
#[derive(Default)]
pub struct RecordingDelay {
    pub delays_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}
