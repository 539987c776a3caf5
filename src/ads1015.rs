//! Driver for the TI ADS1015 converter on the analog breakout.
//!
//! Only what the sampler needs is implemented: single-shot,
//! single-ended conversions on one of the four inputs, exposed through
//! [`embedded_hal::adc::OneShot`]. Continuous mode, differential pairs
//! and the comparator are left untouched.

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::blocking::i2c::{Write, WriteRead};

/// Factory-default slave address (ADDR pin tied to ground).
pub const DEFAULT_ADDRESS: u8 = 0x48;

/// Usable resolution of a single-ended conversion in bits.
///
/// The converter is 12-bit bipolar; a single-ended input only ever
/// sees the positive half of that range.
pub const PRECISION: u32 = 11;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

/// Start a conversion; reads back as the conversion-done flag.
const OS: u16 = 0x8000;
/// Single-ended multiplexer base (AINx against GND).
const MUX_SINGLE: u16 = 0x4000;
/// ±4.096 V full-scale range.
const PGA_4V096: u16 = 0x0200;
/// Power-down single-shot mode.
const MODE_SINGLE: u16 = 0x0100;
/// 1600 samples per second.
const DR_1600SPS: u16 = 0x0080;
/// Comparator disabled.
const COMP_DISABLE: u16 = 0x0003;

/// Marker types for the four single-ended inputs.
pub mod channel {
    /// Input AIN0, wired to the breakout's analog input one.
    #[derive(Debug)]
    pub struct A0;
    /// Input AIN1.
    #[derive(Debug)]
    pub struct A1;
    /// Input AIN2.
    #[derive(Debug)]
    pub struct A2;
    /// Input AIN3.
    #[derive(Debug)]
    pub struct A3;
}

macro_rules! ads1015_channel {
    ($pin:ty, $id:expr) => {
        impl<I2C> Channel<Ads1015<I2C>> for $pin {
            type ID = u8;

            fn channel() -> u8 {
                $id
            }
        }
    };
}

ads1015_channel!(channel::A0, 0);
ads1015_channel!(channel::A1, 1);
ads1015_channel!(channel::A2, 2);
ads1015_channel!(channel::A3, 3);

/// Provides access to an ADS1015 A/D converter over I2C.
#[derive(Debug)]
pub struct Ads1015<I2C> {
    i2c: I2C,
    address: u8,
    converting: bool,
}

impl<I2C> Ads1015<I2C> {
    /// Returns a driver on the factory-default address.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Returns a driver on an alternative strapped address.
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            converting: false,
        }
    }

    /// Destroys the driver and returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Ads1015<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    fn start_conversion(&mut self, channel: u8) -> Result<(), E> {
        let config = OS
            | MUX_SINGLE
            | (u16::from(channel) << 12)
            | PGA_4V096
            | MODE_SINGLE
            | DR_1600SPS
            | COMP_DISABLE;

        self.i2c
            .write(self.address, &[REG_CONFIG, (config >> 8) as u8, config as u8])
    }

    fn conversion_ready(&mut self) -> Result<bool, E> {
        let mut raw = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_CONFIG], &mut raw)?;

        Ok(raw[0] & (OS >> 8) as u8 != 0)
    }

    fn conversion_result(&mut self) -> Result<u16, E> {
        let mut raw = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_CONVERSION], &mut raw)?;

        // The 12-bit result is left-aligned and two's complement;
        // single-ended readings below ground clamp to zero.
        Ok((i16::from_be_bytes(raw) >> 4).max(0) as u16)
    }
}

impl<I2C, E, PIN> OneShot<Ads1015<I2C>, u16, PIN> for Ads1015<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    PIN: Channel<Ads1015<I2C>, ID = u8>,
{
    type Error = E;

    /// Starts a conversion on the first call and keeps returning
    /// `WouldBlock` until the converter reports completion.
    fn read(&mut self, _pin: &mut PIN) -> nb::Result<u16, E> {
        if !self.converting {
            self.start_conversion(PIN::channel())?;
            self.converting = true;
            return Err(nb::Error::WouldBlock);
        }

        if !self.conversion_ready()? {
            return Err(nb::Error::WouldBlock);
        }

        self.converting = false;
        Ok(self.conversion_result()?)
    }
}
