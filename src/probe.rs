use embedded_hal::adc::{Channel, OneShot};

use crate::reading::Reading;

/// Soil-moisture probe attached to one analog input channel.
///
/// Owns the channel marker and knows the converter's full-scale raw
/// value, so a raw sample can be normalized into the `0.0..=1.0`
/// fraction that [`Reading`] works with.
#[derive(Debug)]
pub struct MoistureProbe<Pin> {
    pin: Pin,
    full_scale: f32,
}

impl<Pin> MoistureProbe<Pin> {
    /// Returns a probe sampling through the given channel.
    ///
    /// `precision` is the converter resolution in bits (eg. `11` for
    /// the positive half of a 12-bit bipolar converter). A raw sample
    /// of `2^precision - 1` normalizes to exactly `1.0`.
    pub fn new(pin: Pin, precision: u32) -> Self {
        Self {
            pin,
            full_scale: (2u32.pow(precision) - 1) as f32,
        }
    }

    /// Destroys the probe and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    /// Samples the channel once and converts the result.
    ///
    /// Read errors from the converter propagate untouched; nothing is
    /// retried and the normalized value is not range-checked.
    ///
    /// # Examples
    ///
    /// ```
    /// use jordfugt::MoistureProbe;
    /// # use embedded_hal_mock::adc::{Mock, MockChan0, Transaction};
    /// #
    /// # let expectations: [Transaction<u16>; 1] = [Transaction::read(0, 2047)];
    /// # let mut adc = Mock::new(&expectations);
    ///
    /// let mut probe = MoistureProbe::new(MockChan0 {}, 12);
    ///
    /// // Half of full scale reads as half the reference voltage.
    /// let reading = nb::block!(probe.read(&mut adc)).unwrap();
    /// assert_eq!(reading.to_string(), "Spænding: 1.65 V → Jordfugt: 50.0 %");
    /// ```
    pub fn read<Adc, ADC, Word>(&mut self, adc: &mut Adc) -> nb::Result<Reading, Adc::Error>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
    {
        let raw: u32 = adc.read(&mut self.pin)?.into();

        Ok(Reading::from_ratio(raw as f32 / self.full_scale))
    }
}
