use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::blocking::delay::DelayMs;

use crate::probe::MoistureProbe;

/// Pause between consecutive samples (ms).
pub const SAMPLE_INTERVAL_MS: u16 = 2_000;

/// Farewell line written when the loop is asked to stop.
const FAREWELL: &str = "\nTest afbrudt.";

/// Failure inside the sampling loop.
#[derive(Debug)]
pub enum Error<E> {
    /// The analog read failed.
    Read(E),
    /// The status line could not be written to the sink.
    Output(fmt::Error),
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read(err) => write!(f, "analog read failed: {}", err),
            Error::Output(_) => f.write_str("writing status line failed"),
        }
    }
}

/// Fixed-cadence read-and-report loop over a [`MoistureProbe`].
#[derive(Debug)]
pub struct Sampler<'a> {
    running: &'a AtomicBool,
    interval_ms: u16,
}

impl<'a> Sampler<'a> {
    /// Returns a sampler that keeps going for as long as `running` is
    /// set. The flag is typically cleared from a signal handler.
    pub fn new(running: &'a AtomicBool) -> Self {
        Self {
            running,
            interval_ms: SAMPLE_INTERVAL_MS,
        }
    }

    /// Polls the probe until `running` is cleared, writing one status
    /// line per sample to `out`.
    ///
    /// The flag is checked again between the status line and the pause,
    /// and once more after the pause, so a stop requested mid-sleep
    /// ends the loop without another line being emitted. A requested
    /// stop writes the farewell line and returns `Ok(())`; a failed
    /// read or write returns the error immediately, farewell omitted.
    pub fn run<Pin, Word, Adc, ADC, D, W>(
        &self,
        probe: &mut MoistureProbe<Pin>,
        adc: &mut Adc,
        delay: &mut D,
        out: &mut W,
    ) -> Result<(), Error<Adc::Error>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        D: DelayMs<u16>,
        W: Write,
    {
        while self.running.load(Ordering::SeqCst) {
            let reading = nb::block!(probe.read(adc)).map_err(Error::Read)?;
            writeln!(out, "{}", reading).map_err(Error::Output)?;

            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            delay.delay_ms(self.interval_ms);
        }

        writeln!(out, "{}", FAREWELL).map_err(Error::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::{
        adc::{Mock, MockChan0, Transaction},
        common::Generic,
        MockError,
    };
    use std::io::ErrorKind;

    /// Delay double that records every pause and clears the running
    /// flag after a set number of them, standing in for an interrupt
    /// arriving mid-sleep.
    struct InterruptAfter<'a> {
        running: &'a AtomicBool,
        pauses_left: u32,
        recorded: Vec<u16>,
    }

    impl<'a> InterruptAfter<'a> {
        fn new(running: &'a AtomicBool, pauses: u32) -> Self {
            Self {
                running,
                pauses_left: pauses,
                recorded: Vec::new(),
            }
        }
    }

    impl DelayMs<u16> for InterruptAfter<'_> {
        fn delay_ms(&mut self, ms: u16) {
            self.recorded.push(ms);
            self.pauses_left -= 1;
            if self.pauses_left == 0 {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn probe() -> MoistureProbe<MockChan0> {
        MoistureProbe::new(MockChan0 {}, 12)
    }

    fn adc(expectations: &[Transaction<u16>]) -> Generic<Transaction<u16>> {
        Mock::new(expectations)
    }

    #[test]
    fn reports_until_interrupted_mid_sleep() {
        let running = AtomicBool::new(true);
        let mut probe = probe();
        let mut adc = adc(&[Transaction::read(0, 0), Transaction::read(0, 4095)]);
        let mut delay = InterruptAfter::new(&running, 2);
        let mut out = String::new();

        Sampler::new(&running)
            .run(&mut probe, &mut adc, &mut delay, &mut out)
            .unwrap();

        assert_eq!(
            out,
            concat!(
                "Spænding: 0.00 V → Jordfugt: 0.0 %\n",
                "Spænding: 3.30 V → Jordfugt: 100.0 %\n",
                "\nTest afbrudt.\n",
            )
        );
    }

    #[test]
    fn pauses_for_the_full_interval_between_samples() {
        let running = AtomicBool::new(true);
        let mut probe = probe();
        let transactions: Vec<_> = (0..3).map(|_| Transaction::read(0, 2047)).collect();
        let mut adc = adc(&transactions);
        let mut delay = InterruptAfter::new(&running, 3);
        let mut out = String::new();

        Sampler::new(&running)
            .run(&mut probe, &mut adc, &mut delay, &mut out)
            .unwrap();

        assert_eq!(delay.recorded, [SAMPLE_INTERVAL_MS; 3]);
    }

    #[test]
    fn keeps_sampling_until_stopped() {
        let running = AtomicBool::new(true);
        let mut probe = probe();
        let transactions: Vec<_> = (0..25).map(|_| Transaction::read(0, 2047)).collect();
        let mut adc = adc(&transactions);
        let mut delay = InterruptAfter::new(&running, 25);
        let mut out = String::new();

        Sampler::new(&running)
            .run(&mut probe, &mut adc, &mut delay, &mut out)
            .unwrap();

        assert_eq!(out.matches("Jordfugt").count(), 25);
        assert!(out.ends_with("\nTest afbrudt.\n"));
    }

    #[test]
    fn stop_before_first_sample_writes_only_the_farewell() {
        let running = AtomicBool::new(false);
        let mut probe = probe();
        let mut adc = adc(&[]);
        let mut delay = InterruptAfter::new(&running, 1);
        let mut out = String::new();

        Sampler::new(&running)
            .run(&mut probe, &mut adc, &mut delay, &mut out)
            .unwrap();

        assert_eq!(out, "\nTest afbrudt.\n");
        assert!(delay.recorded.is_empty());
    }

    #[test]
    fn read_failure_aborts_without_farewell() {
        let running = AtomicBool::new(true);
        let mut probe = probe();
        let mut adc =
            adc(&[Transaction::read(0, 0).with_error(MockError::Io(ErrorKind::InvalidData))]);
        let mut delay = InterruptAfter::new(&running, 1);
        let mut out = String::new();

        let result = Sampler::new(&running).run(&mut probe, &mut adc, &mut delay, &mut out);

        assert!(matches!(result, Err(Error::Read(_))));
        assert!(out.is_empty());
    }
}
