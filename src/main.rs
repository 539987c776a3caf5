//! Sample soil moisture on analog input one and report it every two
//! seconds until interrupted.

use std::env;
use std::fmt;
use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use linux_embedded_hal::{Delay, I2cdev};
use log::info;
use simple_signal::{self, Signal};

use jordfugt::ads1015::{channel, Ads1015, PRECISION};
use jordfugt::{MoistureProbe, Sampler, SAMPLE_INTERVAL_MS};

/// I2C bus the breakout hangs off on the Pi.
const I2C_DEVICE: &str = "/dev/i2c-1";

/// Line-flushed standard output for the status lines.
struct Stdout;

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(s.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|_| fmt::Error)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| I2C_DEVICE.to_string());
    let i2c = I2cdev::new(&path).with_context(|| format!("unable to open {path}"))?;

    let mut adc = Ads1015::new(i2c);
    let mut probe = MoistureProbe::new(channel::A0, PRECISION);

    let running = Arc::new(AtomicBool::new(true));
    simple_signal::set_handler(&[Signal::Int, Signal::Term], {
        let running = running.clone();
        move |_signals| running.store(false, Ordering::SeqCst)
    });

    info!("sampling analog input one on {path} every {SAMPLE_INTERVAL_MS} ms");

    Sampler::new(&running)
        .run(&mut probe, &mut adc, &mut Delay, &mut Stdout)
        .map_err(|err| anyhow!("{err}"))
}
