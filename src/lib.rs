//! Soil-moisture sampling for an ADS1015-based analog breakout.
//!
//! A [`MoistureProbe`] normalizes raw conversions from one analog
//! channel into a full-scale fraction, [`Reading`] turns that fraction
//! into the reported voltage and moisture percentage, and [`Sampler`]
//! drives the fixed-cadence read-and-report loop until its running
//! flag is cleared.
//!
//! The probe works with any [`embedded_hal::adc::OneShot`] converter;
//! the [`ads1015`] module provides the driver for the converter on the
//! breakout itself.
#![cfg_attr(not(test), no_std)]

pub mod ads1015;
mod probe;
mod reading;
mod sampler;

pub use probe::MoistureProbe;
pub use reading::{Reading, VOLT_REF};
pub use sampler::{Error, Sampler, SAMPLE_INTERVAL_MS};
