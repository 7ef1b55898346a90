//! Foundational types for line-scale reduction.
//!
//! ## Profiles
//! A scan is a set of [`IntensityProfile`]s: probe positions in a calibrated
//! length unit paired with integer brightness counts. Profiles are carried
//! even when malformed so a caller can count and skip them.
//!
//! ## Statistics
//! [`RunningStatistic`] keeps a constant-size Welford accumulator, so per-mark
//! statistics never store the raw samples.
//!
//! ## Thermal Correction
//! Lengths are referred to 20 °C using a linear expansion coefficient.

mod error;
mod profile;
mod stats;
mod thermal;

pub use error::Error;
pub use profile::IntensityProfile;
pub use stats::RunningStatistic;
pub use thermal::{REFERENCE_TEMPERATURE_C, ThermalExpansion, thermal_correction};
