use serde::{Deserialize, Serialize};

/// Temperature at which scale lengths are defined, in °C.
pub const REFERENCE_TEMPERATURE_C: f64 = 20.0;

/// Length correction to add to `length` measured `delta_t` kelvin away from
/// the reference temperature. Same unit as `length`.
pub fn thermal_correction(length: f64, alpha: f64, delta_t: f64) -> f64 {
    -(alpha * length * delta_t)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalExpansion {
    /// Linear expansion coefficient, 1/K.
    pub alpha: f64,
    /// Sample temperature during the scan, °C.
    pub sample_temperature: f64,
}

impl ThermalExpansion {
    pub fn new(alpha: f64, sample_temperature: f64) -> Self {
        Self {
            alpha,
            sample_temperature,
        }
    }

    pub fn delta_t(&self) -> f64 {
        self.sample_temperature - REFERENCE_TEMPERATURE_C
    }

    pub fn correction(&self, length: f64) -> f64 {
        thermal_correction(length, self.alpha, self.delta_t())
    }
}
