//! Sensor abstraction shared by the drivers in this crate.
//!
//! Readings are stored as fixed-point `i32` values (milli-units unless the
//! field name says otherwise) so they can be logged or aggregated without
//! floating point.

#[cfg(feature = "sensor-bme280")]
mod bme280;

use thiserror_no_std::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("{sensor} initialization failed: {details}")]
    InitializationFailed {
        sensor: &'static str,
        details: &'static str,
    },

    #[error("{sensor} not found: {details}")]
    NotFound {
        sensor: &'static str,
        details: &'static str,
    },

    #[error("{sensor} failed to {operation}: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },

    #[error("{sensor} timed out during {operation}")]
    Timeout {
        sensor: &'static str,
        operation: &'static str,
    },
}

/// Trait for sensor reading data structures.
/// Provides compile-time guarantees about the number of values and their conversion to arrays.
pub trait SensorReadings<const COUNT: usize> {
    /// Convert the readings into a fixed-size array.
    fn to_array(self) -> [i32; COUNT];
}

/// Trait for sensors that produce typed readings.
pub trait Sensor<const COUNT: usize> {
    /// The type of readings this sensor produces.
    type Readings: SensorReadings<COUNT>;

    /// Read the sensor and return typed readings.
    fn read(&mut self) -> Result<Self::Readings, SensorError>;
}

pub mod indices {
    // Positions inside `SensorReadings::to_array` for the BME280
    pub const TEMPERATURE: usize = 0;
    pub const HUMIDITY: usize = 1;
    pub const PRESSURE: usize = 2;
}

pub use indices::*;

#[cfg(feature = "sensor-bme280")]
pub use bme280::{BME280Readings, BME280Sensor};
