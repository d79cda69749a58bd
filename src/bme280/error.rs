/// Errors that can occur during BME280 operations
#[derive(Debug, thiserror_no_std::Error)]
pub enum Error<E> {
    /// I2C communication error, passed through from the bus unchanged
    #[error("I2C bus error: {0:?}")]
    Bus(E),

    /// The identity register did not hold the BME280 chip id
    #[error("No BME280 found (chip id {found:#04x}, expected 0x60)")]
    DeviceNotFound {
        /// Value read from the identity register
        found: u8,
    },

    /// The NVM calibration copy never finished after a soft reset
    #[error("Calibration copy still running after {attempts} status polls")]
    InitializationTimeout {
        /// Number of status register polls performed
        attempts: u32,
    },

    /// A measurement was requested before `init()` succeeded
    #[error("Sensor is not initialized")]
    NotInitialized,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Self::Bus(e)
    }
}
