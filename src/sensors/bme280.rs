use crate::bme280::{Address, Bme280, Config, Error};
use crate::sensors::{SensorError, SensorReadings};

use super::Sensor;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{error, info};

/// Typed readings from the BME280 sensor.
/// This provides named access to sensor values and ensures type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BME280Readings {
    pub temperature_milli_celsius: i32,
    pub humidity_milli_percent: i32,
    /// 0 when the pressure formula is degenerate for this device
    pub pressure_pascal: i32,
}

impl SensorReadings<3> for BME280Readings {
    fn to_array(self) -> [i32; 3] {
        [
            self.temperature_milli_celsius,
            self.humidity_milli_percent,
            self.pressure_pascal,
        ]
    }
}

pub struct BME280Sensor<I, D> {
    sensor: Bme280<I, D>,
    initialized: bool,
}

impl<I: I2c, D: DelayNs> BME280Sensor<I, D> {
    pub fn new(i2c: I, delay: D, address: Address) -> Self {
        Self::with_config(i2c, delay, address, Config::default())
    }

    pub fn with_config(i2c: I, delay: D, address: Address, config: Config) -> Self {
        Self {
            sensor: Bme280::with_config(i2c, delay, address, config),
            initialized: false,
        }
    }

    /// Probe the chip, load its calibration and apply the configuration.
    /// This runs once, on the first read.
    fn initialize(&mut self) -> Result<(), SensorError> {
        self.sensor.init().map_err(|e| {
            error!("BME280 init failed: {}", e);
            match e {
                Error::DeviceNotFound { .. } => SensorError::NotFound {
                    sensor: "BME280",
                    details: "Chip id register did not read 0x60",
                },
                Error::InitializationTimeout { .. } => SensorError::Timeout {
                    sensor: "BME280",
                    operation: "wait for NVM calibration copy",
                },
                Error::Bus(_) | Error::NotInitialized => SensorError::InitializationFailed {
                    sensor: "BME280",
                    details: "I2C communication error",
                },
            }
        })?;

        info!("BME280: calibration loaded, sensor ready");

        self.initialized = true;

        Ok(())
    }

    /// Destroy the sensor and return the underlying driver
    pub fn into_inner(self) -> Bme280<I, D> {
        self.sensor
    }
}

impl<I: I2c, D: DelayNs> Sensor<3> for BME280Sensor<I, D> {
    type Readings = BME280Readings;

    fn read(&mut self) -> Result<BME280Readings, SensorError> {
        if !self.initialized {
            self.initialize()?;
        }

        let measurements = self.sensor.read_measurements().map_err(|e| {
            error!("BME280 measurement read failed: {}", e);
            SensorError::ReadFailed {
                sensor: "BME280",
                operation: "read temperature/pressure/humidity",
                details: "I2C communication error or sensor not responding",
            }
        })?;

        Ok(BME280Readings {
            temperature_milli_celsius: (measurements.temperature_celsius * 1000.0) as i32,
            humidity_milli_percent: (measurements.humidity_percent * 1000.0) as i32,
            pressure_pascal: (measurements.pressure_hpa * 100.0) as i32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bme280::fake::FakeBme280;
    use crate::bme280::registers::{ADDR_CHIP_ID, ADDR_RESET};
    use crate::sensors::{HUMIDITY, PRESSURE, TEMPERATURE};
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[test]
    fn test_first_read_initializes_sensor() {
        let mut fake = FakeBme280::datasheet();
        let mut sensor = BME280Sensor::new(&mut fake, NoopDelay::new(), Address::Primary);

        let readings = sensor.read().unwrap();
        sensor.read().unwrap();

        assert!((25079..=25080).contains(&readings.temperature_milli_celsius));
        assert!((54990..=55000).contains(&readings.humidity_milli_percent));
        assert!((100650..=100655).contains(&readings.pressure_pascal));

        let resets = fake.writes.iter().filter(|&&(reg, _)| reg == ADDR_RESET).count();
        assert_eq!(resets, 1, "initialized only once");
    }

    #[test]
    fn test_readings_array_layout() {
        let readings = BME280Readings {
            temperature_milli_celsius: 1,
            humidity_milli_percent: 2,
            pressure_pascal: 3,
        };
        let values = readings.to_array();

        assert_eq!(values[TEMPERATURE], 1);
        assert_eq!(values[HUMIDITY], 2);
        assert_eq!(values[PRESSURE], 3);
    }

    #[test]
    fn test_missing_chip_maps_to_not_found() {
        let mut fake = FakeBme280::datasheet();
        fake.regs[ADDR_CHIP_ID as usize] = 0x58;
        let mut sensor = BME280Sensor::new(&mut fake, NoopDelay::new(), Address::Primary);

        assert!(matches!(
            sensor.read(),
            Err(SensorError::NotFound { sensor: "BME280", .. })
        ));
        assert!(fake.writes.is_empty());
    }

    #[test]
    fn test_stuck_nvm_copy_maps_to_timeout() {
        let mut fake = FakeBme280::datasheet();
        fake.nvm_busy_polls = u32::MAX;
        let mut sensor = BME280Sensor::new(&mut fake, NoopDelay::new(), Address::Primary);

        assert!(matches!(sensor.read(), Err(SensorError::Timeout { .. })));
    }

    #[test]
    fn test_wrong_address_maps_to_initialization_failure() {
        let mut fake = FakeBme280::datasheet();
        let mut sensor = BME280Sensor::new(&mut fake, NoopDelay::new(), Address::Secondary);

        assert!(matches!(
            sensor.read(),
            Err(SensorError::InitializationFailed { .. })
        ));
    }
}
