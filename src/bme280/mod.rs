//! Register-level driver for the Bosch BME280 humidity, pressure and
//! temperature sensor on I2C.
//!
//! The driver takes any blocking [`embedded_hal::i2c::I2c`] implementation.
//! Pass `&mut bus` to keep ownership of the bus, or an `embedded-hal-bus`
//! device (`RefCellDevice`, `CriticalSectionDevice`) when the bus is shared
//! with other peripherals. The driver does no locking of its own.
//!
//! ```no_run
//! # use embedded_hal::{delay::DelayNs, i2c::I2c};
//! # fn demo<I: I2c, D: DelayNs>(i2c: &mut I, delay: D) -> Result<(), envsense::bme280::Error<I::Error>> {
//! use envsense::bme280::{Address, Bme280};
//!
//! let mut bme280 = Bme280::new(i2c, delay, Address::Primary);
//! bme280.init()?;
//!
//! let temperature = bme280.read_temperature()?;
//! let pressure = bme280.read_pressure()?;
//! let humidity = bme280.read_humidity()?;
//! # Ok(())
//! # }
//! ```

mod calibration;
pub mod compensation;
pub mod config;
mod error;
pub mod registers;

#[cfg(test)]
pub(crate) mod fake;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub use calibration::CalibrationData;
pub use config::{Config, Filter, Mode, Oversampling, StandbyTime};
pub use error::Error;

use compensation::{
    compensate_humidity, compensate_pressure, compensate_temperature, raw_16bit, raw_20bit,
};
use registers::*;

/// Time the sensor needs after a soft reset before it answers again
const STARTUP_DELAY_MS: u32 = 10;
/// Delay between polls of the NVM copy status bit
const NVM_COPY_POLL_INTERVAL_MS: u32 = 10;
/// Maximum number of NVM copy polls before giving up (about one second)
pub const MAX_NVM_COPY_POLLS: u32 = 100;

/// I2C address selected by the SDO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Address {
    /// 0x76, SDO to GND
    #[default]
    Primary,
    /// 0x77, SDO to VDDIO
    Secondary,
}

impl Address {
    pub const fn value(self) -> u8 {
        match self {
            Self::Primary => I2C_ADDR_PRIMARY,
            Self::Secondary => I2C_ADDR_SECONDARY,
        }
    }
}

/// Initialization progress of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// No trusted calibration. Reads fail with [`Error::NotInitialized`].
    Uninitialized,
    /// Soft reset issued, waiting for the power-on sequence
    Resetting,
    /// Waiting for the NVM image copy to finish
    CopyingCalibration,
    /// Calibration loaded and measurement settings written
    Ready,
}

/// One compensated reading of all three channels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub temperature_celsius: f32,
    pub pressure_hpa: f32,
    pub humidity_percent: f32,
}

/// BME280 driver over a blocking I2C bus
pub struct Bme280<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    config: Config,
    state: DeviceState,
    /// Present only while `state` is `Ready`
    calibration: Option<CalibrationData>,
    /// Fine temperature from the last temperature compensation
    t_fine: Option<i32>,
}

impl<I, D> Bme280<I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Create a driver with the default [`Config`]. No bus traffic happens
    /// until [`Bme280::init`].
    pub fn new(i2c: I, delay: D, address: Address) -> Self {
        Self::with_config(i2c, delay, address, Config::default())
    }

    pub fn with_config(i2c: I, delay: D, address: Address, config: Config) -> Self {
        Self {
            i2c,
            delay,
            address: address.value(),
            config,
            state: DeviceState::Uninitialized,
            calibration: None,
            t_fine: None,
        }
    }

    /// Probe, reset and configure the sensor.
    ///
    /// 1. Checks the chip id. On a mismatch nothing is written to the device.
    /// 2. Soft resets and waits for the calibration copy to finish.
    /// 3. Reads the calibration image.
    /// 4. Writes ctrl_hum, then ctrl_meas, then config.
    ///
    /// The driver stays [`DeviceState::Uninitialized`] unless every step succeeds.
    pub fn init(&mut self) -> Result<(), Error<I::Error>> {
        self.clear_calibration();

        let found = self.chip_id()?;
        if found != CHIP_ID {
            warn!("BME280: unexpected chip id {:#04x} at {:#04x}", found, self.address);
            return Err(Error::DeviceNotFound { found });
        }

        match self.handshake() {
            Ok(calibration) => {
                debug!("BME280: calibration {:?}", calibration);
                self.calibration = Some(calibration);
                self.set_state(DeviceState::Ready);
                info!("BME280: initialized at {:#04x}", self.address);
                Ok(())
            }
            Err(e) => {
                self.set_state(DeviceState::Uninitialized);
                Err(e)
            }
        }
    }

    fn handshake(&mut self) -> Result<CalibrationData, Error<I::Error>> {
        self.set_state(DeviceState::Resetting);
        self.write_register(ADDR_RESET, SOFT_RESET_CMD)?;
        self.delay.delay_ms(STARTUP_DELAY_MS);

        self.set_state(DeviceState::CopyingCalibration);
        self.wait_for_nvm_copy()?;
        let calibration = self.read_calibration()?;

        // ctrl_hum only takes effect after a ctrl_meas write
        self.write_register(ADDR_CTRL_HUM, self.config.ctrl_hum())?;
        self.write_register(ADDR_CTRL_MEAS, self.config.ctrl_meas())?;
        self.write_register(ADDR_CONFIG, self.config.config_byte())?;

        Ok(calibration)
    }

    fn wait_for_nvm_copy(&mut self) -> Result<(), Error<I::Error>> {
        for attempt in 1..=MAX_NVM_COPY_POLLS {
            let status = self.read_register(ADDR_STATUS)?;
            if status & STATUS_IM_UPDATE == 0 {
                debug!("BME280: NVM copy finished after {} polls", attempt);
                return Ok(());
            }
            self.delay.delay_ms(NVM_COPY_POLL_INTERVAL_MS);
        }

        warn!("BME280: NVM copy did not finish after {} polls", MAX_NVM_COPY_POLLS);
        Err(Error::InitializationTimeout {
            attempts: MAX_NVM_COPY_POLLS,
        })
    }

    fn read_calibration(&mut self) -> Result<CalibrationData, Error<I::Error>> {
        let mut t_p = [0u8; CALIB_T_P_LEN];
        self.read_registers(ADDR_CALIB_T_P, &mut t_p)?;

        let h1 = self.read_register(ADDR_CALIB_H1)?;

        let mut h = [0u8; CALIB_H_LEN];
        self.read_registers(ADDR_CALIB_H2, &mut h)?;

        Ok(CalibrationData::from_registers(&t_p, h1, &h))
    }

    /// Soft reset the sensor. All register settings and the driver's
    /// calibration are dropped; call [`Bme280::init`] again before reading.
    pub fn reset(&mut self) -> Result<(), Error<I::Error>> {
        self.clear_calibration();
        self.write_register(ADDR_RESET, SOFT_RESET_CMD)
    }

    /// Read the identity register (0x60 on a BME280). Works in any state.
    pub fn chip_id(&mut self) -> Result<u8, Error<I::Error>> {
        self.read_register(ADDR_CHIP_ID)
    }

    /// Whether a conversion is running. Meaningless before `init()`.
    pub fn is_measuring(&mut self) -> Result<bool, Error<I::Error>> {
        let status = self.read_register(ADDR_STATUS)?;
        Ok(status & STATUS_MEASURING != 0)
    }

    /// Temperature in °C. Also refreshes the fine temperature used by the
    /// pressure and humidity formulas.
    pub fn read_temperature(&mut self) -> Result<f32, Error<I::Error>> {
        let cal = self.ready_calibration()?;
        let (centi_celsius, _) = self.measure_temperature(&cal)?;
        Ok(centi_celsius as f32 / 100.0)
    }

    /// Pressure in hPa.
    ///
    /// Returns exactly `0.0` when the calibration makes the formula divide by
    /// zero; treat that as "no measurement available".
    pub fn read_pressure(&mut self) -> Result<f32, Error<I::Error>> {
        let cal = self.ready_calibration()?;
        let t_fine = self.fine_temperature(&cal)?;

        let mut buf = [0u8; PRESS_LEN];
        self.read_registers(ADDR_PRESS_MSB, &mut buf)?;

        Ok(pressure_hpa(&cal, raw_20bit(buf[0], buf[1], buf[2]), t_fine))
    }

    /// Relative humidity in %, always within `0.0..=100.0`.
    pub fn read_humidity(&mut self) -> Result<f32, Error<I::Error>> {
        let cal = self.ready_calibration()?;
        let t_fine = self.fine_temperature(&cal)?;

        let mut buf = [0u8; HUM_LEN];
        self.read_registers(ADDR_HUM_MSB, &mut buf)?;

        Ok(humidity_percent(&cal, raw_16bit(buf[0], buf[1]), t_fine))
    }

    /// Read all three channels in one burst so they belong to the same
    /// conversion. Temperature is always compensated first.
    pub fn read_measurements(&mut self) -> Result<Measurements, Error<I::Error>> {
        let cal = self.ready_calibration()?;

        let mut buf = [0u8; DATA_LEN];
        self.read_registers(ADDR_PRESS_MSB, &mut buf)?;

        let adc_p = raw_20bit(buf[0], buf[1], buf[2]);
        let adc_t = raw_20bit(buf[3], buf[4], buf[5]);
        let adc_h = raw_16bit(buf[6], buf[7]);

        let (centi_celsius, t_fine) = compensate_temperature(&cal, adc_t);
        self.t_fine = Some(t_fine);

        Ok(Measurements {
            temperature_celsius: centi_celsius as f32 / 100.0,
            pressure_hpa: pressure_hpa(&cal, adc_p, t_fine),
            humidity_percent: humidity_percent(&cal, adc_h, t_fine),
        })
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Calibration read during `init()`, if the sensor is ready
    pub fn calibration(&self) -> Option<&CalibrationData> {
        self.calibration.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 7-bit I2C address of the sensor
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Destroy the driver and hand back the bus and delay
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    // =========================================================================
    // Private Helper Methods
    // =========================================================================

    fn set_state(&mut self, state: DeviceState) {
        debug!("BME280: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn clear_calibration(&mut self) {
        self.calibration = None;
        self.t_fine = None;
        self.set_state(DeviceState::Uninitialized);
    }

    fn ready_calibration(&self) -> Result<CalibrationData, Error<I::Error>> {
        match (self.state, self.calibration) {
            (DeviceState::Ready, Some(calibration)) => Ok(calibration),
            _ => Err(Error::NotInitialized),
        }
    }

    /// Fine temperature, running a temperature conversion first if none
    /// has happened since `init()`
    fn fine_temperature(&mut self, cal: &CalibrationData) -> Result<i32, Error<I::Error>> {
        if let Some(t_fine) = self.t_fine {
            return Ok(t_fine);
        }

        debug!("BME280: no fine temperature yet, reading temperature first");
        let (_, t_fine) = self.measure_temperature(cal)?;
        Ok(t_fine)
    }

    /// Returns `(centi_celsius, t_fine)` and stores `t_fine`
    fn measure_temperature(
        &mut self,
        cal: &CalibrationData,
    ) -> Result<(i32, i32), Error<I::Error>> {
        let mut buf = [0u8; TEMP_LEN];
        self.read_registers(ADDR_TEMP_MSB, &mut buf)?;

        let (centi_celsius, t_fine) = compensate_temperature(cal, raw_20bit(buf[0], buf[1], buf[2]));
        self.t_fine = Some(t_fine);

        Ok((centi_celsius, t_fine))
    }

    /// Read a single byte from a register
    fn read_register(&mut self, reg: u8) -> Result<u8, Error<I::Error>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Read consecutive registers starting at `reg`
    fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error<I::Error>> {
        self.i2c.write_read(self.address, &[reg], buf)?;
        Ok(())
    }

    /// Write a single byte to a register
    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.i2c.write(self.address, &[reg, value])?;
        Ok(())
    }
}

fn pressure_hpa(cal: &CalibrationData, adc_p: i32, t_fine: i32) -> f32 {
    match compensate_pressure(cal, adc_p, t_fine) {
        // Q24.8 Pa to hPa
        Some(q24_8) => q24_8 as f32 / 25_600.0,
        None => {
            warn!("BME280: pressure compensation divisor is zero, reporting 0 hPa");
            0.0
        }
    }
}

fn humidity_percent(cal: &CalibrationData, adc_h: i32, t_fine: i32) -> f32 {
    // Q22.10 to %RH
    (compensate_humidity(cal, adc_h, t_fine) as f32 / 1024.0).clamp(0.0, 100.0)
}
