//! BME280 environmental sensor driver
//!
//! This crate talks to the Bosch BME280 over any blocking `embedded-hal` I2C
//! bus and turns its raw ADC output into calibrated temperature, pressure and
//! humidity using the datasheet's fixed-point compensation.
//!
//! It is `#![no_std]` so it compiles on embedded targets and on desktop hosts
//! (for tests).

#![cfg_attr(not(test), no_std)]

pub mod bme280;
pub mod sensors;
