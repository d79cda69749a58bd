//! BME280 register map and bit masks.

// =============================================================================
// I2C Addresses
// =============================================================================

/// SDO tied to GND (most breakout boards)
pub const I2C_ADDR_PRIMARY: u8 = 0x76;
/// SDO tied to VDDIO
pub const I2C_ADDR_SECONDARY: u8 = 0x77;

// =============================================================================
// Identity and Control Registers
// =============================================================================

/// Chip identification register
pub const ADDR_CHIP_ID: u8 = 0xD0;
/// Soft reset register
pub const ADDR_RESET: u8 = 0xE0;
/// Humidity oversampling control. Only latched by a following ctrl_meas write.
pub const ADDR_CTRL_HUM: u8 = 0xF2;
/// Device status register
pub const ADDR_STATUS: u8 = 0xF3;
/// Temperature/pressure oversampling and power mode
pub const ADDR_CTRL_MEAS: u8 = 0xF4;
/// Standby time and IIR filter
pub const ADDR_CONFIG: u8 = 0xF5;

// =============================================================================
// Data Registers
// =============================================================================

/// press_msb, press_lsb, press_xlsb
pub const ADDR_PRESS_MSB: u8 = 0xF7;
/// temp_msb, temp_lsb, temp_xlsb
pub const ADDR_TEMP_MSB: u8 = 0xFA;
/// hum_msb, hum_lsb
pub const ADDR_HUM_MSB: u8 = 0xFD;

pub const PRESS_LEN: usize = 3;
pub const TEMP_LEN: usize = 3;
pub const HUM_LEN: usize = 2;
/// Full burst from press_msb through hum_lsb
pub const DATA_LEN: usize = PRESS_LEN + TEMP_LEN + HUM_LEN;

// =============================================================================
// Calibration Registers
// =============================================================================

/// dig_T1 through dig_P9, little endian pairs
pub const ADDR_CALIB_T_P: u8 = 0x88;
pub const CALIB_T_P_LEN: usize = 24;
/// dig_H1
pub const ADDR_CALIB_H1: u8 = 0xA1;
/// dig_H2 through dig_H6
pub const ADDR_CALIB_H2: u8 = 0xE1;
pub const CALIB_H_LEN: usize = 7;

// =============================================================================
// Register Values
// =============================================================================

/// Value of `ADDR_CHIP_ID` on a BME280. The BMP280 (no humidity) reports 0x56-0x58.
pub const CHIP_ID: u8 = 0x60;
/// Writing this to `ADDR_RESET` triggers a power-on reset
pub const SOFT_RESET_CMD: u8 = 0xB6;

/// Status bit set while NVM calibration data is copied to image registers
pub const STATUS_IM_UPDATE: u8 = 0x01;
/// Status bit set while a conversion is running
pub const STATUS_MEASURING: u8 = 0x08;
