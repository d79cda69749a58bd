//! Integer compensation formulas from the BME280 datasheet (section 4.2.3 and 8).
//!
//! These are transcriptions of `BME280_compensate_T_int32`,
//! `BME280_compensate_P_int64` and `bme280_compensate_H_int32`. Every
//! intermediate uses two's-complement wrapping so that any raw input produces
//! the same bit pattern as the reference C code, and no stage goes through
//! floating point.

use super::calibration::CalibrationData;

/// Upper bound of the humidity accumulator before the final shift (100 %RH in Q22.10 << 12).
pub const HUMIDITY_ACCUMULATOR_MAX: i32 = 419_430_400;

/// Assemble a 20-bit temperature or pressure reading from msb, lsb and xlsb[7:4].
#[inline]
pub fn raw_20bit(msb: u8, lsb: u8, xlsb: u8) -> i32 {
    ((msb as i32) << 12) | ((lsb as i32) << 4) | ((xlsb as i32) >> 4)
}

/// Assemble a 16-bit humidity reading.
#[inline]
pub fn raw_16bit(msb: u8, lsb: u8) -> i32 {
    ((msb as i32) << 8) | lsb as i32
}

/// Returns `(temperature, t_fine)` where temperature is in 0.01 °C
/// (5123 means 51.23 °C) and `t_fine` feeds the pressure and humidity formulas.
pub fn compensate_temperature(cal: &CalibrationData, adc_t: i32) -> (i32, i32) {
    let t1 = cal.dig_t1 as i32;
    let t2 = cal.dig_t2 as i32;
    let t3 = cal.dig_t3 as i32;

    let var1 = ((adc_t >> 3).wrapping_sub(t1 << 1)).wrapping_mul(t2) >> 11;

    let delta = (adc_t >> 4).wrapping_sub(t1);
    let var2 = (delta.wrapping_mul(delta) >> 12).wrapping_mul(t3) >> 14;

    let t_fine = var1.wrapping_add(var2);
    let temperature = t_fine.wrapping_mul(5).wrapping_add(128) >> 8;

    (temperature, t_fine)
}

/// Returns pressure in Pa as Q24.8 (24674867 means 24674867 / 256 = 96386.2 Pa).
///
/// `None` when the dig_P1 term is zero and the formula would divide by zero.
pub fn compensate_pressure(cal: &CalibrationData, adc_p: i32, t_fine: i32) -> Option<u32> {
    let p1 = cal.dig_p1 as i64;
    let p2 = cal.dig_p2 as i64;
    let p3 = cal.dig_p3 as i64;
    let p4 = cal.dig_p4 as i64;
    let p5 = cal.dig_p5 as i64;
    let p6 = cal.dig_p6 as i64;
    let p7 = cal.dig_p7 as i64;
    let p8 = cal.dig_p8 as i64;
    let p9 = cal.dig_p9 as i64;

    let mut var1 = (t_fine as i64) - 128_000;
    let mut var2 = var1.wrapping_mul(var1).wrapping_mul(p6);
    var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 17);
    var2 = var2.wrapping_add(p4 << 35);
    var1 = (var1.wrapping_mul(var1).wrapping_mul(p3) >> 8)
        .wrapping_add(var1.wrapping_mul(p2) << 12);
    var1 = ((1_i64 << 47).wrapping_add(var1)).wrapping_mul(p1) >> 33;

    if var1 == 0 {
        return None;
    }

    let mut p = 1_048_576 - adc_p as i64;
    p = ((p << 31).wrapping_sub(var2))
        .wrapping_mul(3125)
        .wrapping_div(var1);
    var1 = p9.wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
    var2 = p8.wrapping_mul(p) >> 19;
    p = (p.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add(p7 << 4);

    Some(p as u32)
}

/// Returns relative humidity as Q22.10 (47445 means 47445 / 1024 = 46.333 %RH).
pub fn compensate_humidity(cal: &CalibrationData, adc_h: i32, t_fine: i32) -> u32 {
    let h1 = cal.dig_h1 as i32;
    let h2 = cal.dig_h2 as i32;
    let h3 = cal.dig_h3 as i32;
    let h4 = cal.dig_h4 as i32;
    let h5 = cal.dig_h5 as i32;
    let h6 = cal.dig_h6 as i32;

    let mut v = t_fine.wrapping_sub(76_800);

    let offset = ((adc_h << 14)
        .wrapping_sub(h4 << 20)
        .wrapping_sub(h5.wrapping_mul(v))
        .wrapping_add(16_384))
        >> 15;
    let scale = (((v.wrapping_mul(h6) >> 10)
        .wrapping_mul((v.wrapping_mul(h3) >> 11).wrapping_add(32_768))
        >> 10)
        .wrapping_add(2_097_152))
    .wrapping_mul(h2)
    .wrapping_add(8_192)
        >> 14;
    v = offset.wrapping_mul(scale);

    let square = ((v >> 15).wrapping_mul(v >> 15) >> 7).wrapping_mul(h1) >> 4;
    v = v.wrapping_sub(square);

    v = v.clamp(0, HUMIDITY_ACCUMULATOR_MAX);

    (v >> 12) as u32
}
