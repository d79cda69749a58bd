use super::registers::{CALIB_H_LEN, CALIB_T_P_LEN};

/// Factory trimming coefficients read from the sensor's NVM.
///
/// Every BME280 carries its own set. The driver reads them once during
/// [`Bme280::init`](super::Bme280::init) and only hands out shared references
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationData {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,

    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,

    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibrationData {
    /// Decode the raw calibration image.
    ///
    /// * `t_p` - the 24 bytes starting at 0x88
    /// * `h1` - the byte at 0xA1
    /// * `h` - the 7 bytes starting at 0xE1
    ///
    /// dig_H4 and dig_H5 are 12-bit signed values sharing the nibbles of 0xE5.
    pub fn from_registers(t_p: &[u8; CALIB_T_P_LEN], h1: u8, h: &[u8; CALIB_H_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([t_p[i], t_p[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([t_p[i], t_p[i + 1]]);

        Self {
            dig_t1: u16_at(0),
            dig_t2: i16_at(2),
            dig_t3: i16_at(4),

            dig_p1: u16_at(6),
            dig_p2: i16_at(8),
            dig_p3: i16_at(10),
            dig_p4: i16_at(12),
            dig_p5: i16_at(14),
            dig_p6: i16_at(16),
            dig_p7: i16_at(18),
            dig_p8: i16_at(20),
            dig_p9: i16_at(22),

            dig_h1: h1,
            dig_h2: i16::from_le_bytes([h[0], h[1]]),
            dig_h3: h[2],
            dig_h4: ((h[3] as i8 as i16) << 4) | (h[4] & 0x0F) as i16,
            dig_h5: ((h[5] as i8 as i16) << 4) | (h[4] >> 4) as i16,
            dig_h6: h[6] as i8,
        }
    }
}
