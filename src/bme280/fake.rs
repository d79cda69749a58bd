//! In-memory BME280 register file for driver tests.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use super::calibration::tests::{DATASHEET_T_P, TYPICAL_H, TYPICAL_H1};
use super::registers::*;

pub(crate) struct FakeBme280 {
    pub address: u8,
    pub regs: [u8; 256],
    pointer: u8,
    /// Status reads that still report an NVM copy in progress
    pub nvm_busy_polls: u32,
    /// Every register write, in order
    pub writes: Vec<(u8, u8)>,
    /// Start register and length of every read
    pub reads: Vec<(u8, usize)>,
}

impl FakeBme280 {
    /// A primary-address BME280 with datasheet calibration and the
    /// datasheet example ADC values (519888 / 415148) plus humidity 30000.
    pub fn datasheet() -> Self {
        let mut regs = [0u8; 256];
        regs[ADDR_CHIP_ID as usize] = CHIP_ID;

        let t_p = ADDR_CALIB_T_P as usize;
        regs[t_p..t_p + CALIB_T_P_LEN].copy_from_slice(&DATASHEET_T_P);
        regs[ADDR_CALIB_H1 as usize] = TYPICAL_H1;
        let h = ADDR_CALIB_H2 as usize;
        regs[h..h + CALIB_H_LEN].copy_from_slice(&TYPICAL_H);

        let mut fake = Self {
            address: I2C_ADDR_PRIMARY,
            regs,
            pointer: 0,
            nvm_busy_polls: 0,
            writes: Vec::new(),
            reads: Vec::new(),
        };
        fake.set_adc(415_148, 519_888, 30_000);
        fake
    }

    pub fn set_adc(&mut self, pressure: u32, temperature: u32, humidity: u16) {
        let p = ADDR_PRESS_MSB as usize;
        self.regs[p..p + PRESS_LEN].copy_from_slice(&split_20bit(pressure));
        let t = ADDR_TEMP_MSB as usize;
        self.regs[t..t + TEMP_LEN].copy_from_slice(&split_20bit(temperature));
        let h = ADDR_HUM_MSB as usize;
        self.regs[h..h + HUM_LEN].copy_from_slice(&humidity.to_be_bytes());
    }

    /// Start registers of every read, in order
    pub fn read_starts(&self) -> Vec<u8> {
        self.reads.iter().map(|&(reg, _)| reg).collect()
    }

    fn read(&mut self, reg: u8) -> u8 {
        if reg == ADDR_STATUS && self.nvm_busy_polls > 0 {
            self.nvm_busy_polls -= 1;
            return self.regs[reg as usize] | STATUS_IM_UPDATE;
        }
        self.regs[reg as usize]
    }

    fn write(&mut self, reg: u8, value: u8) {
        self.writes.push((reg, value));
        if reg != ADDR_RESET {
            self.regs[reg as usize] = value;
        }
    }
}

fn split_20bit(value: u32) -> [u8; 3] {
    [(value >> 12) as u8, (value >> 4) as u8, ((value & 0x0F) << 4) as u8]
}

impl ErrorType for FakeBme280 {
    type Error = ErrorKind;
}

impl I2c for FakeBme280 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => match bytes {
                    [reg] => self.pointer = *reg,
                    pairs => {
                        // Multi-byte writes are (register, value) pairs on the BME280
                        for pair in pairs.chunks_exact(2) {
                            self.write(pair[0], pair[1]);
                        }
                    }
                },
                Operation::Read(buffer) => {
                    self.reads.push((self.pointer, buffer.len()));
                    for byte in buffer.iter_mut() {
                        *byte = self.read(self.pointer);
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }

        Ok(())
    }
}
