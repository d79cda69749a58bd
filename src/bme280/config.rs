use serde::{Deserialize, Serialize};

/// Oversampling setting for one measurement channel (`osrs_x` fields).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Oversampling {
    /// Channel disabled, output is 0x80000 (0x8000 for humidity)
    Skipped = 0b000,
    #[default]
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

/// Sensor power mode (`mode[1:0]` of ctrl_meas)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Mode {
    Sleep = 0b00,
    Forced = 0b01,
    /// Continuous conversions separated by the standby time
    #[default]
    Normal = 0b11,
}

/// IIR filter coefficient (`filter[2:0]` of config)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Filter {
    #[default]
    Off = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
}

/// Inactive duration between conversions in normal mode (`t_sb[2:0]` of config)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StandbyTime {
    #[default]
    Ms0_5 = 0b000,
    Ms62_5 = 0b001,
    Ms125 = 0b010,
    Ms250 = 0b011,
    Ms500 = 0b100,
    Ms1000 = 0b101,
    Ms10 = 0b110,
    Ms20 = 0b111,
}

/// Measurement settings written to the sensor at the end of `init()`.
///
/// The default is x1 oversampling on all channels, normal mode, filter off
/// and the shortest standby, which writes 0x01 / 0x27 / 0x00 to
/// ctrl_hum / ctrl_meas / config.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub temperature_oversampling: Oversampling,
    pub pressure_oversampling: Oversampling,
    pub humidity_oversampling: Oversampling,
    pub mode: Mode,
    pub filter: Filter,
    pub standby: StandbyTime,
}

impl Config {
    /// Value for the ctrl_hum register.
    pub const fn ctrl_hum(&self) -> u8 {
        self.humidity_oversampling as u8
    }

    /// Value for the ctrl_meas register: `osrs_t[7:5] | osrs_p[4:2] | mode[1:0]`.
    pub const fn ctrl_meas(&self) -> u8 {
        (self.temperature_oversampling as u8) << 5
            | (self.pressure_oversampling as u8) << 2
            | self.mode as u8
    }

    /// Value for the config register: `t_sb[7:5] | filter[4:2]`, 3-wire SPI off.
    pub const fn config_byte(&self) -> u8 {
        (self.standby as u8) << 5 | (self.filter as u8) << 2
    }

    pub const fn with_oversampling(
        mut self,
        temperature: Oversampling,
        pressure: Oversampling,
        humidity: Oversampling,
    ) -> Self {
        self.temperature_oversampling = temperature;
        self.pressure_oversampling = pressure;
        self.humidity_oversampling = humidity;
        self
    }

    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub const fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub const fn with_standby(mut self, standby: StandbyTime) -> Self {
        self.standby = standby;
        self
    }

    /// Serialize into `buf` for persistence (e.g. on an SD card or in flash).
    pub fn to_slice<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Restore a configuration written by [`Config::to_slice`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
