use std::fmt;
use std::str::FromStr;

use crate::bus::Bus;
use crate::calibration::CalibrationSet;
use crate::compensation::{self, CompensatedReading};
use crate::error::Error;
use crate::record::{self, Record};
use crate::sample::RawSample;

pub const DEFAULT_ADDRESS: u8 = 0x76;

pub const REG_CTRL_HUM: u8 = 0xF2;
pub const REG_CTRL_MEAS: u8 = 0xF4;
pub const REG_CONFIG: u8 = 0xF5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Oversampling {
    Skipped = 0b000,
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Off = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
}

/// Idle time between measurements in normal mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StandbyTime {
    Ms0_5 = 0b000,
    Ms62_5 = 0b001,
    Ms125 = 0b010,
    Ms250 = 0b011,
    Ms500 = 0b100,
    Ms1000 = 0b101,
    Ms10 = 0b110,
    Ms20 = 0b111,
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidStandby(String);

impl fmt::Display for InvalidStandby {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unsupported standby time {:?} (expected 0.5, 62.5, 125, 250, 500, 1000, 10 or 20)",
            self.0
        )
    }
}

impl std::error::Error for InvalidStandby {}

impl FromStr for StandbyTime {
    type Err = InvalidStandby;

    fn from_str(millis: &str) -> Result<StandbyTime, InvalidStandby> {
        match millis.trim() {
            "0.5" => Ok(StandbyTime::Ms0_5),
            "62.5" => Ok(StandbyTime::Ms62_5),
            "125" => Ok(StandbyTime::Ms125),
            "250" => Ok(StandbyTime::Ms250),
            "500" => Ok(StandbyTime::Ms500),
            "1000" => Ok(StandbyTime::Ms1000),
            "10" => Ok(StandbyTime::Ms10),
            "20" => Ok(StandbyTime::Ms20),
            other => Err(InvalidStandby(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub oversampling_temperature: Oversampling,
    pub oversampling_pressure: Oversampling,
    pub oversampling_humidity: Oversampling,
    pub standby_time: StandbyTime,
    pub iir_filter: Filter,
    pub spi3w_enabled: bool,
}

impl Default for Config {
    /// Continuous indoor monitoring profile.
    fn default() -> Config {
        Config {
            mode: Mode::Normal,
            oversampling_temperature: Oversampling::X2,
            oversampling_pressure: Oversampling::X16,
            oversampling_humidity: Oversampling::X1,
            standby_time: StandbyTime::Ms1000,
            iir_filter: Filter::X16,
            spi3w_enabled: false,
        }
    }
}

impl Config {
    pub fn ctrl_hum(&self) -> u8 {
        self.oversampling_humidity as u8 & 0x07
    }

    pub fn ctrl_meas(&self) -> u8 {
        ((self.oversampling_temperature as u8) << 5) | ((self.oversampling_pressure as u8) << 2) | self.mode as u8
    }

    pub fn config(&self) -> u8 {
        ((self.standby_time as u8) << 5) | ((self.iir_filter as u8) << 2) | (self.spi3w_enabled as u8)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Calibration loaded and sensor configured, nothing measured yet.
    Calibrated,
    /// At least one read cycle succeeded.
    Ready,
}

/// Handle for one sensor on the bus.
///
/// Created by [`Bme280::new`], updated by [`Bme280::read_cycle`] and torn
/// down by [`Bme280::release`]. A failed cycle leaves the previous reading
/// and record in place.
pub struct Bme280<B: Bus> {
    bus: B,
    address: u8,
    config: Config,
    calibration: CalibrationSet,
    raw: RawSample,
    reading: CompensatedReading,
    record: Record,
    state: State,
}

impl<B: Bus> Bme280<B> {
    /// Loads calibration and starts continuous measurement with the default
    /// profile and the given standby time.
    pub fn new(bus: B, address: u8, standby_time: StandbyTime) -> Result<Bme280<B>, Error<B::Error>> {
        let config = Config { standby_time, ..Config::default() };
        Bme280::with_config(bus, address, config)
    }

    pub fn with_config(mut bus: B, address: u8, config: Config) -> Result<Bme280<B>, Error<B::Error>> {
        let calibration = CalibrationSet::load(&mut bus, address)?;
        let mut bme280 = Bme280 {
            bus,
            address,
            config,
            calibration,
            raw: RawSample::default(),
            reading: CompensatedReading::default(),
            record: Record::new(),
            state: State::Calibrated,
        };
        bme280.initialize()?;
        info!("bme280 at 0x{:02x} initialized ({:?})", address, config);
        Ok(bme280)
    }

    fn initialize(&mut self) -> Result<(), Error<B::Error>> {
        let address = self.address;
        // ctrl_hum only takes effect after ctrl_meas is written, and config
        // writes may be ignored once the sensor has left sleep mode.
        self.bus
            .write(address, &[REG_CTRL_HUM, self.config.ctrl_hum()], true)
            .map_err(Error::Bus)?;
        self.bus
            .write(address, &[REG_CONFIG, self.config.config()], true)
            .map_err(Error::Bus)?;
        self.bus
            .write(address, &[REG_CTRL_MEAS, self.config.ctrl_meas()], false)
            .map_err(Error::Bus)
    }

    /// Reads, compensates and serializes one measurement. State is only
    /// replaced once all three steps succeeded.
    pub fn read_cycle(&mut self) -> Result<&CompensatedReading, Error<B::Error>> {
        let raw = RawSample::read(&mut self.bus, self.address)?;
        let reading = compensation::compensate(&raw, &self.calibration)?;
        let record = record::serialize(&reading).ok_or(Error::RecordOverflow)?;

        self.raw = raw;
        self.reading = reading;
        self.record = record;
        self.state = State::Ready;

        info!(
            "temperature {:.1} C | humidity {:.1} % | pressure {:.1} hPa",
            reading.celsius(),
            reading.relative_humidity(),
            reading.hectopascals()
        );
        Ok(&self.reading)
    }

    /// The record of the last successful cycle, `None` before the first one.
    pub fn record(&self) -> Option<&str> {
        match self.state {
            State::Ready => Some(self.record.as_str()),
            State::Calibrated => None,
        }
    }

    pub fn reading(&self) -> Option<&CompensatedReading> {
        match self.state {
            State::Ready => Some(&self.reading),
            State::Calibrated => None,
        }
    }

    pub fn raw_sample(&self) -> Option<&RawSample> {
        match self.state {
            State::Ready => Some(&self.raw),
            State::Calibrated => None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.calibration
    }

    /// Tears the handle down and hands the bus back.
    pub fn release(self) -> B {
        debug!("bme280 at 0x{:02x} released", self.address);
        self.bus
    }
}
