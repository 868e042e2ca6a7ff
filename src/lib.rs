//! # bme280-telemetry
//!
//! This crate reads a bme280 over a two-wire bus, compensates the raw counts
//! with the vendor's integer formulas and renders each reading as a compact
//! JSON record for publishing.
//!
//! # Examples
//! ```no_run
//! use bme280_telemetry::{Bme280, LinuxBus, StandbyTime, DEFAULT_ADDRESS};
//!
//! let bus = LinuxBus::open("/dev/i2c-1").unwrap();
//! let mut bme280 = Bme280::new(bus, DEFAULT_ADDRESS, StandbyTime::Ms1000).unwrap();
//! let reading = *bme280.read_cycle().unwrap();
//! println!("{:.2}", reading.celsius());
//! println!("{:.2}", reading.relative_humidity());
//! println!("{:.2}", reading.hectopascals());
//! println!("{}", bme280.record().unwrap());
//! let _bus = bme280.release();
//! ```

extern crate heapless;
extern crate i2cdev;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json_core;
extern crate thiserror;

mod bme280;
pub mod bus;
pub mod calibration;
pub mod compensation;
mod error;
pub mod record;
pub mod sample;
pub mod station;
mod utils;

pub use bme280::*;
#[cfg(target_os = "linux")]
pub use bus::LinuxBus;
pub use bus::Bus;
pub use calibration::CalibrationSet;
pub use compensation::{CompensatedReading, DivisionByZero};
pub use error::Error;
pub use record::Record;
pub use sample::RawSample;
pub use station::{Publisher, Schedule, Station, StdoutPublisher};
