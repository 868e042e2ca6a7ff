//! Factory compensation coefficients.
//!
//! The coefficients live in two non-contiguous register blocks: temperature
//! and pressure words from `0x88`, humidity from `0xA1` and `0xE1`.

use crate::bus::Bus;
use crate::error::Error;
use crate::utils::*;

pub const CALIB_TP_START: u8 = 0x88;
pub const CALIB_TP_LEN: usize = 24;
pub const CALIB_H1: u8 = 0xA1;
pub const CALIB_H_START: u8 = 0xE1;
pub const CALIB_H_LEN: usize = 7;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TemperatureCoefficients {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PressureCoefficients {
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HumidityCoefficients {
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

/// All eighteen coefficients of one device. Read once when the handle is
/// created and never modified afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationSet {
    pub temperature: TemperatureCoefficients,
    pub pressure: PressureCoefficients,
    pub humidity: HumidityCoefficients,
}

impl CalibrationSet {
    pub fn load<B: Bus>(bus: &mut B, address: u8) -> Result<CalibrationSet, Error<B::Error>> {
        let mut tp = [0u8; CALIB_TP_LEN];
        let mut h1 = [0u8; 1];
        let mut h = [0u8; CALIB_H_LEN];

        bus.read_registers(address, CALIB_TP_START, &mut tp).map_err(Error::Bus)?;
        bus.read_registers(address, CALIB_H1, &mut h1).map_err(Error::Bus)?;
        bus.read_registers(address, CALIB_H_START, &mut h).map_err(Error::Bus)?;

        let calibration = CalibrationSet::from_registers(&tp, h1[0], &h);
        debug!("calibration of 0x{:02x}: {:?}", address, calibration);
        Ok(calibration)
    }

    /// Decodes the raw register blocks.
    ///
    /// `tp` is `0x88..=0x9F`, `h1` is `0xA1` and `h` is `0xE1..=0xE7`. H4 and
    /// H5 are 12-bit values sharing `0xE5`: H4 takes its low nibble, H5 its
    /// high nibble, and both take their sign from the full byte beside it.
    pub fn from_registers(tp: &[u8; CALIB_TP_LEN], h1: u8, h: &[u8; CALIB_H_LEN]) -> CalibrationSet {
        CalibrationSet {
            temperature: TemperatureCoefficients {
                t1: unsigned_short(tp, 0),
                t2: signed_short(tp, 2),
                t3: signed_short(tp, 4),
            },
            pressure: PressureCoefficients {
                p1: unsigned_short(tp, 6),
                p2: signed_short(tp, 8),
                p3: signed_short(tp, 10),
                p4: signed_short(tp, 12),
                p5: signed_short(tp, 14),
                p6: signed_short(tp, 16),
                p7: signed_short(tp, 18),
                p8: signed_short(tp, 20),
                p9: signed_short(tp, 22),
            },
            humidity: HumidityCoefficients {
                h1,
                h2: signed_short(h, 0),
                h3: h[2],
                h4: ((h[3] as i8 as i16) << 4) | (h[4] & 0x0F) as i16,
                h5: ((h[5] as i8 as i16) << 4) | (h[4] >> 4) as i16,
                h6: h[6] as i8,
            },
        }
    }
}
