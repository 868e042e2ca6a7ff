//! Integer compensation formulas from the BME280 datasheet (section 4.2.3).
//!
//! Shift amounts and widths encode the fixed-point scale of every
//! coefficient; they must not be simplified.

use thiserror::Error;

use crate::calibration::*;
use crate::sample::RawSample;

/// Upper clamp of the humidity accumulator, 100 %RH in Q22.10 << 12.
pub const HUMIDITY_MAX: i32 = 419_430_400;

/// The pressure formula's divisor (`var1`) evaluated to zero.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("pressure compensation would divide by zero")]
pub struct DivisionByZero;

/// Fine resolution temperature, an input to the pressure and humidity
/// formulas. Only obtainable by compensating a temperature first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FineTemperature(i32);

impl FineTemperature {
    /// Temperature in hundredths of a degree Celsius.
    pub fn hundredths(self) -> i32 {
        (self.0 * 5 + 128) >> 8
    }
}

/// Physical values of one measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompensatedReading {
    /// Hundredths of a degree Celsius.
    pub temperature: i32,
    /// Pascal in Q24.8.
    pub pressure: u32,
    /// %RH in Q22.10.
    pub humidity: u32,
}

impl CompensatedReading {
    pub fn celsius(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    pub fn relative_humidity(&self) -> f32 {
        self.humidity as f32 / 1024.0
    }

    pub fn hectopascals(&self) -> f32 {
        self.pressure as f32 / 25600.0
    }
}

impl TemperatureCoefficients {
    pub fn fine_resolution_temp(&self, uncomp_t: u32) -> FineTemperature {
        let uncomp_ = uncomp_t as i64;
        let t1_ = self.t1 as i64;
        let t2_ = self.t2 as i64;
        let t3_ = self.t3 as i64;

        // The first product exceeds i32 for raw values near 2^20 with a large t2.
        let x1 = (((uncomp_ >> 3) - (t1_ << 1)) * t2_) >> 11;
        let x2 = (((((uncomp_ >> 4) - t1_) * ((uncomp_ >> 4) - t1_)) >> 12) * t3_) >> 14;
        // |x1 + x2| stays below 2^23 for any 20-bit input and 16-bit coefficients.
        FineTemperature((x1 + x2) as i32)
    }
}

impl PressureCoefficients {
    /// Pressure in Pa as Q24.8, using 64-bit intermediates.
    pub fn compensate(&self, uncomp_p: u32, t_fine: FineTemperature) -> Result<u32, DivisionByZero> {
        let p1 = self.p1 as i64;
        let p2 = self.p2 as i64;
        let p3 = self.p3 as i64;
        let p4 = self.p4 as i64;
        let p5 = self.p5 as i64;
        let p6 = self.p6 as i64;
        let p7 = self.p7 as i64;
        let p8 = self.p8 as i64;
        let p9 = self.p9 as i64;

        let mut var1 = t_fine.0 as i64 - 128000;
        let mut var2 = var1 * var1 * p6;
        var2 += (var1 * p5) << 17;
        var2 += p4 << 35;
        var1 = ((var1 * var1 * p3) >> 8) + ((var1 * p2) << 12);
        var1 = (((1i64 << 47) + var1) * p1) >> 33;
        if var1 == 0 {
            return Err(DivisionByZero);
        }

        let mut p = 1_048_576 - uncomp_p as i64;
        p = (((p << 31) - var2) * 3125) / var1;
        var1 = (p9 * (p >> 13) * (p >> 13)) >> 25;
        var2 = (p8 * p) >> 19;
        p = ((p + var1 + var2) >> 8) + (p7 << 4);
        // A large negative p7 can pull the result below zero.
        Ok(p.max(0).min(u32::MAX as i64) as u32)
    }
}

impl HumidityCoefficients {
    /// Relative humidity in %RH as Q22.10, saturating at 0 and 100 %.
    /// The accumulator is 64-bit: its square term overflows i32 once the
    /// product exceeds about 1.5e9, which a high h2 reaches at raw 0xFFFF.
    pub fn compensate(&self, uncomp_h: u16, t_fine: FineTemperature) -> u32 {
        let h1 = self.h1 as i64;
        let h2 = self.h2 as i64;
        let h3 = self.h3 as i64;
        let h4 = self.h4 as i64;
        let h5 = self.h5 as i64;
        let h6 = self.h6 as i64;
        let adc = uncomp_h as i64;

        let mut v = t_fine.0 as i64 - 76800;
        let scaled = (((adc << 14) - (h4 << 20) - (h5 * v)) + 16384) >> 15;
        let x1 = (v * h6) >> 10;
        let x2 = ((v * h3) >> 11) + 32768;
        let gain = (((((x1 * x2) >> 10) + 2_097_152) * h2) + 8192) >> 14;
        v = scaled * gain;
        v -= ((((v >> 15) * (v >> 15)) >> 7) * h1) >> 4;
        v = v.max(0).min(HUMIDITY_MAX as i64);
        (v >> 12) as u32
    }
}

/// Compensates all three channels. Temperature runs first since its fine
/// value feeds the other two formulas.
pub fn compensate(sample: &RawSample, calibration: &CalibrationSet) -> Result<CompensatedReading, DivisionByZero> {
    let t_fine = calibration.temperature.fine_resolution_temp(sample.temperature);
    let pressure = calibration.pressure.compensate(sample.pressure, t_fine)?;
    let humidity = calibration.humidity.compensate(sample.humidity, t_fine);
    Ok(CompensatedReading {
        temperature: t_fine.hundredths(),
        pressure,
        humidity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_example() -> CalibrationSet {
        CalibrationSet {
            temperature: TemperatureCoefficients { t1: 27504, t2: 26435, t3: -1000 },
            pressure: PressureCoefficients {
                p1: 36477,
                p2: -10685,
                p3: 3024,
                p4: 2855,
                p5: 140,
                p6: -7,
                p7: 15500,
                p8: -14600,
                p9: 6000,
            },
            humidity: HumidityCoefficients { h1: 75, h2: 362, h3: 0, h4: 313, h5: 50, h6: 30 },
        }
    }

    fn sample(humidity: u16) -> RawSample {
        RawSample { pressure: 415148, temperature: 519888, humidity }
    }

    #[test]
    fn temperature_matches_datasheet_example() {
        let cal = worked_example();
        let t_fine = cal.temperature.fine_resolution_temp(519888);
        assert_eq!(t_fine, FineTemperature(128422));
        assert_eq!(t_fine.hundredths(), 2508);
    }

    #[test]
    fn below_freezing_is_negative() {
        let t_fine = worked_example().temperature.fine_resolution_temp(400000);
        assert_eq!(t_fine.hundredths(), -1264);
    }

    #[test]
    fn pressure_matches_datasheet_example() {
        let pressure = worked_example().pressure.compensate(415148, FineTemperature(128422));
        // 100653.25 Pa
        assert_eq!(pressure, Ok(25767233));
    }

    #[test]
    fn full_reading() {
        let reading = compensate(&sample(30000), &worked_example()).unwrap();
        assert_eq!(
            reading,
            CompensatedReading { temperature: 2508, pressure: 25767233, humidity: 56317 }
        );
        assert!((reading.celsius() - 25.08).abs() < 0.001);
        assert!((reading.relative_humidity() - 54.997).abs() < 0.01);
        assert!((reading.hectopascals() - 1006.53).abs() < 0.01);
    }

    #[test]
    fn compensation_is_deterministic() {
        let cal = worked_example();
        let first = compensate(&sample(32768), &cal);
        for _ in 0..10 {
            assert_eq!(compensate(&sample(32768), &cal), first);
        }
    }

    #[test]
    fn stale_fine_temperature_changes_result() {
        let cal = worked_example();
        let ordered = compensate(&sample(30000), &cal).unwrap();
        assert_eq!(cal.pressure.compensate(415148, FineTemperature(0)), Ok(24786192));
        assert_eq!(cal.humidity.compensate(30000, FineTemperature(0)), 55289);
        assert_ne!(ordered.pressure, 24786192);
        assert_ne!(ordered.humidity, 55289);
    }

    #[test]
    fn zero_divisor_is_reported() {
        let mut cal = worked_example();
        cal.pressure.p1 = 0;
        assert_eq!(compensate(&sample(30000), &cal), Err(DivisionByZero));
    }

    #[test]
    fn humidity_saturates_at_both_ends() {
        let cal = worked_example();
        let t_fine = cal.temperature.fine_resolution_temp(519888);
        // Accumulator is about -4.9e8 here.
        assert_eq!(cal.humidity.compensate(0, t_fine), 0);
        // And about 1.0e9 here, clamped to 100 %RH.
        assert_eq!(cal.humidity.compensate(0xFFFF, t_fine), 102400);
        assert_eq!(cal.humidity.compensate(32768, t_fine), 72045);
    }

    #[test]
    fn humidity_accumulator_beyond_i32_clamps() {
        let cal = worked_example();
        let t_fine = cal.temperature.fine_resolution_temp(519888);
        let humidity = HumidityCoefficients { h1: 75, h2: 700, h3: 0, h4: 313, h5: 50, h6: 30 };
        // Accumulator reaches about 1.93e9 before clamping.
        assert_eq!(humidity.compensate(0xFFFF, t_fine), 102400);
    }

    #[test]
    fn temperature_at_full_scale_with_large_t2() {
        let temperature = TemperatureCoefficients { t1: 27504, t2: 30000, t3: -1000 };
        let t_fine = temperature.fine_resolution_temp(0xF_FFFF);
        assert_eq!(t_fine, FineTemperature(1092651));
        assert_eq!(t_fine.hundredths(), 21341);
    }

    #[test]
    fn negative_pressure_clamps_to_zero() {
        let mut cal = worked_example();
        cal.pressure.p7 = -32768;
        // Evaluates to -2469792 before clamping.
        assert_eq!(cal.pressure.compensate(0xF_FFFF, FineTemperature(128422)), Ok(0));
        assert_eq!(cal.pressure.compensate(900000, FineTemperature(128422)), Ok(3877700));
    }
}
