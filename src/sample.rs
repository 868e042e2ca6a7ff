use crate::bus::Bus;
use crate::error::Error;
use crate::utils::twenty_bit;

/// First register of the measurement block (pressure MSB).
pub const DATA_START: u8 = 0xF7;
pub const DATA_LEN: usize = 8;

/// Uncompensated ADC counts of one measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    pub pressure: u32,
    pub temperature: u32,
    pub humidity: u16,
}

impl RawSample {
    /// Reads `0xF7..=0xFE` in one burst so the three channels come from the
    /// same measurement.
    pub fn read<B: Bus>(bus: &mut B, address: u8) -> Result<RawSample, Error<B::Error>> {
        let mut data = [0u8; DATA_LEN];
        bus.read_registers(address, DATA_START, &mut data).map_err(Error::Bus)?;
        let sample = RawSample::from_bytes(&data);
        trace!("raw sample {:02x?} -> {:?}", data, sample);
        Ok(sample)
    }

    pub fn from_bytes(data: &[u8; DATA_LEN]) -> RawSample {
        RawSample {
            pressure: twenty_bit(data[0], data[1], data[2]),
            temperature: twenty_bit(data[3], data[4], data[5]),
            humidity: ((data[6] as u16) << 8) | data[7] as u16,
        }
    }
}
