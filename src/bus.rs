use std::error;

#[cfg(target_os = "linux")]
use i2cdev::core::{I2CMessage, I2CTransfer};
#[cfg(target_os = "linux")]
use i2cdev::linux::*;
#[cfg(target_os = "linux")]
use std::path::Path;

/// Synchronous register access over a two-wire bus.
///
/// Multi-byte reads rely on the device auto-incrementing its register
/// pointer, so `read_registers` must issue the start register and the read
/// as a single transaction.
pub trait Bus {
    type Error: error::Error + 'static;

    /// Reads `buffer.len()` consecutive registers starting at `register`.
    fn read_registers(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `bytes` to the device. With `hold` set the transport may keep
    /// the bus claimed for a following transfer.
    fn write(&mut self, address: u8, bytes: &[u8], hold: bool) -> Result<(), Self::Error>;
}

impl<'b, B: Bus> Bus for &'b mut B {
    type Error = B::Error;

    fn read_registers(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_registers(address, register, buffer)
    }

    fn write(&mut self, address: u8, bytes: &[u8], hold: bool) -> Result<(), Self::Error> {
        (**self).write(address, bytes, hold)
    }
}

/// `/dev/i2c-N` transport. Every message carries its own slave address, so
/// a single handle serves any device on the bus.
#[cfg(target_os = "linux")]
pub struct LinuxBus {
    bus: LinuxI2CBus,
}

#[cfg(target_os = "linux")]
impl LinuxBus {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<LinuxBus, LinuxI2CError> {
        Ok(LinuxBus { bus: LinuxI2CBus::new(path)? })
    }
}

#[cfg(target_os = "linux")]
impl Bus for LinuxBus {
    type Error = LinuxI2CError;

    fn read_registers(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), LinuxI2CError> {
        let start = [register];
        let mut messages = [
            LinuxI2CMessage::write(&start).with_address(address as u16),
            LinuxI2CMessage::read(buffer).with_address(address as u16),
        ];
        self.bus.transfer(&mut messages)?;
        Ok(())
    }

    // i2c-dev releases the bus after every transfer, `hold` has no effect here.
    fn write(&mut self, address: u8, bytes: &[u8], _hold: bool) -> Result<(), LinuxI2CError> {
        let mut messages = [LinuxI2CMessage::write(bytes).with_address(address as u16)];
        self.bus.transfer(&mut messages)?;
        Ok(())
    }
}
