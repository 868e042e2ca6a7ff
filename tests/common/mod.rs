#![allow(dead_code)]

use std::cell::RefCell;
use std::error;
use std::fmt;
use std::rc::Rc;

use bme280_telemetry::Bus;

pub const ADDRESS: u8 = 0x76;

// Temperature and pressure words of the datasheet's worked example.
pub const CALIB_TP: [u8; 24] = [
    0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, //
    0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, //
    0x27, 0x0B, 0x8C, 0x00, 0xF9, 0xFF, //
    0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17,
];
pub const CALIB_H1: u8 = 75;
pub const CALIB_H: [u8; 7] = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];

// adc_P 415148, adc_T 519888, adc_H 30000
pub const DATA: [u8; 8] = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30];
pub const RECORD: &str = r#"{"temperature":2508,"humidity":56317,"pressure":25767233}"#;

#[derive(Debug, PartialEq, Eq)]
pub struct BusFault(pub u8);

impl fmt::Display for BusFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "nack at register 0x{:02x}", self.0)
    }
}

impl error::Error for BusFault {}

pub struct MockState {
    pub registers: [u8; 256],
    pub reads: Vec<(u8, u8, usize)>,
    pub writes: Vec<(u8, Vec<u8>, bool)>,
    pub fail_read_at: Option<u8>,
    pub fail_write_at: Option<u8>,
    pub offline: bool,
}

/// Register map of one sensor. Clones share state so a test can keep a
/// handle while the driver owns the bus.
#[derive(Clone)]
pub struct MockBus(pub Rc<RefCell<MockState>>);

impl MockBus {
    pub fn new() -> MockBus {
        let mut registers = [0u8; 256];
        registers[0x88..0x88 + 24].copy_from_slice(&CALIB_TP);
        registers[0xA1] = CALIB_H1;
        registers[0xE1..0xE1 + 7].copy_from_slice(&CALIB_H);
        registers[0xF7..0xF7 + 8].copy_from_slice(&DATA);
        MockBus(Rc::new(RefCell::new(MockState {
            registers,
            reads: Vec::new(),
            writes: Vec::new(),
            fail_read_at: None,
            fail_write_at: None,
            offline: false,
        })))
    }

    pub fn set(&self, register: u8, bytes: &[u8]) {
        let start = register as usize;
        self.0.borrow_mut().registers[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn set_offline(&self, offline: bool) {
        self.0.borrow_mut().offline = offline;
    }

    pub fn reads(&self) -> Vec<(u8, u8, usize)> {
        self.0.borrow().reads.clone()
    }

    pub fn writes(&self) -> Vec<(u8, Vec<u8>, bool)> {
        self.0.borrow().writes.clone()
    }
}

impl Bus for MockBus {
    type Error = BusFault;

    fn read_registers(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), BusFault> {
        let mut state = self.0.borrow_mut();
        if state.offline || state.fail_read_at == Some(register) {
            return Err(BusFault(register));
        }
        let start = register as usize;
        buffer.copy_from_slice(&state.registers[start..start + buffer.len()]);
        state.reads.push((address, register, buffer.len()));
        Ok(())
    }

    fn write(&mut self, address: u8, bytes: &[u8], hold: bool) -> Result<(), BusFault> {
        let mut state = self.0.borrow_mut();
        if state.offline || state.fail_write_at == Some(bytes[0]) {
            return Err(BusFault(bytes[0]));
        }
        let start = bytes[0] as usize;
        for (i, b) in bytes[1..].iter().enumerate() {
            state.registers[start + i] = *b;
        }
        state.writes.push((address, bytes.to_vec(), hold));
        Ok(())
    }
}
