use heapless::String;

use crate::compensation::CompensatedReading;

/// Fits the longest possible record (71 bytes) with room to spare.
pub const RECORD_CAPACITY: usize = 96;

pub type Record = String<RECORD_CAPACITY>;

// Field order is the key order on the wire.
#[derive(Serialize)]
struct Fields {
    temperature: i32,
    humidity: u32,
    pressure: u32,
}

/// Renders `{"temperature":..,"humidity":..,"pressure":..}` in the reading's
/// native units. Returns `None` only if the record outgrows its buffer.
pub fn serialize(reading: &CompensatedReading) -> Option<Record> {
    let fields = Fields {
        temperature: reading.temperature,
        humidity: reading.humidity,
        pressure: reading.pressure,
    };
    serde_json_core::to_string(&fields).ok()
}
