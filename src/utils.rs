pub fn unsigned_short(bytes: &[u8], offset: usize) -> u16 {
    let v0 = bytes[offset] as u16;
    let v1 = bytes[offset + 1] as u16;
    v0 + (v1 << 8)
}

pub fn signed_short(bytes: &[u8], offset: usize) -> i16 {
    unsigned_short(bytes, offset) as i16
}

/// Assembles a 20-bit channel from its MSB, LSB and the top nibble of XLSB.
pub fn twenty_bit(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    ((msb as u32) << 12) | ((lsb as u32) << 4) | ((xlsb as u32) >> 4)
}
