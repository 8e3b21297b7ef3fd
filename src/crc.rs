use crate::consts::FCS_RESIDUE;

pub(crate) fn crc_ccitt_update(crc: u16, data: &u8) -> u16 {
    let mut d = *data as u16;
    d = d ^ lo8(crc);
    d = d ^ (d << 4);
    d = (d as u8) as u16; // Ensure d is treated as a u8 for the next operations

    ((d << 8) | hi8(crc)) ^ (((d >> 4) as u8) as u16) ^ (d << 3)
}

pub(crate) fn lo8(x: u16) -> u16 {
    x & 0xff
}

pub(crate) fn hi8(x: u16) -> u16 {
    x >> 8
}

/// Runs the CRC over `bytes`, starting from the all-ones register.
pub(crate) fn crc_ccitt(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0xffff, crc_ccitt_update)
}

/// The FCS appended to a frame: ones' complement of the CRC, low byte first.
pub(crate) fn fcs(bytes: &[u8]) -> [u8; 2] {
    let crc = !crc_ccitt(bytes);
    [lo8(crc) as u8, hi8(crc) as u8]
}

/// Checks a frame that still carries its FCS.
pub(crate) fn fcs_valid(frame: &[u8]) -> bool {
    crc_ccitt(frame) == FCS_RESIDUE
}
