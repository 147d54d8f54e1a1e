//! Goodix GT9xx register map. Registers are addressed with a 16-bit big endian pointer,
//! multi-byte values are little endian.

use device_descriptor::*;

device! {
    Command(u8, addr = 0x8040, default = 0x00) {
        command(pos = 0, width = 8): CommandCode {
            ReadCoordinates = 0x00,
            ReadRawData = 0x01,
            SoftReset = 0x02,
            ScreenOff = 0x05
        }
    }

    TouchStatus(u8, addr = 0x814E, default = 0x00) {
        point_count(pos = 0, width = 4): u8,
        have_key(pos = 4, width = 1): u8,
        large_detect(pos = 6, width = 1): u8,
        buffer_ready(pos = 7, width = 1): u8
    }
}

pub const PRODUCT_ID: u16 = 0x8140;
pub const FIRMWARE_VERSION: u16 = 0x8144;

/// X and Y output maximum, each a 16-bit value.
pub const RESOLUTION: u16 = 0x8048;

pub const FIRST_POINT: u16 = 0x814F;
pub const POINT_SIZE: usize = 8;
