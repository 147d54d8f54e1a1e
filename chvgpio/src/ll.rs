//! Cherry View GPIO community register map.
//!
//! Pad registers are listed at the address of pin 0; see [`crate::pad_cfg0_offset`].

use device_descriptor::*;

device! {
    /// Write 1 to clear
    InterruptStatus(u32, addr = 0x0300) {
        lines(pos = 0, width = 16): u16
    }

    InterruptMask(u32, addr = 0x0380, default = 0) {
        lines(pos = 0, width = 16): u16
    }

    PadCfg0(u32, addr = 0x4400, default = 0) {
        rx_state(pos = 0, width = 1): u8,
        tx_state(pos = 1, width = 1): u8,
        interrupt_line(pos = 28, width = 4): u8
    }

    PadCfg1(u32, addr = 0x4404, default = 0) {
        wake_config(pos = 0, width = 3): WakeConfig {
            Disabled = 0,
            Falling = 1,
            Rising = 2,
            Both = 3,
            Level = 4
        },
        /// 0x4 inverts RX data
        invert_rx_tx(pos = 4, width = 4): u8
    }
}

pub const INVERT_RX_DATA: u8 = 0x4;
