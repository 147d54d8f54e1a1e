use device_descriptor::*;

device! {
    Control(u32, addr = 0x000, default = 0) {
        /// Off time, in 1/255 of the period
        on_time_divisor(pos = 0, width = 8): u8,
        /// 8.8 fixed point
        base_unit(pos = 8, width = 16): u16,
        /// Cleared by hardware once the new settings are latched
        software_update(pos = 30, width = 1): u8,
        enable(pos = 31, width = 1): u8
    }

    Resets(u32, addr = 0x804, default = 0) {
        /// 0 holds the block in reset
        function(pos = 0, width = 1): u8,
        dma(pos = 1, width = 1): u8
    }

    General(u32, addr = 0x808) {
        value(pos = 0, width = 32): u32
    }
}
