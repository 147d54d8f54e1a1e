//! MAX17047/MAX17050 register map.

use device_descriptor::*;

device! {
    /// Alert and power-on flags
    Status(u16, addr = 0x00) {
        power_on_reset(pos = 1, width = 1): u16,
        battery_absent(pos = 3, width = 1): u16,
        voltage_min_alert(pos = 8, width = 1): u16,
        temperature_min_alert(pos = 9, width = 1): u16,
        soc_min_alert(pos = 10, width = 1): u16,
        battery_inserted(pos = 11, width = 1): u16,
        voltage_max_alert(pos = 12, width = 1): u16,
        temperature_max_alert(pos = 13, width = 1): u16,
        soc_max_alert(pos = 14, width = 1): u16,
        battery_removed(pos = 15, width = 1): u16
    }

    /// State-of-charge alert thresholds, 1% per LSB
    SocAlertThreshold(u16, addr = 0x03) {
        min(pos = 0, width = 8): u16,
        max(pos = 8, width = 8): u16
    }

    /// 1/256 °C per LSB
    Temperature(u16, addr = 0x08) {
        value(pos = 0, width = 16): u16
    }

    VCell(u16, addr = 0x09) {
        voltage(pos = 0, width = 16): u16
    }

    AvgCurrent(u16, addr = 0x0B) {
        current(pos = 0, width = 16): u16
    }

    SocAv(u16, addr = 0x0E) {
        percentage(pos = 0, width = 16): u16
    }

    FullCap(u16, addr = 0x10) {
        capacity(pos = 0, width = 16): u16
    }

    /// 5.625 s per LSB
    TimeToEmpty(u16, addr = 0x11) {
        time(pos = 0, width = 16): u16
    }

    DesignCap(u16, addr = 0x18) {
        capacity(pos = 0, width = 16): u16
    }

    AvgVCell(u16, addr = 0x19) {
        voltage(pos = 0, width = 16): u16
    }

    Config(u16, addr = 0x1D) {
        battery_removal_alert(pos = 0, width = 1): u16,
        battery_insertion_alert(pos = 1, width = 1): u16,
        alert_enable(pos = 2, width = 1): u16,
        force_thermistor_bias(pos = 3, width = 1): u16,
        enable_thermistor(pos = 4, width = 1): u16,
        alert_sticky(pos = 5, width = 1): u16,
        i2c_shutdown(pos = 6, width = 1): u16,
        shutdown(pos = 7, width = 1): u16,
        temperature_external(pos = 8, width = 1): u16,
        temperature_enable(pos = 9, width = 1): u16,
        ain_shutdown(pos = 10, width = 1): u16,
        alert_polarity(pos = 11, width = 1): u16,
        voltage_alert_sticky(pos = 12, width = 1): u16,
        temperature_alert_sticky(pos = 13, width = 1): u16,
        soc_alert_sticky(pos = 14, width = 1): u16
    }

    RemCap(u16, addr = 0x1F) {
        capacity(pos = 0, width = 16): u16
    }

    Version(u16, addr = 0x21) {
        version(pos = 0, width = 16): u16
    }

    /// Open-circuit voltage of the voltage fuel gauge
    VfOcv(u16, addr = 0xFB) {
        voltage(pos = 0, width = 16): u16
    }

    /// State of charge of the voltage fuel gauge
    SocVf(u16, addr = 0xFF) {
        percentage(pos = 0, width = 16): u16
    }
}
