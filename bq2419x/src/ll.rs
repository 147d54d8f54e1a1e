//! BQ24190/BQ24192 register map.

use device_descriptor::*;

device! {
    InputSourceControl(u8, addr = 0x00, default = 0x30) {
        input_current_limit(pos = 0, width = 3): u8,
        input_voltage_limit(pos = 3, width = 4): u8,
        high_impedance(pos = 7, width = 1): u8
    }

    PowerOnConfig(u8, addr = 0x01, default = 0x1B) {
        min_system_voltage(pos = 1, width = 3): u8,
        charger_config(pos = 4, width = 2): ChargerConfig {
            Disabled = 0,
            Charge = 1,
            Otg = 2
        },
        watchdog_reset(pos = 6, width = 1): u8,
        register_reset(pos = 7, width = 1): u8
    }

    ChargeCurrentControl(u8, addr = 0x02, default = 0x60) {
        force_20_percent(pos = 0, width = 1): u8,
        fast_charge_current(pos = 2, width = 6): u8
    }

    PrechargeTerminationControl(u8, addr = 0x03, default = 0x11) {
        termination_current(pos = 0, width = 4): u8,
        precharge_current(pos = 4, width = 4): u8
    }

    ChargeVoltageControl(u8, addr = 0x04, default = 0xB2) {
        recharge_threshold(pos = 0, width = 1): u8,
        battery_low_voltage(pos = 1, width = 1): u8,
        charge_voltage(pos = 2, width = 6): u8
    }

    TerminationTimerControl(u8, addr = 0x05, default = 0x9A) {
        charge_timer(pos = 1, width = 2): u8,
        safety_timer_enable(pos = 3, width = 1): u8,
        watchdog(pos = 4, width = 2): Watchdog {
            Disabled = 0,
            Seconds40 = 1,
            Seconds80 = 2,
            Seconds160 = 3
        },
        termination_indicator(pos = 6, width = 1): u8,
        termination_enable(pos = 7, width = 1): u8
    }

    ThermalRegulationControl(u8, addr = 0x06, default = 0x03) {
        thermal_threshold(pos = 0, width = 2): u8,
        voltage_clamp(pos = 2, width = 3): u8,
        compensation_resistor(pos = 5, width = 3): u8
    }

    MiscOperationControl(u8, addr = 0x07, default = 0x4B) {
        interrupt_mask(pos = 0, width = 2): u8,
        batfet_disable(pos = 5, width = 1): u8,
        timer_slowdown(pos = 6, width = 1): u8,
        dpdm_detection(pos = 7, width = 1): u8
    }

    SystemStatus(u8, addr = 0x08) {
        vsys_regulation(pos = 0, width = 1): u8,
        thermal_regulation(pos = 1, width = 1): u8,
        power_good(pos = 2, width = 1): u8,
        dynamic_power_management(pos = 3, width = 1): u8,
        charge_status(pos = 4, width = 2): ChargeStatus {
            NotCharging = 0,
            PreCharge = 1,
            FastCharging = 2,
            Done = 3
        },
        vbus_status(pos = 6, width = 2): VbusStatus {
            Unknown = 0,
            UsbHost = 1,
            Adapter = 2,
            Otg = 3
        }
    }

    Fault(u8, addr = 0x09) {
        ntc_fault(pos = 0, width = 3): u8,
        battery_fault(pos = 3, width = 1): u8,
        charge_fault(pos = 4, width = 2): ChargeFault {
            Normal = 0,
            InputFault = 1,
            ThermalShutdown = 2,
            SafetyTimerExpired = 3
        },
        boost_fault(pos = 6, width = 1): u8,
        watchdog_fault(pos = 7, width = 1): u8
    }

    Vendor(u8, addr = 0x0A) {
        device_revision(pos = 0, width = 2): u8,
        ts_profile(pos = 2, width = 1): u8,
        part_number(pos = 3, width = 3): PartNumber {
            Bq24192I = 3,
            Bq24190 = 4,
            Bq24192 = 5
        }
    }
}
