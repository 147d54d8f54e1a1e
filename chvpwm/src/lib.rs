#![cfg_attr(not(test), no_std)]

//! Cherry View LPSS PWM controller.
//!
//! The output period is derived from a 19.2 MHz clock scaled by an 8.8 fixed point base
//! unit. Changes to the control register only take effect once the software update bit
//! is set, which hardware clears after latching them.

#[macro_use]
extern crate logger;

use device_descriptor::{Proxy, ReadOnlyRegister, Register};
use register_access::RegisterWindow;

pub mod ll;

/// ACPI hardware IDs served by this driver.
pub const HIDS: [&str; 2] = ["80862288", "80862289"];

pub const CLOCK_HZ: u32 = 19_200_000;

const BASE_UNIT_SCALE: u64 = 1 << 16;
const DIVISOR_MAX: u32 = 255;

/// Output frequency produced by `base_unit`.
///
/// ```
/// assert_eq!(chvpwm::frequency_hz(0x0100), 75_000);
/// ```
pub fn frequency_hz(base_unit: u16) -> u32 {
    (base_unit as u64 * CLOCK_HZ as u64 / BASE_UNIT_SCALE) as u32
}

/// Closest base unit for `frequency_hz`, never 0.
pub fn base_unit_for(frequency_hz: u32) -> u16 {
    let scaled = (frequency_hz as u64 * BASE_UNIT_SCALE + CLOCK_HZ as u64 / 2) / CLOCK_HZ as u64;
    scaled.clamp(1, u16::MAX as u64) as u16
}

/// Share of the period the output is high, in percent.
pub fn duty_percent(on_time_divisor: u8) -> u8 {
    let high = DIVISOR_MAX - on_time_divisor as u32;
    ((high * 100 + DIVISOR_MAX / 2) / DIVISOR_MAX) as u8
}

/// Divisor for a duty cycle in percent. Values above 100 are clamped.
pub fn on_time_divisor_for(duty_percent: u8) -> u8 {
    let duty = duty_percent.min(100) as u32;
    let high = (duty * DIVISOR_MAX + 50) / 100;
    (DIVISOR_MAX - high) as u8
}

/// Decoded control register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmState {
    pub enabled: bool,
    pub base_unit: u16,
    pub on_time_divisor: u8,
}

impl PwmState {
    pub fn frequency_hz(&self) -> u32 {
        frequency_hz(self.base_unit)
    }

    pub fn duty_percent(&self) -> u8 {
        duty_percent(self.on_time_divisor)
    }
}

impl From<ll::Control> for PwmState {
    fn from(reg: ll::Control) -> Self {
        Self {
            enabled: reg.enable().is_set(),
            base_unit: reg.base_unit().read_field_bits() as u16,
            on_time_divisor: reg.on_time_divisor().read_field_bits() as u8,
        }
    }
}

pub struct ChvPwm<W> {
    window: W,
}

impl<W> ChvPwm<W>
where
    W: RegisterWindow,
{
    /// Takes the block out of reset if needed and logs the current control register.
    pub fn new(window: W) -> Self {
        let this = Self { window };

        let resets = this.read::<ll::Resets>();
        if !resets.function().is_set() {
            debug!("PWM held in reset, releasing");
            let released = resets.modify(|w| w.function().write(1).dma().write(1));
            this.write(released);
        }

        let control = this.read_control();
        let general = this.read::<ll::General>();
        info!(
            "PWM control {:#x}, general {:#x}",
            control.bits(),
            general.value().read_field_bits()
        );

        this
    }

    fn read<R: ReadOnlyRegister<u32>>(&self) -> R {
        R::from_bits(self.window.read32(R::ADDRESS as usize))
    }

    fn write<R: ReadOnlyRegister<u32>>(&self, reg: R) {
        self.window.write32(R::ADDRESS as usize, reg.bits());
    }

    pub fn read_control(&self) -> ll::Control {
        self.read()
    }

    pub fn state(&self) -> PwmState {
        self.read_control().into()
    }

    /// Whether hardware has yet to latch the last configuration.
    pub fn update_pending(&self) -> bool {
        self.read_control().software_update().is_set()
    }

    /// Programs the period and duty cycle, keeping the enable state.
    pub fn configure(&mut self, base_unit: u16, on_time_divisor: u8) {
        let control = self.read_control().modify(|w| {
            w.base_unit()
                .write(base_unit)
                .on_time_divisor()
                .write(on_time_divisor)
                .software_update()
                .write(1)
        });
        self.write(control);

        debug!(
            "PWM base unit {:#x}, divisor {}",
            base_unit, on_time_divisor
        );
    }

    /// Programs the closest period and duty cycle to the request and returns what was
    /// programmed.
    pub fn set_output(&mut self, frequency_hz: u32, duty_percent: u8) -> PwmState {
        let base_unit = base_unit_for(frequency_hz);
        let on_time_divisor = on_time_divisor_for(duty_percent);
        self.configure(base_unit, on_time_divisor);
        self.state()
    }

    pub fn enable(&mut self) {
        self.set_enabled(true);
    }

    pub fn disable(&mut self) {
        self.set_enabled(false);
    }

    fn set_enabled(&mut self, enabled: bool) {
        let control = self
            .read_control()
            .modify(|w| w.enable().write(enabled as u8).software_update().write(1));
        self.write(control);
    }

    pub fn detach(self) -> W {
        self.window
    }
}
