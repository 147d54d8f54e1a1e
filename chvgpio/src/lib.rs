#![cfg_attr(not(test), no_std)]

//! Cherry View GPIO community controller.
//!
//! Each community exposes one memory-mapped register window. Pins are arranged in groups
//! of up to 15 pads; every pad has two 32-bit configuration words. Up to 16 interrupt
//! lines are shared by the pads of a community, each pad selecting its line through
//! `PadCfg0.interrupt_line`.

#[macro_use]
extern crate logger;

use core::{cell::Cell, fmt::Write as _};

use device_descriptor::{Proxy, ReadOnlyRegister, Register};
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use heapless::String;
use register_access::RegisterWindow;

mod bank;
pub mod ll;

pub use bank::{Bank, PINS_PER_GROUP};

pub const LINE_COUNT: usize = 16;

const ALL_LINES: u32 = 0xFFFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    InvalidPin(i32),
    UnsupportedBank(u64),
    InvalidLine(u8),
}

/// Interrupt trigger of a pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    LevelHigh,
    LevelLow,
    RisingEdge,
    FallingEdge,
    BothEdges,
}

impl Trigger {
    fn pad_config(self) -> (ll::WakeConfig, u8) {
        match self {
            Trigger::LevelHigh => (ll::WakeConfig::Level, 0),
            Trigger::LevelLow => (ll::WakeConfig::Level, ll::INVERT_RX_DATA),
            Trigger::RisingEdge => (ll::WakeConfig::Rising, 0),
            Trigger::FallingEdge => (ll::WakeConfig::Falling, 0),
            Trigger::BothEdges => (ll::WakeConfig::Both, 0),
        }
    }
}

/// Called when an interrupt line fires. Runs in interrupt context.
pub trait LineHandler: Sync {
    fn handle(&self);
}

impl<F> LineHandler for F
where
    F: Fn() + Sync,
{
    fn handle(&self) {
        self()
    }
}

type Handlers = [Option<&'static dyn LineHandler>; LINE_COUNT];

/// Offset of a pin's first pad configuration word. `pin` must be valid.
pub fn pad_cfg0_offset(pin: i32) -> usize {
    debug_assert!(pin >= 0);
    let group = (pin / PINS_PER_GROUP) as usize;
    let offset = (pin % PINS_PER_GROUP) as usize;
    <ll::PadCfg0 as ReadOnlyRegister<u32>>::ADDRESS as usize + 1024 * group + 8 * offset
}

fn pad_cfg1_offset(pin: i32) -> usize {
    pad_cfg0_offset(pin) + 4
}

/// Smallest register window, in bytes, that holds every register `bank` uses.
pub fn window_len(bank: Bank) -> usize {
    let pads_end = pad_cfg1_offset(bank.pin_max()) + 4;
    let mask_end = offset_of::<ll::InterruptMask>() + 4;
    pads_end.max(mask_end)
}

fn offset_of<R: ReadOnlyRegister<u32>>() -> usize {
    R::ADDRESS as usize
}

pub struct ChvGpio<W> {
    bank: Bank,
    window: Mutex<CriticalSectionRawMutex, W>,
    handlers: Mutex<CriticalSectionRawMutex, Cell<Handlers>>,
}

impl<W> ChvGpio<W>
where
    W: RegisterWindow,
{
    /// Selects the pin table for `uid`, then masks and acknowledges every line.
    pub fn new(window: W, uid: u64) -> Result<Self, Error> {
        let bank = Bank::from_uid(uid)?;

        let this = Self {
            bank,
            window: Mutex::new(window),
            handlers: Mutex::new(Cell::new([None; LINE_COUNT])),
        };
        this.mask_all();

        info!("GPIO community {:?}: {} pins", bank, bank.pin_count());

        Ok(this)
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn pin_count(&self) -> u32 {
        self.bank.pin_count()
    }

    pub fn pin_max(&self) -> i32 {
        self.bank.pin_max()
    }

    pub fn validate_pin(&self, pin: i32) -> bool {
        self.bank.validate_pin(pin)
    }

    pub fn check_pin(&self, pin: i32) -> Result<(), Error> {
        if self.validate_pin(pin) {
            Ok(())
        } else {
            Err(Error::InvalidPin(pin))
        }
    }

    /// Returns the pad name, like `N72`.
    pub fn pin_name(&self, pin: i32) -> Result<String<8>, Error> {
        self.check_pin(pin)?;

        let mut name = String::new();
        // A two letter prefix and at most three digits always fit.
        _ = write!(name, "{}{}", self.bank.prefix(), pin);
        Ok(name)
    }

    fn modify_register(&self, offset: usize, f: impl FnOnce(u32) -> u32) -> u32 {
        self.window.lock(|window| {
            let value = f(window.read32(offset));
            window.write32(offset, value);
            value
        })
    }

    /// Returns the RX state of a pin.
    pub fn read_pin(&self, pin: i32) -> Result<bool, Error> {
        self.check_pin(pin)?;

        let bits = self.window.lock(|window| window.read32(pad_cfg0_offset(pin)));
        Ok(ll::PadCfg0::from_bits(bits).rx_state().is_set())
    }

    /// Sets the TX state of a pin.
    pub fn write_pin(&self, pin: i32, value: bool) -> Result<(), Error> {
        self.check_pin(pin)?;

        self.modify_register(pad_cfg0_offset(pin), |bits| {
            ll::PadCfg0::from_bits(bits)
                .modify(|w| w.tx_state().write(value as u8))
                .bits()
        });
        Ok(())
    }

    /// Inverts the TX state of a pin.
    pub fn toggle_pin(&self, pin: i32) -> Result<(), Error> {
        self.check_pin(pin)?;

        self.modify_register(pad_cfg0_offset(pin), |bits| {
            let reg = ll::PadCfg0::from_bits(bits);
            let toggled = !reg.tx_state().is_set();
            reg.modify(|w| w.tx_state().write(toggled as u8)).bits()
        });
        Ok(())
    }

    /// Interrupt line the pad is routed to.
    pub fn interrupt_line(&self, pin: i32) -> Result<u8, Error> {
        self.check_pin(pin)?;

        let bits = self.window.lock(|window| window.read32(pad_cfg0_offset(pin)));
        Ok(ll::PadCfg0::from_bits(bits).interrupt_line().read_field_bits() as u8)
    }

    /// Registers `handler` on the line the pad is routed to, configures the trigger and
    /// unmasks the line. Replaces any handler already on that line.
    pub fn establish_interrupt(
        &self,
        pin: i32,
        trigger: Trigger,
        handler: &'static dyn LineHandler,
    ) -> Result<u8, Error> {
        let line = self.interrupt_line(pin)?;

        self.handlers.lock(|handlers| {
            let mut slots = handlers.get();
            if slots[line as usize].is_some() {
                warn!("Replacing handler of interrupt line {}", line);
            }
            slots[line as usize] = Some(handler);
            handlers.set(slots);
        });

        let (wake, invert) = trigger.pad_config();
        self.modify_register(pad_cfg1_offset(pin), |bits| {
            ll::PadCfg1::from_bits(bits)
                .modify(|w| w.wake_config().write(wake).invert_rx_tx().write(invert))
                .bits()
        });

        self.modify_register(offset_of::<ll::InterruptMask>(), |mask| mask | (1 << line));

        debug!("Pin {} uses interrupt line {}", pin, line);

        Ok(line)
    }

    /// Masks the line and removes its handler.
    pub fn disestablish_interrupt(&self, line: u8) -> Result<(), Error> {
        if line as usize >= LINE_COUNT {
            return Err(Error::InvalidLine(line));
        }

        self.modify_register(offset_of::<ll::InterruptMask>(), |mask| mask & !(1 << line));

        self.handlers.lock(|handlers| {
            let mut slots = handlers.get();
            slots[line as usize] = None;
            handlers.set(slots);
        });

        Ok(())
    }

    /// Masks and acknowledges every line.
    pub fn mask_all(&self) {
        self.window.lock(|window| {
            window.write32(offset_of::<ll::InterruptMask>(), 0);
            window.write32(offset_of::<ll::InterruptStatus>(), ALL_LINES);
        });
    }

    fn handler(&self, line: usize) -> Option<&'static dyn LineHandler> {
        self.handlers.lock(|handlers| handlers.get()[line])
    }

    /// Acknowledges and handles every pending line, lowest first. Returns whether any
    /// line was pending.
    ///
    /// Lines are acknowledged one at a time, before their handler runs, so a line that
    /// fires again while being handled stays pending.
    pub fn dispatch_interrupt(&self) -> bool {
        let status = self
            .window
            .lock(|window| window.read32(offset_of::<ll::InterruptStatus>()));
        let pending = ll::InterruptStatus::from_bits(status).lines().read_field_bits();

        for line in 0..LINE_COUNT {
            let bit = 1 << line;
            if pending & bit == 0 {
                continue;
            }

            self.window
                .lock(|window| window.write32(offset_of::<ll::InterruptStatus>(), bit));

            match self.handler(line) {
                Some(handler) => handler.handle(),
                None => {
                    trace!("Unhandled interrupt line {}", line);
                }
            }
        }

        pending != 0
    }

    /// Removes every handler, masks every line and gives back the register window.
    pub fn detach(self) -> W {
        self.handlers
            .lock(|handlers| handlers.set([None; LINE_COUNT]));
        self.mask_all();
        self.window.into_inner()
    }
}
